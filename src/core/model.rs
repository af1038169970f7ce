//! Tekken model file loading.
//!
//! Tekken models are JSON files with a `config` block and a `vocab` array:
//!
//! ```json
//! {
//!   "config": {
//!     "default_vocab_size": 131072,
//!     "default_num_special_tokens": 19,
//!     "pattern": "...",
//!     "version": "v3"
//!   },
//!   "vocab": [ { "token_bytes": "SGVsbG8=", "rank": 42 } ]
//! }
//! ```
//!
//! `token_bytes` is standard base64 over the token's raw bytes. A missing
//! file is [`TokenizerError::ModelNotFound`]; unparsable JSON, a missing
//! `config` block, or invalid base64 is [`TokenizerError::ModelMalformed`].
//! No partially built tokenizer is ever returned.

use std::fs;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;

use super::special::SpecialTokenRegistry;
use super::tokenizer::{Tokenizer, TokenizerConfig, TokenizerError};
use super::vocab::Vocabulary;

fn default_version() -> String {
    "v3".to_string()
}

#[derive(Debug, Deserialize)]
struct ModelConfig {
    #[serde(default)]
    default_vocab_size: u32,
    #[serde(default)]
    default_num_special_tokens: u32,
    #[serde(default)]
    pattern: String,
    #[serde(default = "default_version")]
    version: String,
}

#[derive(Debug, Deserialize)]
struct VocabEntry {
    token_bytes: String,
    rank: u32,
}

#[derive(Debug, Deserialize)]
struct ModelFile {
    config: ModelConfig,
    #[serde(default)]
    vocab: Vec<VocabEntry>,
}

/// Load a tokenizer from a Tekken model file on disk.
pub fn from_model_file(path: impl AsRef<Path>) -> Result<Tokenizer, TokenizerError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(TokenizerError::ModelNotFound(path.display().to_string()));
    }
    let data = fs::read_to_string(path)
        .map_err(|e| TokenizerError::ModelMalformed(format!("{}: {e}", path.display())))?;
    from_model_json(&data)
}

/// Build a tokenizer from Tekken model JSON.
pub fn from_model_json(json: &str) -> Result<Tokenizer, TokenizerError> {
    let model: ModelFile = serde_json::from_str(json)
        .map_err(|e| TokenizerError::ModelMalformed(e.to_string()))?;

    let mut entries = Vec::with_capacity(model.vocab.len());
    for entry in model.vocab {
        let bytes = STANDARD.decode(&entry.token_bytes).map_err(|e| {
            TokenizerError::ModelMalformed(format!("invalid base64 token_bytes: {e}"))
        })?;
        entries.push((bytes, entry.rank));
    }
    let vocab = Vocabulary::from_entries(entries)?;

    let config = TokenizerConfig {
        vocab_size: model.config.default_vocab_size,
        num_special_tokens: model.config.default_num_special_tokens,
        pattern: model.config.pattern,
        version: model.config.version,
    };
    let registry = SpecialTokenRegistry::canonical(config.num_special_tokens);

    Tokenizer::new(vocab, config, registry)
}
