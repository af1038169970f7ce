//! Tekkenizer - BPE tokenizer for pretrained Mistral Tekken vocabularies.
//!
//! Loads a Tekken model file (JSON config plus base64 vocabulary entries),
//! derives the BPE merge rules it implies, and exposes encode/decode with
//! special-token handling:
//!
//! - Greedy highest-priority/leftmost BPE over raw bytes, with a choice of a
//!   reference scan or an accelerated rank-directed strategy
//! - Special-token id range at the low end of the id space, with
//!   Ignore/Keep/Raise decode policies
//! - Byte-level and unknown-token fallbacks that degrade instead of failing
//! - Rayon-parallel batch encode/decode and an LRU encode cache
//!
//! ```ignore
//! let tokenizer = tekkenizer::from_pretrained("data", "240911")?;
//! let ids = tokenizer.encode("Hello, world!", true, false);
//! let text = tokenizer.decode(&ids, tekkenizer::SpecialTokenPolicy::Ignore)?;
//! ```

pub mod core;

pub use core::{
    from_model_file, from_model_json, from_pretrained, Merge, MergeTable, SpecialTokenPolicy,
    SpecialTokenRegistry, TekkenRelease, Tokenizer, TokenizerConfig, TokenizerError, VocabError,
    Vocabulary, CANONICAL_SPECIAL_TOKENS,
};
