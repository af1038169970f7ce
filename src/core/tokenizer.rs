use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use rayon::prelude::*;
use rustc_hash::FxHasher;
use thiserror::Error;

use super::bpe::{BpeStrategy, RankedBpe, ScanBpe};
use super::merges::MergeTable;
use super::special::{SpecialTokenPolicy, SpecialTokenRegistry};
use super::vocab::{VocabError, Vocabulary};

/// Errors surfaced by tokenizer construction, loading, and decoding.
#[derive(Error, Debug)]
pub enum TokenizerError {
    #[error("Tokenizer model not found: {0}")]
    ModelNotFound(String),
    #[error("Malformed tokenizer model: {0}")]
    ModelMalformed(String),
    #[error("Vocabulary error: {0}")]
    Vocab(#[from] VocabError),
    #[error("Unknown special token: {0}")]
    UnknownSpecialToken(String),
    #[error("Special token registry covers {registry} ids but config declares {config}")]
    SpecialTokenCountMismatch { registry: u32, config: u32 },
    #[error("Special token id {0} encountered while decoding")]
    SpecialTokenEncountered(u32),
    #[error("Unknown pretrained tokenizer version: {0}")]
    UnknownPretrained(String),
}

/// Static configuration of a loaded model.
///
/// `vocab_size` is the advertised total and is independent of how many
/// entries were actually loaded. `pattern` is the reference pre-tokenization
/// regex, kept verbatim for format fidelity; it is never compiled or applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerConfig {
    pub vocab_size: u32,
    pub num_special_tokens: u32,
    pub pattern: String,
    pub version: String,
}

/// Default cache size for encoded texts
const DEFAULT_CACHE_SIZE: usize = 4096;

enum Strategy {
    Scan(ScanBpe),
    Ranked(RankedBpe),
}

impl Strategy {
    fn split(&self, bytes: &[u8], merges: &MergeTable) -> Vec<Vec<u8>> {
        match self {
            Strategy::Scan(s) => s.split(bytes, merges),
            Strategy::Ranked(s) => s.split(bytes, merges),
        }
    }
}

/// BPE tokenizer over a pretrained Tekken vocabulary.
///
/// Composes the vocabulary, the merge table derived from it, the
/// special-token registry, and one of two observably identical merge
/// strategies. All state is built at construction and read-only afterwards,
/// so a `Tokenizer` can be shared across threads freely; the only interior
/// mutability is the LRU cache of encoded texts, which never changes
/// observable results.
///
/// Ordinary token ids are `rank + num_special_tokens`; ids below
/// `num_special_tokens` are reserved for control tokens.
pub struct Tokenizer {
    vocab: Vocabulary,
    merges: MergeTable,
    registry: SpecialTokenRegistry,
    config: TokenizerConfig,
    strategy: Strategy,
    text_cache: Mutex<LruCache<u64, Vec<u32>>>,
    cache_size: usize,
    bos_id: u32,
    eos_id: u32,
    pad_id: u32,
    unk_id: u32,
}

impl Tokenizer {
    /// Build a tokenizer from its parts.
    ///
    /// Derives the merge table once and resolves the `<unk>`/`<s>`/`</s>`/
    /// `<pad>` anchor ids from the registry. Fails if the registry does not
    /// carry those canonical names.
    pub fn new(
        vocab: Vocabulary,
        config: TokenizerConfig,
        registry: SpecialTokenRegistry,
    ) -> Result<Self, TokenizerError> {
        Self::with_cache_size(vocab, config, registry, DEFAULT_CACHE_SIZE)
    }

    /// Build a tokenizer with a custom encode-cache capacity.
    pub fn with_cache_size(
        vocab: Vocabulary,
        config: TokenizerConfig,
        registry: SpecialTokenRegistry,
        cache_size: usize,
    ) -> Result<Self, TokenizerError> {
        // The special-range guard reads the registry while the rank offset
        // comes from the config; they must be the same count or the id
        // arithmetic goes wrong for ids between them.
        if registry.active() != config.num_special_tokens {
            return Err(TokenizerError::SpecialTokenCountMismatch {
                registry: registry.active(),
                config: config.num_special_tokens,
            });
        }

        let merges = MergeTable::derive(&vocab);

        let anchor = |name: &str| {
            registry
                .position(name)
                .ok_or_else(|| TokenizerError::UnknownSpecialToken(name.to_string()))
        };
        let unk_id = anchor("<unk>")?;
        let bos_id = anchor("<s>")?;
        let eos_id = anchor("</s>")?;
        let pad_id = anchor("<pad>")?;

        let cache_size_nz = NonZeroUsize::new(cache_size.max(1)).unwrap();
        let text_cache = Mutex::new(LruCache::new(cache_size_nz));

        Ok(Self {
            vocab,
            merges,
            registry,
            config,
            strategy: Strategy::Scan(ScanBpe),
            text_cache,
            cache_size,
            bos_id,
            eos_id,
            pad_id,
            unk_id,
        })
    }

    /// Switch between the baseline and the accelerated merge strategy.
    ///
    /// Both produce identical token sequences; the accelerated variant only
    /// changes how long encoding takes on large inputs.
    pub fn accelerated(mut self, accelerated: bool) -> Self {
        self.strategy = if accelerated {
            Strategy::Ranked(RankedBpe)
        } else {
            Strategy::Scan(ScanBpe)
        };
        self.clear_cache();
        self
    }

    #[inline]
    fn hash_slice(slice: &[u8]) -> u64 {
        let mut hasher = FxHasher::default();
        slice.hash(&mut hasher);
        hasher.finish()
    }

    /// Encode the raw bytes of one text, with LRU caching.
    fn encode_bytes_with_cache(&self, bytes: &[u8]) -> Vec<u32> {
        let hash = Self::hash_slice(bytes);
        if let Ok(mut cache) = self.text_cache.lock() {
            if let Some(cached) = cache.get(&hash) {
                return cached.clone();
            }
        }

        let pieces = self.strategy.split(bytes, &self.merges);

        let mut ids = Vec::with_capacity(pieces.len());
        for piece in pieces {
            if let Some(rank) = self.vocab.lookup(&piece) {
                ids.push(rank + self.config.num_special_tokens);
            } else {
                // Degraded path: re-emit the piece byte by byte, with the
                // unknown id as last resort. Never fails.
                tracing::debug!(
                    piece_len = piece.len(),
                    "piece missing from vocabulary; falling back to byte tokens"
                );
                for b in piece {
                    match self.vocab.lookup(&[b]) {
                        Some(rank) => ids.push(rank + self.config.num_special_tokens),
                        None => ids.push(self.unk_id),
                    }
                }
            }
        }

        if let Ok(mut cache) = self.text_cache.lock() {
            cache.put(hash, ids.clone());
        }

        ids
    }

    /// Encode text to token ids.
    ///
    /// Empty text yields an empty sequence regardless of the marker flags.
    /// `add_bos` prepends [`bos_id`](Self::bos_id); `add_eos` appends
    /// [`eos_id`](Self::eos_id).
    pub fn encode(&self, text: &str, add_bos: bool, add_eos: bool) -> Vec<u32> {
        if text.is_empty() {
            return vec![];
        }

        let mut ids = self.encode_bytes_with_cache(text.as_bytes());

        if add_bos {
            ids.insert(0, self.bos_id);
        }
        if add_eos {
            ids.push(self.eos_id);
        }

        ids
    }

    /// Encode many texts, element-wise and order-preserving.
    ///
    /// Runs on the Rayon pool; each item is independent, so parallelism never
    /// changes per-item results.
    pub fn encode_batch(&self, texts: &[String], add_bos: bool, add_eos: bool) -> Vec<Vec<u32>> {
        texts
            .par_iter()
            .map(|text| self.encode(text, add_bos, add_eos))
            .collect()
    }

    /// Decode token ids to text.
    ///
    /// Special ids follow `policy`; an unmapped ordinary rank falls back to a
    /// single raw byte (truncated), preserved from the reference rather than
    /// raised. Only [`SpecialTokenPolicy::Raise`] can fail, and it discards
    /// any partial output when it does.
    pub fn decode(
        &self,
        ids: &[u32],
        policy: SpecialTokenPolicy,
    ) -> Result<String, TokenizerError> {
        if ids.is_empty() {
            return Ok(String::new());
        }

        let mut bytes: Vec<u8> = Vec::with_capacity(ids.len() * 4);
        for &id in ids {
            if self.is_special_token(id) {
                match policy {
                    SpecialTokenPolicy::Ignore => continue,
                    SpecialTokenPolicy::Keep => {
                        bytes.extend_from_slice(self.registry.piece(id).as_bytes());
                    }
                    SpecialTokenPolicy::Raise => {
                        return Err(TokenizerError::SpecialTokenEncountered(id));
                    }
                }
            } else {
                let rank = id - self.config.num_special_tokens;
                match self.vocab.bytes_for(rank) {
                    Some(token) => bytes.extend_from_slice(token),
                    None => {
                        tracing::debug!(id, rank, "rank missing from vocabulary; emitting raw byte");
                        bytes.push(rank as u8);
                    }
                }
            }
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Decode many id sequences, element-wise and order-preserving.
    pub fn decode_batch(
        &self,
        batches: &[Vec<u32>],
        policy: SpecialTokenPolicy,
    ) -> Result<Vec<String>, TokenizerError> {
        batches
            .par_iter()
            .map(|ids| self.decode(ids, policy))
            .collect()
    }

    /// Render ids with special tokens visible, for debugging and inspection.
    pub fn stringify(&self, ids: &[u32]) -> String {
        // Keep never raises, so the error arm is unreachable.
        self.decode(ids, SpecialTokenPolicy::Keep).unwrap_or_default()
    }

    /// Number of tokens `text` encodes to, without markers.
    pub fn count_tokens(&self, text: &str) -> usize {
        self.encode(text, false, false).len()
    }

    /// The advertised vocabulary size from the model config.
    pub fn vocab_size(&self) -> u32 {
        self.config.vocab_size
    }

    /// Beginning-of-sequence id.
    pub fn bos_id(&self) -> u32 {
        self.bos_id
    }

    /// End-of-sequence id.
    pub fn eos_id(&self) -> u32 {
        self.eos_id
    }

    /// Padding id.
    pub fn pad_id(&self) -> u32 {
        self.pad_id
    }

    /// Unknown-token id.
    pub fn unk_id(&self) -> u32 {
        self.unk_id
    }

    /// Whether `id` falls in the reserved special range.
    pub fn is_special_token(&self, id: u32) -> bool {
        self.registry.is_special(id)
    }

    /// Whether `id` maps to a single-byte token.
    pub fn is_byte(&self, id: u32) -> bool {
        if self.is_special_token(id) {
            return false;
        }
        let rank = id - self.config.num_special_tokens;
        rank < 256
    }

    /// Id of a special token looked up by name.
    pub fn special_token_id(&self, name: &str) -> Result<u32, TokenizerError> {
        self.registry
            .position(name)
            .ok_or_else(|| TokenizerError::UnknownSpecialToken(name.to_string()))
    }

    /// The piece behind an id: its special-token name, its vocabulary
    /// byte-string, or the raw-byte fallback for unmapped ranks.
    pub fn id_to_piece(&self, id: u32) -> String {
        if self.is_special_token(id) {
            return self.registry.piece(id);
        }
        let rank = id - self.config.num_special_tokens;
        match self.vocab.bytes_for(rank) {
            Some(token) => String::from_utf8_lossy(token).into_owned(),
            None => String::from_utf8_lossy(&[rank as u8]).into_owned(),
        }
    }

    /// Number of reserved special id slots.
    pub fn num_special_tokens(&self) -> u32 {
        self.config.num_special_tokens
    }

    /// Model version tag.
    pub fn version(&self) -> &str {
        &self.config.version
    }

    /// The reference pre-tokenization pattern, stored but never applied.
    pub fn pattern(&self) -> &str {
        &self.config.pattern
    }

    /// The derived merge table.
    pub fn merges(&self) -> &MergeTable {
        &self.merges
    }

    /// The special-token registry.
    pub fn special_tokens(&self) -> &SpecialTokenRegistry {
        &self.registry
    }

    /// Drop all cached encodings.
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.text_cache.lock() {
            cache.clear();
        }
    }

    /// Number of cached encodings.
    pub fn cache_len(&self) -> usize {
        self.text_cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl Clone for Tokenizer {
    fn clone(&self) -> Self {
        // Caches are not shared between clones.
        let cache_size_nz = NonZeroUsize::new(self.cache_size.max(1)).unwrap();
        Self {
            vocab: self.vocab.clone(),
            merges: self.merges.clone(),
            registry: self.registry.clone(),
            config: self.config.clone(),
            strategy: match self.strategy {
                Strategy::Scan(s) => Strategy::Scan(s),
                Strategy::Ranked(s) => Strategy::Ranked(s),
            },
            text_cache: Mutex::new(LruCache::new(cache_size_nz)),
            cache_size: self.cache_size,
            bos_id: self.bos_id,
            eos_id: self.eos_id,
            pad_id: self.pad_id,
            unk_id: self.unk_id,
        }
    }
}
