//! Core tokenization engine for tekkenizer.
//!
//! Inference-time encode/decode over a fixed, pretrained Tekken BPE
//! vocabulary. Everything is built once at load time and read-only
//! afterwards, so every call is a pure function of immutable state and its
//! arguments.
//!
//! # Architecture
//!
//! - [`Vocabulary`]: bidirectional byte-string ⇄ rank maps
//! - [`MergeTable`]: merge rules derived once from the vocabulary, ordered by
//!   priority
//! - [`SpecialTokenRegistry`]: position-indexed control-token names, injected
//!   at construction (canonical Tekken list as default)
//! - [`bpe`]: the greedy merge strategies (reference scan and an accelerated
//!   rank-directed variant with identical output)
//! - [`Tokenizer`]: the facade composing the above, with an LRU encode cache
//!   and Rayon-parallel batch operations
//! - [`model`]: Tekken JSON model-file loading
//! - [`pretrained`]: release-tag to model-file resolution

pub mod bpe;
mod merges;
mod model;
pub mod pretrained;
mod special;
mod tokenizer;
mod vocab;

pub use bpe::{BpeStrategy, RankedBpe, ScanBpe};
pub use merges::{Merge, MergeTable};
pub use model::{from_model_file, from_model_json};
pub use pretrained::{from_pretrained, TekkenRelease};
pub use special::{SpecialTokenPolicy, SpecialTokenRegistry, CANONICAL_SPECIAL_TOKENS};
pub use tokenizer::{Tokenizer, TokenizerConfig, TokenizerError};
pub use vocab::{VocabError, Vocabulary};
