//! Vocabulary storage for Tekken BPE models.
//!
//! A [`Vocabulary`] is a bidirectional mapping between token byte-strings and
//! their ranks, built once from the `(token_bytes, rank)` pairs of a model
//! file and never mutated afterwards. Ranks identify tokens independently of
//! the special-token id offset applied by the tokenizer facade.
//!
//! # Duplicate entries
//!
//! If the same byte-string appears twice with different ranks, the last entry
//! wins. This matches the reference loader, which silently overwrites on
//! duplicate keys; the stale reverse mapping is dropped so the two maps stay
//! exact inverses. Two *distinct* byte-strings claiming the same rank is a
//! real malformation (ranks are unique by contract) and fails construction.

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Errors raised while building a vocabulary.
#[derive(Error, Debug)]
pub enum VocabError {
    #[error("Rank {rank} is assigned to more than one token")]
    DuplicateRank { rank: u32 },
}

/// Immutable byte-string ⇄ rank mapping.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    token_to_rank: FxHashMap<Vec<u8>, u32>,
    rank_to_token: FxHashMap<u32, Vec<u8>>,
}

impl Vocabulary {
    /// Build a vocabulary from `(byte-string, rank)` pairs.
    ///
    /// Later entries overwrite earlier ones for the same byte-string; a rank
    /// shared by two distinct byte-strings is rejected.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (Vec<u8>, u32)>,
    ) -> Result<Self, VocabError> {
        let mut token_to_rank: FxHashMap<Vec<u8>, u32> = FxHashMap::default();
        let mut rank_to_token: FxHashMap<u32, Vec<u8>> = FxHashMap::default();

        for (token, rank) in entries {
            if let Some(&old_rank) = token_to_rank.get(&token) {
                if old_rank == rank {
                    continue;
                }
                // Last entry wins; drop the stale reverse mapping.
                tracing::debug!(old_rank, rank, "duplicate vocabulary entry overwritten");
                rank_to_token.remove(&old_rank);
            }
            if let Some(existing) = rank_to_token.get(&rank) {
                if existing != &token {
                    return Err(VocabError::DuplicateRank { rank });
                }
            }
            rank_to_token.insert(rank, token.clone());
            token_to_rank.insert(token, rank);
        }

        Ok(Self {
            token_to_rank,
            rank_to_token,
        })
    }

    /// Look up the rank of a byte-string.
    pub fn lookup(&self, token: &[u8]) -> Option<u32> {
        self.token_to_rank.get(token).copied()
    }

    /// Look up the byte-string for a rank.
    pub fn bytes_for(&self, rank: u32) -> Option<&[u8]> {
        self.rank_to_token.get(&rank).map(|t| t.as_slice())
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.token_to_rank.len()
    }

    /// Whether the vocabulary holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.token_to_rank.is_empty()
    }

    /// Iterate over `(byte-string, rank)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], u32)> {
        self.token_to_rank.iter().map(|(t, &r)| (t.as_slice(), r))
    }
}
