//! Merge-table derivation from a vocabulary.
//!
//! Tekken model files ship only the vocabulary; the BPE merge rules are
//! implied by it. For every token longer than one byte, the first split
//! position (scanning left to right) whose two halves are both vocabulary
//! entries yields that token's merge, with priority equal to the token's
//! rank. First valid split wins, not necessarily the split the vocabulary
//! was trained with. That simplification is load-bearing for compatibility
//! with the reference tokenizer and must not be "improved".
//!
//! Tokens with no valid split (a half was never assigned a rank of its own)
//! contribute no merge and can only be produced by a whole-piece vocabulary
//! hit, never by the merge loop.

use rustc_hash::FxHashMap;

use super::vocab::Vocabulary;

/// A single merge rule: `first ++ second` is a vocabulary entry whose rank is
/// this merge's priority. Lower priority applies earlier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merge {
    pub first: Vec<u8>,
    pub second: Vec<u8>,
    pub priority: u32,
}

/// The ordered list of merges implied by a [`Vocabulary`].
///
/// Immutable after [`MergeTable::derive`]. The list is sorted ascending by
/// priority; a by-result index supports O(1) "is this adjacent pair a known
/// merge" queries for the accelerated encode strategy.
#[derive(Debug, Clone, Default)]
pub struct MergeTable {
    merges: Vec<Merge>,
    // merged byte-string -> (length of `first`, priority)
    by_result: FxHashMap<Vec<u8>, (usize, u32)>,
}

impl MergeTable {
    /// Derive the merge table from a vocabulary.
    pub fn derive(vocab: &Vocabulary) -> Self {
        let mut merges = Vec::new();

        for (token, rank) in vocab.iter() {
            if token.len() < 2 {
                continue;
            }
            for i in 1..token.len() {
                let (first, second) = token.split_at(i);
                if vocab.lookup(first).is_some() && vocab.lookup(second).is_some() {
                    merges.push(Merge {
                        first: first.to_vec(),
                        second: second.to_vec(),
                        priority: rank,
                    });
                    break;
                }
            }
        }

        merges.sort_by_key(|m| m.priority);

        let by_result = merges
            .iter()
            .map(|m| {
                let mut result = m.first.clone();
                result.extend_from_slice(&m.second);
                (result, (m.first.len(), m.priority))
            })
            .collect();

        Self { merges, by_result }
    }

    /// Priority of the merge producing `pair_bytes` from a first half of
    /// `split` bytes, if that exact merge was derived.
    ///
    /// Each merged byte-string has at most one derived merge, so checking the
    /// recorded split length is equivalent to comparing both halves.
    pub fn pair_priority(&self, pair_bytes: &[u8], split: usize) -> Option<u32> {
        match self.by_result.get(pair_bytes) {
            Some(&(first_len, priority)) if first_len == split => Some(priority),
            _ => None,
        }
    }

    /// Merges in ascending priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Merge> {
        self.merges.iter()
    }

    /// Number of derived merges.
    pub fn len(&self) -> usize {
        self.merges.len()
    }

    /// Whether no merges were derived.
    pub fn is_empty(&self) -> bool {
        self.merges.is_empty()
    }
}
