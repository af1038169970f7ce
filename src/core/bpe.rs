//! Greedy BPE merge strategies.
//!
//! Both strategies implement the same contract: starting from one token per
//! byte, repeatedly apply the highest-priority merge that matches anywhere in
//! the working sequence, at its leftmost matching position, until no merge
//! applies. They must be observably identical; which one runs is an internal
//! construction-time choice.
//!
//! [`ScanBpe`] is the self-contained baseline: it re-walks the full merge
//! table against the full sequence for every single application, exactly as
//! the contract is stated. Quadratic or worse per merge step.
//!
//! [`RankedBpe`] gets the same answer near-linearly: picking the first merge
//! (in priority order) that matches anywhere is the same as picking the
//! adjacent pair whose derived merge has the minimum priority, leftmost on
//! ties. It tracks tokens as byte ranges into the input and re-scans only
//! pair priorities, never the table.

use super::merges::MergeTable;

/// A greedy merge strategy over raw input bytes.
///
/// Returns the final token byte-strings; id conversion happens in the facade.
pub trait BpeStrategy: Send + Sync {
    fn split(&self, bytes: &[u8], merges: &MergeTable) -> Vec<Vec<u8>>;
}

/// Reference strategy: full table re-scan per merge application.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanBpe;

impl BpeStrategy for ScanBpe {
    fn split(&self, bytes: &[u8], merges: &MergeTable) -> Vec<Vec<u8>> {
        let mut tokens: Vec<Vec<u8>> = bytes.iter().map(|&b| vec![b]).collect();

        'pass: while tokens.len() > 1 {
            for merge in merges.iter() {
                for i in 0..tokens.len() - 1 {
                    if tokens[i] == merge.first && tokens[i + 1] == merge.second {
                        let second = tokens.remove(i + 1);
                        tokens[i].extend_from_slice(&second);
                        continue 'pass;
                    }
                }
            }
            break;
        }

        tokens
    }
}

/// Accelerated strategy: rank-directed scan over byte ranges.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankedBpe;

impl BpeStrategy for RankedBpe {
    fn split(&self, bytes: &[u8], merges: &MergeTable) -> Vec<Vec<u8>> {
        // Tokens as (start, end) ranges into `bytes`; merging two adjacent
        // ranges is a boundary removal.
        let mut parts: Vec<(usize, usize)> = (0..bytes.len()).map(|i| (i, i + 1)).collect();
        let mut pair_buf: Vec<u8> = Vec::with_capacity(64);

        while parts.len() > 1 {
            let mut best_priority = u32::MAX;
            let mut best_idx = usize::MAX;

            for i in 0..parts.len() - 1 {
                pair_buf.clear();
                pair_buf.extend_from_slice(&bytes[parts[i].0..parts[i].1]);
                pair_buf.extend_from_slice(&bytes[parts[i + 1].0..parts[i + 1].1]);
                let split = parts[i].1 - parts[i].0;
                if let Some(priority) = merges.pair_priority(&pair_buf, split) {
                    // Strict < keeps the leftmost position on equal priority.
                    if priority < best_priority {
                        best_priority = priority;
                        best_idx = i;
                    }
                }
            }

            if best_idx == usize::MAX {
                break;
            }

            parts[best_idx].1 = parts[best_idx + 1].1;
            parts.remove(best_idx + 1);
        }

        parts
            .into_iter()
            .map(|(start, end)| bytes[start..end].to_vec())
            .collect()
    }
}
