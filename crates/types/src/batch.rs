use serde::{Deserialize, Serialize};

use crate::BuiltTransaction;

/// An ordered, size-bounded group of built transactions.
///
/// Invariant: the summed byte length never exceeds the ceiling it was packed
/// against, and a batch is never empty. Batching exists for authorization
/// convenience (one wallet prompt per batch), not atomic execution.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Batch {
    pub transactions: Vec<BuiltTransaction>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.transactions.iter().map(|tx| tx.byte_len()).sum()
    }

    /// Request indices covered by this batch, in order.
    pub fn request_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.transactions.iter().map(|tx| tx.request_index)
    }
}
