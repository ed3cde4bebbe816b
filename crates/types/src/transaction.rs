use serde::{Deserialize, Serialize};

/// An unsigned, serialized transaction produced by the build endpoint,
/// tied back to the request it settles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltTransaction {
    /// Index of the originating request within the job.
    pub request_index: usize,

    /// Serialized unsigned transaction payload.
    pub payload: Vec<u8>,
}

impl BuiltTransaction {
    pub fn new(request_index: usize, payload: Vec<u8>) -> Self {
        Self {
            request_index,
            payload,
        }
    }

    /// Serialized byte length, used for batch packing.
    pub fn byte_len(&self) -> usize {
        self.payload.len()
    }
}

/// A transaction authorized by the signing authority, ready to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Index of the originating request within the job.
    pub request_index: usize,

    /// Serialized signed transaction bytes.
    pub bytes: Vec<u8>,
}
