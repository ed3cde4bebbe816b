use serde::{Deserialize, Serialize};

/// Terminal status of one swap request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapStatus {
    /// Confirmed on the ledger with no execution error.
    Success,

    /// Failed at some stage; `SwapResult::error` carries the detail.
    Error,

    /// Submitted but confirmation was inconclusive within the configured
    /// budget. The transaction may still land.
    TimedOut,
}

/// Per-request failure taxonomy.
///
/// All variants carry owned strings so results stay `Clone` and cheap to
/// snapshot for progress consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SwapError {
    #[error("invalid target address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("no quote available: {0}")]
    QuoteUnavailable(String),

    #[error("transaction build failed: {0}")]
    BuildFailed(String),

    #[error("transaction of {actual} bytes exceeds the {limit} byte batch ceiling")]
    TransactionTooLarge { actual: usize, limit: usize },

    #[error("signing declined: {0}")]
    SigningDeclined(String),

    #[error("submission failed: {0}")]
    SubmissionFailed(String),

    #[error("rejected by the ledger: {0}")]
    Rejected(String),

    #[error("confirmation timed out: {0}")]
    TimedOut(String),

    /// The auxiliary fee payment failed under the fee-after policy; swap
    /// results stand, the failure surfaces through the job's last error.
    #[error("fee job failed: {0}")]
    FeeJobFailed(String),
}

impl SwapError {
    /// Status a result carrying this error should report.
    pub fn status(&self) -> SwapStatus {
        match self {
            SwapError::TimedOut(_) => SwapStatus::TimedOut,
            _ => SwapStatus::Error,
        }
    }
}

/// Terminal outcome for one input `SwapRequest`.
///
/// Exactly one is produced per request that entered the job, in input order,
/// regardless of which batch the transaction ended up in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapResult {
    /// Correlation tag (caller tag, or the target asset id).
    pub tag: String,

    /// Submission signature, when the transaction made it onto the wire.
    /// Populated even for `TimedOut` results.
    pub signature: Option<String>,

    pub status: SwapStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SwapError>,

    /// Signature of the auxiliary fee transaction, attached under the
    /// fee-after policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_signature: Option<String>,
}

impl SwapResult {
    pub fn success(tag: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            signature: Some(signature.into()),
            status: SwapStatus::Success,
            error: None,
            fee_signature: None,
        }
    }

    pub fn failed(tag: impl Into<String>, error: SwapError) -> Self {
        Self {
            tag: tag.into(),
            signature: None,
            status: error.status(),
            error: Some(error),
            fee_signature: None,
        }
    }

    pub fn failed_with_signature(
        tag: impl Into<String>,
        signature: impl Into<String>,
        error: SwapError,
    ) -> Self {
        Self {
            tag: tag.into(),
            signature: Some(signature.into()),
            status: error.status(),
            error: Some(error),
            fee_signature: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SwapStatus::Success
    }
}

/// Auxiliary fee side-payment, derived once from the full request list of a
/// job (never per batch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeJob {
    /// Sum of all requested amounts in the job, in base units.
    pub total_base_units: u64,
}
