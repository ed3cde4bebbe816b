mod collector;
mod math;
mod transfer;

pub use collector::FeeCollector;
pub use math::{fee_amount, split_between};
pub use transfer::TransferService;

use bulkswap_gateway::{LedgerError, SigningError};

/// Fee collection errors
#[derive(Debug, thiserror::Error)]
pub enum FeeError {
    #[error("fee transfer build failed: {0}")]
    Build(String),

    #[error("fee signing failed: {0}")]
    Signing(#[from] SigningError),

    #[error("fee submission failed: {0}")]
    Submission(#[from] LedgerError),

    #[error("fee transaction rejected: {0}")]
    Rejected(String),

    #[error("fee confirmation inconclusive: {0}")]
    Inconclusive(String),
}
