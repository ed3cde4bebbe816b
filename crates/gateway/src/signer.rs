use async_trait::async_trait;
use bulkswap_types::{Address, Batch, BuiltTransaction, SignedTransaction};

/// Signing authority errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SigningError {
    /// The authority refused to sign (user rejection, policy denial).
    #[error("signing declined: {0}")]
    Declined(String),

    #[error("signing authority unavailable: {0}")]
    Unavailable(String),
}

/// External authority that authorizes transactions.
///
/// `sign_all` is atomic per batch: either every transaction in the batch
/// comes back signed or none do. A decline fails only the batch that was
/// presented; later batches are offered independently.
#[async_trait]
pub trait SigningAuthority: Send + Sync {
    /// Public identity whose funds the transactions spend.
    fn identity(&self) -> &Address;

    /// Sign every transaction in the batch in one authorization.
    async fn sign_all(&self, batch: &Batch) -> Result<Vec<SignedTransaction>, SigningError>;

    /// Sign a single transaction, used by the fee side-payment path.
    async fn sign(&self, tx: &BuiltTransaction) -> Result<SignedTransaction, SigningError>;
}
