use async_trait::async_trait;
use bulkswap_types::Address;

use crate::FeeError;

/// Builds the serialized native-asset transfer transaction for a fee
/// payment. Kept behind a trait so the ledger-specific instruction encoding
/// stays out of the collection logic.
#[async_trait]
pub trait TransferService: Send + Sync {
    /// Build one unsigned transaction carrying a transfer instruction per
    /// payment. Amounts are in base units.
    async fn build_transfer(
        &self,
        from: &Address,
        payments: &[(Address, u64)],
    ) -> Result<Vec<u8>, FeeError>;
}
