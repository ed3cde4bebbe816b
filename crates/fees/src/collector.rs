use bulkswap_gateway::{ConfirmOutcome, ConfirmationPolicy, SigningAuthority, SubmissionGateway};
use bulkswap_types::{Address, BuiltTransaction, FeeJob};
use std::sync::Arc;

use crate::{fee_amount, split_between, FeeError, TransferService};

/// Drives one fee side-payment end to end: compute, build, sign, submit,
/// confirm. Derived once per job from the full request total, never per
/// batch.
pub struct FeeCollector {
    transfer: Arc<dyn TransferService>,
    signer: Arc<dyn SigningAuthority>,
    submission: Arc<SubmissionGateway>,
    confirmation: Arc<dyn ConfirmationPolicy>,
    fee_bps: u64,
    recipients: Vec<Address>,
}

impl FeeCollector {
    pub fn new(
        transfer: Arc<dyn TransferService>,
        signer: Arc<dyn SigningAuthority>,
        submission: Arc<SubmissionGateway>,
        confirmation: Arc<dyn ConfirmationPolicy>,
        fee_bps: u64,
        recipients: Vec<Address>,
    ) -> Self {
        Self {
            transfer,
            signer,
            submission,
            confirmation,
            fee_bps,
            recipients,
        }
    }

    /// Execute the fee payment for a job. `Ok(None)` means no fee was owed
    /// (zero amount or no recipients configured).
    pub async fn collect(&self, job: &FeeJob) -> Result<Option<String>, FeeError> {
        let amount = fee_amount(job.total_base_units, self.fee_bps);
        if amount == 0 || self.recipients.is_empty() {
            tracing::debug!(
                total = job.total_base_units,
                fee_bps = self.fee_bps,
                "No fee owed"
            );
            return Ok(None);
        }

        let shares = split_between(amount, self.recipients.len());
        let payments: Vec<(Address, u64)> = self
            .recipients
            .iter()
            .cloned()
            .zip(shares)
            .filter(|(_, share)| *share > 0)
            .collect();

        let payload = self
            .transfer
            .build_transfer(self.signer.identity(), &payments)
            .await?;

        let signed = self.signer.sign(&BuiltTransaction::new(0, payload)).await?;
        let signature = self.submission.submit(&signed).await?;

        match self.confirmation.confirm(&signature).await {
            ConfirmOutcome::Confirmed => {
                tracing::info!(
                    signature = %signature,
                    amount = amount,
                    recipients = payments.len(),
                    "Fee payment confirmed"
                );
                Ok(Some(signature))
            }
            ConfirmOutcome::Rejected { detail } => Err(FeeError::Rejected(detail)),
            ConfirmOutcome::TimedOut { detail } => Err(FeeError::Inconclusive(detail)),
        }
    }
}
