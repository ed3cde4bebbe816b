use bulkswap_types::SignedTransaction;
use std::sync::Arc;
use std::time::Duration;

use crate::{LedgerClient, LedgerError};

const RETRY_DELAY: Duration = Duration::from_millis(250);

/// Submits signed transactions one at a time, retrying transient transport
/// failures up to a bounded number of times. Ledger rejections surface
/// immediately without a retry.
pub struct SubmissionGateway {
    ledger: Arc<dyn LedgerClient>,
    max_retries: u32,
}

impl SubmissionGateway {
    pub fn new(ledger: Arc<dyn LedgerClient>, max_retries: u32) -> Self {
        Self {
            ledger,
            max_retries,
        }
    }

    pub async fn submit(&self, tx: &SignedTransaction) -> Result<String, LedgerError> {
        let mut attempt = 0u32;

        loop {
            match self.ledger.submit(tx).await {
                Ok(signature) => return Ok(signature),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        request_index = tx.request_index,
                        attempt = attempt,
                        error = %err,
                        "Retrying submission after transport error"
                    );
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(err) => {
                    tracing::error!(
                        request_index = tx.request_index,
                        error = %err,
                        "Submission failed"
                    );
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedLedger {
        responses: Mutex<Vec<Result<String, LedgerError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedLedger {
        fn new(responses: Vec<Result<String, LedgerError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl LedgerClient for ScriptedLedger {
        async fn submit(&self, _tx: &SignedTransaction) -> Result<String, LedgerError> {
            *self.calls.lock().unwrap() += 1;
            self.responses.lock().unwrap().remove(0)
        }

        async fn finality_reference(&self) -> Result<crate::FinalityReference, LedgerError> {
            unimplemented!()
        }

        async fn block_height(&self) -> Result<u64, LedgerError> {
            unimplemented!()
        }

        async fn signature_status(
            &self,
            _signature: &str,
        ) -> Result<Option<crate::SignatureStatus>, LedgerError> {
            unimplemented!()
        }

        async fn transaction_record(
            &self,
            _signature: &str,
        ) -> Result<Option<crate::TransactionRecord>, LedgerError> {
            unimplemented!()
        }
    }

    fn signed_tx() -> SignedTransaction {
        SignedTransaction {
            request_index: 0,
            bytes: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn test_transport_error_retried_then_succeeds() {
        let ledger = Arc::new(ScriptedLedger::new(vec![
            Err(LedgerError::Transport("reset".into())),
            Err(LedgerError::Transport("reset".into())),
            Ok("sig-1".to_string()),
        ]));
        let gateway = SubmissionGateway::new(ledger.clone(), 2);

        let signature = gateway.submit(&signed_tx()).await.unwrap();
        assert_eq!(signature, "sig-1");
        assert_eq!(ledger.call_count(), 3);
    }

    #[tokio::test]
    async fn test_retry_budget_exhausted() {
        let ledger = Arc::new(ScriptedLedger::new(vec![
            Err(LedgerError::Transport("reset".into())),
            Err(LedgerError::Transport("reset".into())),
            Err(LedgerError::Transport("reset".into())),
        ]));
        let gateway = SubmissionGateway::new(ledger.clone(), 2);

        let err = gateway.submit(&signed_tx()).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(ledger.call_count(), 3);
    }

    #[tokio::test]
    async fn test_rejection_not_retried() {
        let ledger = Arc::new(ScriptedLedger::new(vec![Err(LedgerError::Rejected(
            "insufficient funds".into(),
        ))]));
        let gateway = SubmissionGateway::new(ledger.clone(), 2);

        let err = gateway.submit(&signed_tx()).await.unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(_)));
        assert_eq!(ledger.call_count(), 1);
    }
}
