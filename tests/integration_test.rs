//! End-to-end job tests against hand-written mock collaborators.

use async_trait::async_trait;
use bulkswap::config::{AppConfig, FeePolicy};
use bulkswap::exchange::{ExchangeError, Quote, QuoteService};
use bulkswap::fees::{FeeError, TransferService};
use bulkswap::gateway::{
    ConfirmationStatus, FinalityReference, LedgerClient, LedgerError, SignatureStatus,
    SigningAuthority, SigningError, TransactionRecord,
};
use bulkswap::orchestrator::BulkSwapOrchestrator;
use bulkswap::types::{
    Address, Batch, BuiltTransaction, ExecutionHints, SignedTransaction, SwapError, SwapRequest,
    SwapStatus,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

const IDENTITY: &str = "So11111111111111111111111111111111111111112";
const MINT_A: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
const MINT_B: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";
const MINT_HUGE: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
const MINT_UNROUTED: &str = "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN";

/// Exchange with a fixed payload size per known asset; unknown assets have
/// no route.
struct MockExchange {
    payload_sizes: HashMap<String, usize>,
    quote_calls: AtomicU32,
}

impl MockExchange {
    fn new(assets: &[(&str, usize)]) -> Self {
        Self {
            payload_sizes: assets
                .iter()
                .map(|(asset, size)| (asset.to_string(), *size))
                .collect(),
            quote_calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl QuoteService for MockExchange {
    async fn quote(
        &self,
        source_asset: &str,
        target_asset: &str,
        amount_base_units: u64,
    ) -> Result<Option<Quote>, ExchangeError> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        if !self.payload_sizes.contains_key(target_asset) {
            return Ok(None);
        }
        Ok(Some(Quote {
            input_asset: source_asset.to_string(),
            output_asset: target_asset.to_string(),
            in_amount: amount_base_units,
            response: serde_json::json!({ "outputMint": target_asset }),
        }))
    }

    async fn build_swap(
        &self,
        quote: &Quote,
        _signer: &Address,
        _hints: &ExecutionHints,
    ) -> Result<Vec<u8>, ExchangeError> {
        let size = self.payload_sizes[&quote.output_asset];
        Ok(vec![0u8; size])
    }
}

/// Signer that declines any batch containing a poisoned request index.
struct MockSigner {
    identity: Address,
    decline_indices: HashSet<usize>,
    batches_signed: AtomicU32,
}

impl MockSigner {
    fn new(decline_indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            identity: IDENTITY.parse().unwrap(),
            decline_indices: decline_indices.into_iter().collect(),
            batches_signed: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl SigningAuthority for MockSigner {
    fn identity(&self) -> &Address {
        &self.identity
    }

    async fn sign_all(&self, batch: &Batch) -> Result<Vec<SignedTransaction>, SigningError> {
        if batch
            .request_indices()
            .any(|i| self.decline_indices.contains(&i))
        {
            return Err(SigningError::Declined("user rejected the batch".into()));
        }
        self.batches_signed.fetch_add(1, Ordering::SeqCst);
        Ok(batch
            .transactions
            .iter()
            .map(|tx| SignedTransaction {
                request_index: tx.request_index,
                bytes: tx.payload.clone(),
            })
            .collect())
    }

    async fn sign(&self, tx: &BuiltTransaction) -> Result<SignedTransaction, SigningError> {
        Ok(SignedTransaction {
            request_index: tx.request_index,
            bytes: tx.payload.clone(),
        })
    }
}

#[derive(Clone)]
enum Fate {
    Confirm,
    ExecutionError(String),
    NeverObserved,
}

/// Ledger that assigns a scripted fate per request index. Submission always
/// succeeds; the fate plays out during confirmation.
struct MockLedger {
    fates: HashMap<usize, Fate>,
    submissions: Mutex<Vec<String>>,
}

impl MockLedger {
    fn new(fates: impl IntoIterator<Item = (usize, Fate)>) -> Self {
        Self {
            fates: fates.into_iter().collect(),
            submissions: Mutex::new(Vec::new()),
        }
    }

    fn fate_for(&self, signature: &str) -> Fate {
        signature
            .strip_prefix("sig-")
            .and_then(|n| n.parse::<usize>().ok())
            .and_then(|i| self.fates.get(&i).cloned())
            .unwrap_or(Fate::Confirm)
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn submit(&self, tx: &SignedTransaction) -> Result<String, LedgerError> {
        let signature = format!("sig-{}", tx.request_index);
        self.submissions.lock().unwrap().push(signature.clone());
        Ok(signature)
    }

    async fn finality_reference(&self) -> Result<FinalityReference, LedgerError> {
        Ok(FinalityReference {
            blockhash: "hash".to_string(),
            last_valid_block_height: u64::MAX,
        })
    }

    async fn block_height(&self) -> Result<u64, LedgerError> {
        Ok(1)
    }

    async fn signature_status(
        &self,
        signature: &str,
    ) -> Result<Option<SignatureStatus>, LedgerError> {
        match self.fate_for(signature) {
            Fate::Confirm => Ok(Some(SignatureStatus {
                status: ConfirmationStatus::Finalized,
                error: None,
            })),
            Fate::ExecutionError(detail) => Ok(Some(SignatureStatus {
                status: ConfirmationStatus::Confirmed,
                error: Some(detail),
            })),
            Fate::NeverObserved => Ok(None),
        }
    }

    async fn transaction_record(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        match self.fate_for(signature) {
            Fate::Confirm => Ok(Some(TransactionRecord { error: None })),
            Fate::ExecutionError(detail) => Ok(Some(TransactionRecord {
                error: Some(detail),
            })),
            Fate::NeverObserved => Ok(None),
        }
    }
}

struct MockTransfer {
    built: Mutex<Vec<Vec<(Address, u64)>>>,
    fail: bool,
}

#[async_trait]
impl TransferService for MockTransfer {
    async fn build_transfer(
        &self,
        _from: &Address,
        payments: &[(Address, u64)],
    ) -> Result<Vec<u8>, FeeError> {
        if self.fail {
            return Err(FeeError::Build("transfer encoding failed".into()));
        }
        self.built.lock().unwrap().push(payments.to_vec());
        Ok(vec![9u8; 120])
    }
}

fn fast_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.confirmation.max_attempts = 2;
    config.confirmation.base_delay_ms = 1;
    config.fees.fee_bps = 0;
    config
}

fn request(asset: &str, amount: u64, tag: &str) -> SwapRequest {
    SwapRequest::new(asset, Decimal::from(amount)).with_tag(tag)
}

#[tokio::test]
async fn test_every_request_gets_one_result_in_order() {
    let exchange = Arc::new(MockExchange::new(&[(MINT_A, 300), (MINT_B, 300)]));
    let orchestrator = BulkSwapOrchestrator::builder(fast_config())
        .exchange(exchange)
        .signer(Arc::new(MockSigner::new([])))
        .ledger(Arc::new(MockLedger::new([])))
        .build()
        .unwrap();

    let results = orchestrator
        .execute_bulk_swap(vec![
            request(MINT_A, 1, "ok-1"),
            request(MINT_UNROUTED, 1, "no-route"),
            request("!!!", 1, "bad-address"),
            request(MINT_B, 2, "ok-2"),
        ])
        .await
        .unwrap();

    assert_eq!(
        results.iter().map(|r| r.tag.as_str()).collect::<Vec<_>>(),
        vec!["ok-1", "no-route", "bad-address", "ok-2"]
    );
    assert!(results[0].is_success());
    assert!(matches!(
        results[1].error,
        Some(SwapError::QuoteUnavailable(_))
    ));
    assert!(matches!(
        results[2].error,
        Some(SwapError::InvalidAddress(_))
    ));
    assert!(results[3].is_success());
}

#[tokio::test]
async fn test_invalid_address_triggers_no_quote_call() {
    let exchange = Arc::new(MockExchange::new(&[]));
    let orchestrator = BulkSwapOrchestrator::builder(fast_config())
        .exchange(exchange.clone())
        .signer(Arc::new(MockSigner::new([])))
        .ledger(Arc::new(MockLedger::new([])))
        .build()
        .unwrap();

    orchestrator
        .execute_bulk_swap(vec![request("not base58", 1, "bad")])
        .await
        .unwrap();

    assert_eq!(exchange.quote_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unrepresentable_amount_fails_alone() {
    let exchange = Arc::new(MockExchange::new(&[(MINT_A, 300)]));
    let orchestrator = BulkSwapOrchestrator::builder(fast_config())
        .exchange(exchange)
        .signer(Arc::new(MockSigner::new([])))
        .ledger(Arc::new(MockLedger::new([])))
        .build()
        .unwrap();

    let results = orchestrator
        .execute_bulk_swap(vec![
            SwapRequest::new(MINT_A, Decimal::MAX).with_tag("too-big"),
            request(MINT_A, 1, "fine"),
        ])
        .await
        .unwrap();

    assert!(matches!(
        results[0].error,
        Some(SwapError::InvalidAmount(_))
    ));
    assert!(results[1].is_success());
}

#[tokio::test]
async fn test_batches_split_by_byte_ceiling() {
    // Three 500-byte transactions against the default 1232-byte ceiling
    // pack as [0, 1], [2].
    let exchange = Arc::new(MockExchange::new(&[(MINT_A, 500)]));
    let signer = Arc::new(MockSigner::new([]));
    let orchestrator = BulkSwapOrchestrator::builder(fast_config())
        .exchange(exchange)
        .signer(signer.clone())
        .ledger(Arc::new(MockLedger::new([])))
        .build()
        .unwrap();

    let results = orchestrator
        .execute_bulk_swap(vec![
            request(MINT_A, 1, "t0"),
            request(MINT_A, 1, "t1"),
            request(MINT_A, 1, "t2"),
        ])
        .await
        .unwrap();

    assert!(results.iter().all(|r| r.is_success()));
    assert_eq!(signer.batches_signed.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_declined_batch_does_not_block_later_batches() {
    // Request 0 poisons the first batch; request 2 lands alone in the
    // second batch and still settles.
    let exchange = Arc::new(MockExchange::new(&[(MINT_A, 700)]));
    let orchestrator = BulkSwapOrchestrator::builder(fast_config())
        .exchange(exchange)
        .signer(Arc::new(MockSigner::new([0])))
        .ledger(Arc::new(MockLedger::new([])))
        .build()
        .unwrap();

    let results = orchestrator
        .execute_bulk_swap(vec![
            request(MINT_A, 1, "declined-0"),
            request(MINT_A, 1, "declined-1"),
            request(MINT_A, 1, "survivor"),
        ])
        .await
        .unwrap();

    assert!(matches!(
        results[0].error,
        Some(SwapError::SigningDeclined(_))
    ));
    assert!(matches!(
        results[1].error,
        Some(SwapError::SigningDeclined(_))
    ));
    assert!(results[2].is_success());
    assert!(results[0].signature.is_none());
}

#[tokio::test]
async fn test_oversized_transaction_rejected_alone() {
    let exchange = Arc::new(MockExchange::new(&[(MINT_A, 300), (MINT_HUGE, 4000)]));
    let orchestrator = BulkSwapOrchestrator::builder(fast_config())
        .exchange(exchange)
        .signer(Arc::new(MockSigner::new([])))
        .ledger(Arc::new(MockLedger::new([])))
        .build()
        .unwrap();

    let results = orchestrator
        .execute_bulk_swap(vec![
            request(MINT_A, 1, "fits"),
            request(MINT_HUGE, 1, "too-big"),
        ])
        .await
        .unwrap();

    assert!(results[0].is_success());
    assert_eq!(
        results[1].error,
        Some(SwapError::TransactionTooLarge {
            actual: 4000,
            limit: 1232
        })
    );
}

#[tokio::test]
async fn test_execution_error_never_reports_success() {
    let exchange = Arc::new(MockExchange::new(&[(MINT_A, 300)]));
    let orchestrator = BulkSwapOrchestrator::builder(fast_config())
        .exchange(exchange)
        .signer(Arc::new(MockSigner::new([])))
        .ledger(Arc::new(MockLedger::new([(
            0,
            Fate::ExecutionError("slippage exceeded".to_string()),
        )])))
        .build()
        .unwrap();

    let results = orchestrator
        .execute_bulk_swap(vec![request(MINT_A, 1, "reverted")])
        .await
        .unwrap();

    assert_eq!(results[0].status, SwapStatus::Error);
    assert!(matches!(results[0].error, Some(SwapError::Rejected(_))));
    // The transaction was on the wire, so the signature is kept.
    assert_eq!(results[0].signature.as_deref(), Some("sig-0"));
}

#[tokio::test]
async fn test_timed_out_result_keeps_signature() {
    let exchange = Arc::new(MockExchange::new(&[(MINT_A, 300)]));
    let orchestrator = BulkSwapOrchestrator::builder(fast_config())
        .exchange(exchange)
        .signer(Arc::new(MockSigner::new([])))
        .ledger(Arc::new(MockLedger::new([(0, Fate::NeverObserved)])))
        .build()
        .unwrap();

    let results = orchestrator
        .execute_bulk_swap(vec![request(MINT_A, 1, "slow")])
        .await
        .unwrap();

    assert_eq!(results[0].status, SwapStatus::TimedOut);
    assert_eq!(results[0].signature.as_deref(), Some("sig-0"));
    assert!(matches!(results[0].error, Some(SwapError::TimedOut(_))));
}

#[tokio::test]
async fn test_fee_after_attaches_signature_to_all_results() {
    let mut config = fast_config();
    config.fees.fee_bps = 50;
    config.fees.recipients = vec![IDENTITY.to_string()];
    config.fees.policy = FeePolicy::After;

    let transfer = Arc::new(MockTransfer {
        built: Mutex::new(Vec::new()),
        fail: false,
    });
    let exchange = Arc::new(MockExchange::new(&[(MINT_A, 300)]));
    let orchestrator = BulkSwapOrchestrator::builder(config)
        .exchange(exchange)
        .signer(Arc::new(MockSigner::new([])))
        .ledger(Arc::new(MockLedger::new([])))
        .transfer(transfer.clone())
        .build()
        .unwrap();

    let results = orchestrator
        .execute_bulk_swap(vec![
            request(MINT_A, 1, "a"),
            request("bogus!", 1, "failed-entry"),
        ])
        .await
        .unwrap();

    // The fee signature is attached regardless of individual outcome.
    assert!(results.iter().all(|r| r.fee_signature.is_some()));

    // 50 bps of 1 whole unit (1e9 base units) is 5_000_000.
    let payments = transfer.built.lock().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0][0].1, 5_000_000);
}

#[tokio::test]
async fn test_fee_after_failure_is_permissive() {
    let mut config = fast_config();
    config.fees.fee_bps = 50;
    config.fees.recipients = vec![IDENTITY.to_string()];
    config.fees.policy = FeePolicy::After;

    let transfer = Arc::new(MockTransfer {
        built: Mutex::new(Vec::new()),
        fail: true,
    });
    let exchange = Arc::new(MockExchange::new(&[(MINT_A, 300)]));
    let orchestrator = BulkSwapOrchestrator::builder(config)
        .exchange(exchange)
        .signer(Arc::new(MockSigner::new([])))
        .ledger(Arc::new(MockLedger::new([])))
        .transfer(transfer)
        .build()
        .unwrap();

    let results = orchestrator
        .execute_bulk_swap(vec![request(MINT_A, 1, "a")])
        .await
        .unwrap();

    assert!(results[0].is_success());
    assert!(results[0].fee_signature.is_none());

    // The fee failure is still surfaced through the aggregate error.
    let last_error = orchestrator.last_error().unwrap();
    assert!(last_error.contains("fee job failed"));
}

#[tokio::test]
async fn test_fee_before_failure_aborts_the_job() {
    let mut config = fast_config();
    config.fees.fee_bps = 50;
    config.fees.recipients = vec![IDENTITY.to_string()];
    config.fees.policy = FeePolicy::Before;

    let transfer = Arc::new(MockTransfer {
        built: Mutex::new(Vec::new()),
        fail: true,
    });
    let exchange = Arc::new(MockExchange::new(&[(MINT_A, 300)]));
    let orchestrator = BulkSwapOrchestrator::builder(config)
        .exchange(exchange.clone())
        .signer(Arc::new(MockSigner::new([])))
        .ledger(Arc::new(MockLedger::new([])))
        .transfer(transfer)
        .build()
        .unwrap();

    let err = orchestrator
        .execute_bulk_swap(vec![request(MINT_A, 1, "a")])
        .await
        .unwrap_err();

    assert!(matches!(err, bulkswap::JobError::FeeJobFailed(_)));
    // Aborted before any quoting.
    assert_eq!(exchange.quote_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_tiny_job_owes_no_fee() {
    let mut config = fast_config();
    config.fees.fee_bps = 50;
    config.fees.recipients = vec![IDENTITY.to_string()];
    config.fees.policy = FeePolicy::After;

    let transfer = Arc::new(MockTransfer {
        built: Mutex::new(Vec::new()),
        fail: false,
    });
    let exchange = Arc::new(MockExchange::new(&[(MINT_A, 300)]));
    let orchestrator = BulkSwapOrchestrator::builder(config)
        .exchange(exchange)
        .signer(Arc::new(MockSigner::new([])))
        .ledger(Arc::new(MockLedger::new([])))
        .transfer(transfer.clone())
        .build()
        .unwrap();

    // 50 bps of 3 base units floors to zero.
    let results = orchestrator
        .execute_bulk_swap(vec![SwapRequest::new(MINT_A, Decimal::new(3, 9))])
        .await
        .unwrap();

    assert!(results[0].is_success());
    assert!(results[0].fee_signature.is_none());
    assert!(transfer.built.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_single_swap_path() {
    let exchange = Arc::new(MockExchange::new(&[(MINT_A, 300)]));
    let orchestrator = BulkSwapOrchestrator::builder(fast_config())
        .exchange(exchange)
        .signer(Arc::new(MockSigner::new([])))
        .ledger(Arc::new(MockLedger::new([])))
        .build()
        .unwrap();

    let result = orchestrator.execute_swap(request(MINT_A, 1, "solo")).await;

    assert!(result.is_success());
    assert_eq!(result.tag, "solo");
    assert_eq!(result.signature.as_deref(), Some("sig-0"));
}

#[tokio::test]
async fn test_progress_reaches_total() {
    let exchange = Arc::new(MockExchange::new(&[(MINT_A, 300)]));
    let orchestrator = BulkSwapOrchestrator::builder(fast_config())
        .exchange(exchange)
        .signer(Arc::new(MockSigner::new([])))
        .ledger(Arc::new(MockLedger::new([])))
        .build()
        .unwrap();

    let progress = orchestrator.progress();
    orchestrator
        .execute_bulk_swap(vec![
            request(MINT_A, 1, "a"),
            request(MINT_A, 1, "b"),
            request("bogus!", 1, "c"),
        ])
        .await
        .unwrap();

    let snapshot = *progress.borrow();
    assert_eq!(snapshot.current_index, 3);
    assert_eq!(snapshot.total, 3);
    assert!(!snapshot.processing_fee);
}
