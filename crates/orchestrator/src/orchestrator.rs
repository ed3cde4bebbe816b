use bulkswap_config::{AppConfig, ConfirmationStrategy, FeePolicy};
use bulkswap_exchange::{Quote, QuoteService, TransactionBuilder};
use bulkswap_fees::{FeeCollector, TransferService};
use bulkswap_gateway::{
    ConfirmOutcome, ConfirmationPolicy, LedgerClient, MultiAttemptConfirmation,
    SigningAuthority, SinglePassConfirmation, SubmissionGateway,
};
use bulkswap_types::{
    Address, ExecutionHints, FeeJob, SwapError, SwapRequest, SwapResult, BASE_ASSET_ID,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

use crate::{pack, Progress, ProgressTracker};

/// Job-level errors. Per-request failures are carried in the result list,
/// never here.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The fee-before payment failed, so no swap work was attempted.
    #[error("fee job failed: {0}")]
    FeeJobFailed(String),
}

/// Orchestrator construction errors
#[derive(Debug, thiserror::Error)]
pub enum BuilderError {
    #[error("missing component: {0}")]
    MissingComponent(&'static str),

    #[error("invalid fee recipient {address}: {reason}")]
    InvalidFeeRecipient { address: String, reason: String },
}

/// Builds a `BulkSwapOrchestrator` from its external collaborators and the
/// application config.
pub struct BulkSwapOrchestratorBuilder {
    config: AppConfig,
    exchange: Option<Arc<dyn QuoteService>>,
    signer: Option<Arc<dyn SigningAuthority>>,
    ledger: Option<Arc<dyn LedgerClient>>,
    transfer: Option<Arc<dyn TransferService>>,
    source_asset: String,
}

impl BulkSwapOrchestratorBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            exchange: None,
            signer: None,
            ledger: None,
            transfer: None,
            source_asset: BASE_ASSET_ID.to_string(),
        }
    }

    pub fn exchange(mut self, exchange: Arc<dyn QuoteService>) -> Self {
        self.exchange = Some(exchange);
        self
    }

    pub fn signer(mut self, signer: Arc<dyn SigningAuthority>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn ledger(mut self, ledger: Arc<dyn LedgerClient>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn transfer(mut self, transfer: Arc<dyn TransferService>) -> Self {
        self.transfer = Some(transfer);
        self
    }

    pub fn source_asset(mut self, source_asset: impl Into<String>) -> Self {
        self.source_asset = source_asset.into();
        self
    }

    pub fn build(self) -> Result<BulkSwapOrchestrator, BuilderError> {
        let exchange = self
            .exchange
            .ok_or(BuilderError::MissingComponent("exchange client"))?;
        let signer = self
            .signer
            .ok_or(BuilderError::MissingComponent("signing authority"))?;
        let ledger = self
            .ledger
            .ok_or(BuilderError::MissingComponent("ledger client"))?;

        let config = self.config;

        let submission = Arc::new(SubmissionGateway::new(
            ledger.clone(),
            config.swap.submit_retries,
        ));
        // The single-swap path gets one extra retry over the batch path.
        let single_submission = Arc::new(SubmissionGateway::new(
            ledger.clone(),
            config.swap.submit_retries + 1,
        ));

        let confirmation: Arc<dyn ConfirmationPolicy> = match config.confirmation.strategy {
            ConfirmationStrategy::SinglePass => Arc::new(SinglePassConfirmation::new(
                ledger.clone(),
                Duration::from_millis(config.confirmation.timeout_ms),
            )),
            ConfirmationStrategy::MultiAttempt => Arc::new(MultiAttemptConfirmation::new(
                ledger.clone(),
                config.confirmation.max_attempts,
                Duration::from_millis(config.confirmation.base_delay_ms),
            )),
        };

        let fee = if config.fees.fee_bps > 0 && !config.fees.recipients.is_empty() {
            let transfer = self
                .transfer
                .ok_or(BuilderError::MissingComponent("transfer service"))?;

            let mut recipients = Vec::with_capacity(config.fees.recipients.len());
            for raw in &config.fees.recipients {
                let address = raw.parse::<Address>().map_err(|e| {
                    BuilderError::InvalidFeeRecipient {
                        address: raw.clone(),
                        reason: e.to_string(),
                    }
                })?;
                recipients.push(address);
            }

            Some(Arc::new(FeeCollector::new(
                transfer,
                signer.clone(),
                submission.clone(),
                confirmation.clone(),
                config.fees.fee_bps,
                recipients,
            )))
        } else {
            None
        };

        let hints = ExecutionHints {
            dynamic_compute_limit: config.swap.dynamic_compute_limit,
            priority_fee: Default::default(),
            slippage_bps: config.swap.slippage_bps,
        };

        Ok(BulkSwapOrchestrator {
            tx_builder: TransactionBuilder::new(exchange.clone(), hints),
            exchange,
            signer,
            submission,
            single_submission,
            confirmation,
            fee,
            fee_policy: config.fees.policy,
            max_batch_bytes: config.swap.max_batch_bytes,
            source_asset: self.source_asset,
            progress: ProgressTracker::new(),
            last_error: Mutex::new(None),
        })
    }
}

/// Turns a list of "buy asset X with N base currency" requests into quoted,
/// built, batched, signed, submitted, and confirmed ledger transactions,
/// one terminal result per request.
pub struct BulkSwapOrchestrator {
    exchange: Arc<dyn QuoteService>,
    tx_builder: TransactionBuilder,
    signer: Arc<dyn SigningAuthority>,
    submission: Arc<SubmissionGateway>,
    single_submission: Arc<SubmissionGateway>,
    confirmation: Arc<dyn ConfirmationPolicy>,
    fee: Option<Arc<FeeCollector>>,
    fee_policy: FeePolicy,
    max_batch_bytes: usize,
    source_asset: String,
    progress: ProgressTracker,
    last_error: Mutex<Option<String>>,
}

impl BulkSwapOrchestrator {
    pub fn builder(config: AppConfig) -> BulkSwapOrchestratorBuilder {
        BulkSwapOrchestratorBuilder::new(config)
    }

    /// Subscribe to live progress snapshots for the running job.
    pub fn progress(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    /// Aggregate failure summary of the most recent job, if any swaps (or
    /// the fee-after payment) failed. Cleared when a job completes fully.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().unwrap().clone()
    }

    /// Execute a whole job. Always returns one result per input request, in
    /// input order; only a failed fee-before payment fails the call itself.
    pub async fn execute_bulk_swap(
        &self,
        requests: Vec<SwapRequest>,
    ) -> Result<Vec<SwapResult>, JobError> {
        self.run_job(&requests).await
    }

    /// Execute a single swap outside the batch machinery: one quote, one
    /// build, per-transaction signing, the more generous single-path
    /// submission retry budget, and no fee job.
    pub async fn execute_swap(&self, request: SwapRequest) -> SwapResult {
        let tag = request.result_tag();
        self.progress.reset(1);

        if let Err(err) = request.target_asset.parse::<Address>() {
            return self.finish_single(SwapResult::failed(
                tag,
                SwapError::InvalidAddress(err.to_string()),
            ));
        }
        let base_units = match request.amount_base_units() {
            Some(base_units) => base_units,
            None => {
                return self.finish_single(SwapResult::failed(
                    tag,
                    SwapError::InvalidAmount(format!(
                        "{} is not a positive representable amount",
                        request.amount
                    )),
                ));
            }
        };

        let quote = match self
            .exchange
            .quote(&self.source_asset, &request.target_asset, base_units)
            .await
        {
            Ok(Some(quote)) => quote,
            Ok(None) => {
                return self.finish_single(SwapResult::failed(
                    tag,
                    SwapError::QuoteUnavailable("no route to target asset".to_string()),
                ));
            }
            Err(err) => {
                return self.finish_single(SwapResult::failed(
                    tag,
                    SwapError::QuoteUnavailable(err.to_string()),
                ));
            }
        };

        let identity = self.signer.identity().clone();
        let built = match self.tx_builder.build(0, &quote, &identity).await {
            Ok(built) => built,
            Err(err) => {
                return self.finish_single(SwapResult::failed(
                    tag,
                    SwapError::BuildFailed(err.to_string()),
                ));
            }
        };

        if built.byte_len() > self.max_batch_bytes {
            return self.finish_single(SwapResult::failed(
                tag,
                SwapError::TransactionTooLarge {
                    actual: built.byte_len(),
                    limit: self.max_batch_bytes,
                },
            ));
        }

        let signed = match self.signer.sign(&built).await {
            Ok(signed) => signed,
            Err(err) => {
                return self.finish_single(SwapResult::failed(
                    tag,
                    SwapError::SigningDeclined(err.to_string()),
                ));
            }
        };

        let signature = match self.single_submission.submit(&signed).await {
            Ok(signature) => signature,
            Err(err) => {
                return self.finish_single(SwapResult::failed(
                    tag,
                    SwapError::SubmissionFailed(err.to_string()),
                ));
            }
        };

        let result = match self.confirmation.confirm(&signature).await {
            ConfirmOutcome::Confirmed => SwapResult::success(tag, signature),
            ConfirmOutcome::Rejected { detail } => {
                SwapResult::failed_with_signature(tag, signature, SwapError::Rejected(detail))
            }
            ConfirmOutcome::TimedOut { detail } => {
                SwapResult::failed_with_signature(tag, signature, SwapError::TimedOut(detail))
            }
        };
        self.finish_single(result)
    }

    fn finish_single(&self, result: SwapResult) -> SwapResult {
        self.progress.bump();
        if result.is_success() {
            *self.last_error.lock().unwrap() = None;
        } else if let Some(error) = &result.error {
            *self.last_error.lock().unwrap() = Some(error.to_string());
        }
        result
    }

    async fn run_job(&self, requests: &[SwapRequest]) -> Result<Vec<SwapResult>, JobError> {
        if requests.is_empty() {
            *self.last_error.lock().unwrap() = None;
            return Ok(Vec::new());
        }

        tracing::info!(requests = requests.len(), "Starting bulk swap job");
        self.progress.reset(requests.len());

        let mut slots: Vec<Option<SwapResult>> = vec![None; requests.len()];

        // Validation happens before any network traffic; a bad entry fails
        // alone without blocking its siblings.
        let mut pending: Vec<(usize, u64)> = Vec::new();
        for (i, request) in requests.iter().enumerate() {
            if let Err(err) = request.target_asset.parse::<Address>() {
                slots[i] = Some(SwapResult::failed(
                    request.result_tag(),
                    SwapError::InvalidAddress(err.to_string()),
                ));
                self.progress.bump();
                continue;
            }
            match request.amount_base_units() {
                Some(base_units) => pending.push((i, base_units)),
                None => {
                    slots[i] = Some(SwapResult::failed(
                        request.result_tag(),
                        SwapError::InvalidAmount(format!(
                            "{} is not a positive representable amount",
                            request.amount
                        )),
                    ));
                    self.progress.bump();
                }
            }
        }

        // The fee is derived once from the whole job, never per batch.
        let fee_job = FeeJob {
            total_base_units: pending.iter().map(|(_, units)| units).sum(),
        };

        if self.fee_policy == FeePolicy::Before {
            if let Some(fee) = &self.fee {
                self.progress.set_processing_fee(true);
                let outcome = fee.collect(&fee_job).await;
                self.progress.set_processing_fee(false);
                if let Err(err) = outcome {
                    tracing::error!(error = %err, "Fee payment failed, aborting job");
                    return Err(JobError::FeeJobFailed(err.to_string()));
                }
            }
        }

        // Quote phase, sequential.
        let mut quoted: Vec<(usize, Quote)> = Vec::new();
        for (i, base_units) in pending {
            let request = &requests[i];
            match self
                .exchange
                .quote(&self.source_asset, &request.target_asset, base_units)
                .await
            {
                Ok(Some(quote)) => quoted.push((i, quote)),
                Ok(None) => {
                    slots[i] = Some(SwapResult::failed(
                        request.result_tag(),
                        SwapError::QuoteUnavailable("no route to target asset".to_string()),
                    ));
                    self.progress.bump();
                }
                Err(err) => {
                    slots[i] = Some(SwapResult::failed(
                        request.result_tag(),
                        SwapError::QuoteUnavailable(err.to_string()),
                    ));
                    self.progress.bump();
                }
            }
        }

        // Build phase, sequential.
        let identity = self.signer.identity().clone();
        let mut built = Vec::with_capacity(quoted.len());
        for (i, quote) in quoted {
            match self.tx_builder.build(i, &quote, &identity).await {
                Ok(tx) => built.push(tx),
                Err(err) => {
                    slots[i] = Some(SwapResult::failed(
                        requests[i].result_tag(),
                        SwapError::BuildFailed(err.to_string()),
                    ));
                    self.progress.bump();
                }
            }
        }

        let packing = pack(built, self.max_batch_bytes);
        for (i, actual) in &packing.rejected {
            slots[*i] = Some(SwapResult::failed(
                requests[*i].result_tag(),
                SwapError::TransactionTooLarge {
                    actual: *actual,
                    limit: self.max_batch_bytes,
                },
            ));
            self.progress.bump();
        }
        self.progress.set_total_batches(packing.batches.len());

        for (batch_number, batch) in packing.batches.into_iter().enumerate() {
            self.progress.start_batch(batch_number + 1);
            tracing::info!(
                batch = batch_number + 1,
                transactions = batch.len(),
                bytes = batch.total_bytes(),
                "Processing batch"
            );

            // A decline fails this batch only; later batches are offered
            // independently.
            let signed = match self.signer.sign_all(&batch).await {
                Ok(signed) => signed,
                Err(err) => {
                    for i in batch.request_indices() {
                        slots[i] = Some(SwapResult::failed(
                            requests[i].result_tag(),
                            SwapError::SigningDeclined(err.to_string()),
                        ));
                        self.progress.bump();
                    }
                    continue;
                }
            };

            // Submission is sequential; confirmation fans out.
            let mut submitted: Vec<(usize, String)> = Vec::new();
            for tx in &signed {
                match self.submission.submit(tx).await {
                    Ok(signature) => submitted.push((tx.request_index, signature)),
                    Err(err) => {
                        slots[tx.request_index] = Some(SwapResult::failed(
                            requests[tx.request_index].result_tag(),
                            SwapError::SubmissionFailed(err.to_string()),
                        ));
                        self.progress.bump();
                    }
                }
            }

            let confirmation = &self.confirmation;
            let confirmations = submitted.into_iter().map(|(i, signature)| async move {
                let outcome = confirmation.confirm(&signature).await;
                (i, signature, outcome)
            });
            for (i, signature, outcome) in futures::future::join_all(confirmations).await {
                let tag = requests[i].result_tag();
                let result = match outcome {
                    ConfirmOutcome::Confirmed => SwapResult::success(tag, signature),
                    ConfirmOutcome::Rejected { detail } => {
                        SwapResult::failed_with_signature(tag, signature, SwapError::Rejected(detail))
                    }
                    ConfirmOutcome::TimedOut { detail } => {
                        SwapResult::failed_with_signature(tag, signature, SwapError::TimedOut(detail))
                    }
                };
                slots[i] = Some(result);
                self.progress.bump();
            }
        }

        let mut fee_failure: Option<SwapError> = None;
        if self.fee_policy == FeePolicy::After {
            if let Some(fee) = &self.fee {
                self.progress.set_processing_fee(true);
                match fee.collect(&fee_job).await {
                    Ok(Some(signature)) => {
                        for slot in slots.iter_mut().flatten() {
                            slot.fee_signature = Some(signature.clone());
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        let error = SwapError::FeeJobFailed(err.to_string());
                        tracing::warn!(
                            error = %error,
                            "Fee payment failed, results carry no fee signature"
                        );
                        fee_failure = Some(error);
                    }
                }
                self.progress.set_processing_fee(false);
            }
        }

        let results: Vec<SwapResult> = requests
            .iter()
            .zip(slots)
            .map(|(request, slot)| {
                slot.unwrap_or_else(|| {
                    SwapResult::failed(
                        request.result_tag(),
                        SwapError::TimedOut("no terminal outcome recorded".to_string()),
                    )
                })
            })
            .collect();

        let failures = results.iter().filter(|r| !r.is_success()).count();
        if failures > 0 {
            let first = results
                .iter()
                .find_map(|r| r.error.as_ref())
                .map(|e| e.to_string())
                .unwrap_or_default();
            *self.last_error.lock().unwrap() = Some(format!(
                "{} of {} swaps failed: {}",
                failures,
                results.len(),
                first
            ));
        } else {
            *self.last_error.lock().unwrap() = fee_failure.map(|e| e.to_string());
        }

        tracing::info!(
            requests = results.len(),
            failures = failures,
            "Bulk swap job finished"
        );

        Ok(results)
    }
}
