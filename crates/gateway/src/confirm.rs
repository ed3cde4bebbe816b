use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::{ConfirmationStatus, FinalityReference, LedgerClient, LedgerError, SignatureStatus};

const POLL_INTERVAL: Duration = Duration::from_millis(400);

/// Outcome of confirming one submitted signature.
///
/// `TimedOut` is inconclusive, never a verdict: the transaction may still
/// land after the confirmation budget is spent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    Rejected { detail: String },
    TimedOut { detail: String },
}

/// Strategy for driving a submitted signature to a terminal outcome.
#[async_trait]
pub trait ConfirmationPolicy: Send + Sync {
    async fn confirm(&self, signature: &str) -> ConfirmOutcome;
}

enum Inclusion {
    Included(SignatureStatus),
    Expired,
}

/// Poll until the signature is observed at confirmed commitment, carries an
/// execution error, or the validity window closes.
async fn await_inclusion(
    ledger: &dyn LedgerClient,
    signature: &str,
    reference: &FinalityReference,
    poll_interval: Duration,
) -> Result<Inclusion, LedgerError> {
    loop {
        if let Some(status) = ledger.signature_status(signature).await? {
            if status.error.is_some() || status.status >= ConfirmationStatus::Confirmed {
                return Ok(Inclusion::Included(status));
            }
        }

        let height = ledger.block_height().await?;
        if height > reference.last_valid_block_height {
            return Ok(Inclusion::Expired);
        }

        tokio::time::sleep(poll_interval).await;
    }
}

/// Cross-check an included signature against the full transaction record.
///
/// The status report and the record can disagree under load; the record is
/// authoritative for execution errors, and a missing record leaves the
/// outcome inconclusive.
async fn resolve_included(
    ledger: &dyn LedgerClient,
    signature: &str,
    status: SignatureStatus,
) -> ConfirmOutcome {
    if let Some(detail) = status.error {
        return ConfirmOutcome::Rejected { detail };
    }

    match ledger.transaction_record(signature).await {
        Ok(Some(record)) => match record.error {
            Some(detail) => ConfirmOutcome::Rejected { detail },
            None => ConfirmOutcome::Confirmed,
        },
        Ok(None) => ConfirmOutcome::TimedOut {
            detail: "confirmed signature has no transaction record".to_string(),
        },
        Err(err) => ConfirmOutcome::TimedOut {
            detail: format!("record lookup failed: {}", err),
        },
    }
}

/// One confirmation pass raced against a wall-clock deadline.
pub struct SinglePassConfirmation {
    ledger: Arc<dyn LedgerClient>,
    timeout: Duration,
}

impl SinglePassConfirmation {
    pub fn new(ledger: Arc<dyn LedgerClient>, timeout: Duration) -> Self {
        Self { ledger, timeout }
    }
}

#[async_trait]
impl ConfirmationPolicy for SinglePassConfirmation {
    async fn confirm(&self, signature: &str) -> ConfirmOutcome {
        let reference = match self.ledger.finality_reference().await {
            Ok(reference) => reference,
            Err(err) => {
                return ConfirmOutcome::TimedOut {
                    detail: format!("finality reference unavailable: {}", err),
                }
            }
        };

        let inclusion = tokio::time::timeout(
            self.timeout,
            await_inclusion(self.ledger.as_ref(), signature, &reference, POLL_INTERVAL),
        )
        .await;

        match inclusion {
            Ok(Ok(Inclusion::Included(status))) => {
                resolve_included(self.ledger.as_ref(), signature, status).await
            }
            Ok(Ok(Inclusion::Expired)) => ConfirmOutcome::TimedOut {
                detail: "validity window expired before inclusion".to_string(),
            },
            Ok(Err(err)) => ConfirmOutcome::TimedOut {
                detail: format!("confirmation poll failed: {}", err),
            },
            Err(_) => ConfirmOutcome::TimedOut {
                detail: format!("no confirmation within {:?}", self.timeout),
            },
        }
    }
}

/// Repeated confirmation attempts with a fresh finality reference and a
/// linearly growing backoff between inconclusive attempts.
pub struct MultiAttemptConfirmation {
    ledger: Arc<dyn LedgerClient>,
    max_attempts: u32,
    base_delay: Duration,
}

impl MultiAttemptConfirmation {
    pub fn new(ledger: Arc<dyn LedgerClient>, max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            ledger,
            max_attempts,
            base_delay,
        }
    }

    /// One attempt: a single status check anchored to a fresh reference.
    /// `None` means inconclusive, try again.
    async fn attempt(&self, signature: &str) -> Option<ConfirmOutcome> {
        let reference = match self.ledger.finality_reference().await {
            Ok(reference) => reference,
            Err(err) => {
                tracing::debug!(signature = %signature, error = %err, "Reference fetch failed");
                return None;
            }
        };

        match self.ledger.signature_status(signature).await {
            Ok(Some(status)) => {
                if status.error.is_some() || status.status >= ConfirmationStatus::Confirmed {
                    Some(resolve_included(self.ledger.as_ref(), signature, status).await)
                } else {
                    None
                }
            }
            Ok(None) => {
                let expired = match self.ledger.block_height().await {
                    Ok(height) => height > reference.last_valid_block_height,
                    Err(_) => false,
                };
                if expired {
                    Some(ConfirmOutcome::TimedOut {
                        detail: "validity window expired before inclusion".to_string(),
                    })
                } else {
                    None
                }
            }
            Err(err) => {
                tracing::debug!(signature = %signature, error = %err, "Status check failed");
                None
            }
        }
    }
}

#[async_trait]
impl ConfirmationPolicy for MultiAttemptConfirmation {
    async fn confirm(&self, signature: &str) -> ConfirmOutcome {
        for attempt in 1..=self.max_attempts {
            if let Some(outcome) = self.attempt(signature).await {
                return outcome;
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.base_delay * attempt).await;
            }
        }

        ConfirmOutcome::TimedOut {
            detail: format!("no confirmation after {} attempts", self.max_attempts),
        }
    }
}
