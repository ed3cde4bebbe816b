use async_trait::async_trait;
use base64::Engine;
use bulkswap_types::SignedTransaction;
use std::time::Duration;

/// Ledger RPC errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum LedgerError {
    /// Network-level failure. Retryable.
    #[error("transport error: {0}")]
    Transport(String),

    /// The ledger refused the transaction. Not retryable.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("malformed rpc response: {0}")]
    Malformed(String),
}

impl LedgerError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Transport(_))
    }
}

/// Validity window anchor for confirmation polling. A transaction built
/// against a blockhash expires once the chain height passes
/// `last_valid_block_height`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalityReference {
    pub blockhash: String,
    pub last_valid_block_height: u64,
}

/// Commitment level an observed signature has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfirmationStatus {
    Processed,
    Confirmed,
    Finalized,
}

/// Status of a submitted signature as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureStatus {
    pub status: ConfirmationStatus,

    /// Execution error recorded against the transaction, if any.
    pub error: Option<String>,
}

/// Full transaction record fetched after inclusion, used to cross-check
/// execution outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub error: Option<String>,
}

/// Read/write access to the settlement ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submit a signed transaction, returning its signature.
    async fn submit(&self, tx: &SignedTransaction) -> Result<String, LedgerError>;

    /// Fetch a fresh validity window anchor.
    async fn finality_reference(&self) -> Result<FinalityReference, LedgerError>;

    /// Current chain block height.
    async fn block_height(&self) -> Result<u64, LedgerError>;

    /// Signature status, `None` while the transaction is not yet observed.
    async fn signature_status(
        &self,
        signature: &str,
    ) -> Result<Option<SignatureStatus>, LedgerError>;

    /// Full record of an included transaction, `None` if the node has no
    /// record for the signature.
    async fn transaction_record(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionRecord>, LedgerError>;
}

/// Knobs forwarded with every submission.
#[derive(Debug, Clone)]
pub struct SubmissionOptions {
    /// Skip the node-side simulation before accepting the transaction.
    pub skip_preflight: bool,

    /// Commitment level used for the preflight simulation.
    pub preflight_commitment: String,

    /// Node-side resubmission budget, when the RPC supports one.
    pub max_retries: Option<u32>,
}

impl Default for SubmissionOptions {
    fn default() -> Self {
        Self {
            skip_preflight: false,
            preflight_commitment: "confirmed".to_string(),
            max_retries: None,
        }
    }
}

/// JSON-RPC ledger client.
pub struct RpcLedgerClient {
    rpc_url: String,
    http: reqwest::Client,
    options: SubmissionOptions,
}

impl RpcLedgerClient {
    pub fn new(rpc_url: impl Into<String>, request_timeout: Duration) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| LedgerError::Transport(format!("failed to create client: {}", e)))?;

        Ok(Self {
            rpc_url: rpc_url.into(),
            http,
            options: SubmissionOptions::default(),
        })
    }

    pub fn with_options(mut self, options: SubmissionOptions) -> Self {
        self.options = options;
        self
    }

    async fn rpc_call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, LedgerError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LedgerError::Transport(format!(
                "rpc http status {}",
                response.status()
            )));
        }

        let envelope: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        if let Some(error) = envelope.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown rpc error");
            return Err(LedgerError::Rejected(message.to_string()));
        }

        envelope
            .get("result")
            .cloned()
            .ok_or_else(|| LedgerError::Malformed(format!("{} response missing result", method)))
    }

    fn parse_status(value: &serde_json::Value) -> Result<ConfirmationStatus, LedgerError> {
        match value.as_str() {
            Some("processed") => Ok(ConfirmationStatus::Processed),
            Some("confirmed") => Ok(ConfirmationStatus::Confirmed),
            Some("finalized") => Ok(ConfirmationStatus::Finalized),
            other => Err(LedgerError::Malformed(format!(
                "unknown confirmation status: {:?}",
                other
            ))),
        }
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn submit(&self, tx: &SignedTransaction) -> Result<String, LedgerError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&tx.bytes);

        let mut send_config = serde_json::json!({
            "encoding": "base64",
            "skipPreflight": self.options.skip_preflight,
            "preflightCommitment": self.options.preflight_commitment,
        });
        if let Some(max_retries) = self.options.max_retries {
            send_config["maxRetries"] = serde_json::Value::from(max_retries);
        }

        let result = self
            .rpc_call("sendTransaction", serde_json::json!([encoded, send_config]))
            .await?;

        let signature = result
            .as_str()
            .ok_or_else(|| LedgerError::Malformed("sendTransaction result not a string".into()))?;

        tracing::debug!(
            request_index = tx.request_index,
            signature = %signature,
            "Submitted transaction"
        );

        Ok(signature.to_string())
    }

    async fn finality_reference(&self) -> Result<FinalityReference, LedgerError> {
        let result = self
            .rpc_call(
                "getLatestBlockhash",
                serde_json::json!([{ "commitment": "confirmed" }]),
            )
            .await?;

        let value = &result["value"];
        let blockhash = value["blockhash"]
            .as_str()
            .ok_or_else(|| LedgerError::Malformed("missing blockhash".into()))?
            .to_string();
        let last_valid_block_height = value["lastValidBlockHeight"]
            .as_u64()
            .ok_or_else(|| LedgerError::Malformed("missing lastValidBlockHeight".into()))?;

        Ok(FinalityReference {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn block_height(&self) -> Result<u64, LedgerError> {
        let result = self
            .rpc_call(
                "getBlockHeight",
                serde_json::json!([{ "commitment": "confirmed" }]),
            )
            .await?;

        result
            .as_u64()
            .ok_or_else(|| LedgerError::Malformed("getBlockHeight result not a number".into()))
    }

    async fn signature_status(
        &self,
        signature: &str,
    ) -> Result<Option<SignatureStatus>, LedgerError> {
        let result = self
            .rpc_call(
                "getSignatureStatuses",
                serde_json::json!([[signature], { "searchTransactionHistory": true }]),
            )
            .await?;

        let entry = &result["value"][0];
        if entry.is_null() {
            return Ok(None);
        }

        let status = Self::parse_status(&entry["confirmationStatus"])?;
        let error = if entry["err"].is_null() {
            None
        } else {
            Some(entry["err"].to_string())
        };

        Ok(Some(SignatureStatus { status, error }))
    }

    async fn transaction_record(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        let result = self
            .rpc_call(
                "getTransaction",
                serde_json::json!([
                    signature,
                    { "commitment": "confirmed", "maxSupportedTransactionVersion": 0 }
                ]),
            )
            .await?;

        if result.is_null() {
            return Ok(None);
        }

        let err = &result["meta"]["err"];
        let error = if err.is_null() {
            None
        } else {
            Some(err.to_string())
        };

        Ok(Some(TransactionRecord { error }))
    }
}
