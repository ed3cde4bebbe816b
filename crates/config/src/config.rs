//! Core configuration structures for the bulk swap orchestrator

use bulkswap_types::DEFAULT_MAX_BATCH_BYTES;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Network endpoints
    pub network: NetworkConfig,

    /// Swap pipeline configuration
    pub swap: SwapConfig,

    /// Confirmation engine configuration
    pub confirmation: ConfirmationConfig,

    /// Fee side-payment configuration
    pub fees: FeeConfig,
}

/// Network environment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Ledger RPC endpoint URL
    pub rpc_url: String,

    /// Exchange aggregator API base URL
    pub exchange_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in milliseconds for a single HTTP call
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Swap pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapConfig {
    /// Hard wire-size ceiling for a batch, in bytes
    #[serde(default = "default_max_batch_bytes")]
    pub max_batch_bytes: usize,

    /// Submission-layer retries for transient errors (distinct from
    /// confirmation attempts)
    #[serde(default = "default_submit_retries")]
    pub submit_retries: u32,

    /// Let the exchange size the compute budget dynamically
    #[serde(default = "default_true")]
    pub dynamic_compute_limit: bool,

    /// Slippage tolerance override in basis points
    #[serde(default)]
    pub slippage_bps: Option<u16>,
}

/// Confirmation strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStrategy {
    /// One confirmation request raced against a wall-clock timeout
    SinglePass,

    /// Re-fetch the finality reference and re-poll with linear backoff
    #[default]
    MultiAttempt,
}

/// Confirmation engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationConfig {
    /// Which confirmation strategy to run
    #[serde(default)]
    pub strategy: ConfirmationStrategy,

    /// Wall-clock timeout for the single-pass strategy, in milliseconds
    #[serde(default = "default_confirm_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum polling attempts for the multi-attempt strategy
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay for linear backoff (attempt * base_delay_ms)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

/// Fee policy: when the auxiliary fee transaction runs relative to swaps.
/// The two have different failure-atomicity guarantees and never mix
/// within one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeePolicy {
    /// Pay the fee before any swap work; a failed fee aborts the job
    Before,

    /// Pay the fee after all swaps; its signature is attached to every
    /// result and a failure is recorded permissively
    #[default]
    After,
}

/// Fee configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Fee rate in basis points of total job volume
    #[serde(default = "default_fee_bps")]
    pub fee_bps: u64,

    /// One or two fee-collection addresses
    #[serde(default)]
    pub recipients: Vec<String>,

    /// When the fee transaction runs
    #[serde(default)]
    pub policy: FeePolicy,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_ms() -> u64 {
    10000
}

fn default_max_batch_bytes() -> usize {
    DEFAULT_MAX_BATCH_BYTES
}

fn default_submit_retries() -> u32 {
    2
}

fn default_confirm_timeout_ms() -> u64 {
    8000
}

fn default_max_attempts() -> u32 {
    10
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_fee_bps() -> u64 {
    50 // 0.5%
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            exchange_url: String::new(),
            log_level: default_log_level(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            max_batch_bytes: default_max_batch_bytes(),
            submit_retries: default_submit_retries(),
            dynamic_compute_limit: default_true(),
            slippage_bps: None,
        }
    }
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            strategy: ConfirmationStrategy::default(),
            timeout_ms: default_confirm_timeout_ms(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            fee_bps: default_fee_bps(),
            recipients: Vec::new(),
            policy: FeePolicy::default(),
        }
    }
}
