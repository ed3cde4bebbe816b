//! Bulk swap orchestration: turn a list of "buy asset X with N base
//! currency" requests into quoted, built, size-bounded-batched, signed,
//! submitted, and confirmed ledger transactions.
//!
//! The facade crate re-exports the member crates under short names; most
//! callers only need [`BulkSwapOrchestrator`] and the types it consumes.

pub use bulkswap_config as config;
pub use bulkswap_exchange as exchange;
pub use bulkswap_fees as fees;
pub use bulkswap_gateway as gateway;
pub use bulkswap_orchestrator as orchestrator;
pub use bulkswap_types as types;

pub use bulkswap_config::{AppConfig, ConfigLoader, FeePolicy};
pub use bulkswap_orchestrator::{BulkSwapOrchestrator, JobError, Progress};
pub use bulkswap_types::{SwapRequest, SwapResult, SwapStatus};

/// Install the global tracing subscriber. `RUST_LOG` wins over the level
/// from config when set.
pub fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
