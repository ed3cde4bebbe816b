use serde::{Deserialize, Serialize};

/// Priority fee setting forwarded to the build endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityFee {
    /// Let the exchange pick a fee from current network conditions.
    #[default]
    Auto,

    /// Fixed fee in base units.
    Fixed(u64),
}

/// Execution hints passed through to the transaction build endpoint.
///
/// The orchestrator never interprets these values; it forwards
/// caller-supplied or configured defaults verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionHints {
    /// Let the exchange size the compute budget dynamically.
    pub dynamic_compute_limit: bool,

    /// Priority fee policy.
    pub priority_fee: PriorityFee,

    /// Slippage tolerance in basis points, if the caller wants to override
    /// the exchange default.
    pub slippage_bps: Option<u16>,
}

impl Default for ExecutionHints {
    fn default() -> Self {
        Self {
            dynamic_compute_limit: true,
            priority_fee: PriorityFee::Auto,
            slippage_bps: None,
        }
    }
}
