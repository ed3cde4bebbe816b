use async_trait::async_trait;
use bulkswap_types::{Address, ExecutionHints};
use serde::{Deserialize, Serialize};

use crate::ExchangeError;

/// An executable price quote issued by the exchange.
///
/// The full response payload is kept opaque and forwarded verbatim to the
/// build endpoint. Quotes are perishable: they are consumed within the job
/// that fetched them and never cached across jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Source (base) asset id.
    pub input_asset: String,

    /// Target asset id.
    pub output_asset: String,

    /// Quoted input amount in base units.
    pub in_amount: u64,

    /// Raw quote response, passed through to the build endpoint.
    pub response: serde_json::Value,
}

/// Quote and transaction-build endpoints of the exchange aggregator.
///
/// A quote of `None` means "no route" and is not an error; transport
/// failures are. Both operations are request-local: a failure affects only
/// the request that triggered it.
#[async_trait]
pub trait QuoteService: Send + Sync {
    /// Resolve a (source, target, amount) triple into an executable quote.
    async fn quote(
        &self,
        source_asset: &str,
        target_asset: &str,
        amount_base_units: u64,
    ) -> Result<Option<Quote>, ExchangeError>;

    /// Request an unsigned, serialized swap transaction for an accepted
    /// quote. Execution hints are forwarded opaquely.
    async fn build_swap(
        &self,
        quote: &Quote,
        signer: &Address,
        hints: &ExecutionHints,
    ) -> Result<Vec<u8>, ExchangeError>;
}
