use bulkswap_types::{Address, BuiltTransaction, ExecutionHints};
use std::sync::Arc;

use crate::{ExchangeError, Quote, QuoteService};

/// Turns accepted quotes into unsigned, size-annotated transactions.
pub struct TransactionBuilder {
    exchange: Arc<dyn QuoteService>,
    hints: ExecutionHints,
}

impl TransactionBuilder {
    pub fn new(exchange: Arc<dyn QuoteService>, hints: ExecutionHints) -> Self {
        Self { exchange, hints }
    }

    /// Build the unsigned transaction for one accepted quote.
    ///
    /// `request_index` ties the transaction back to its originating request
    /// through packing, signing, and confirmation.
    pub async fn build(
        &self,
        request_index: usize,
        quote: &Quote,
        signer: &Address,
    ) -> Result<BuiltTransaction, ExchangeError> {
        let payload = self.exchange.build_swap(quote, signer, &self.hints).await?;

        if payload.is_empty() {
            return Err(ExchangeError::Decode(
                "build endpoint returned an empty payload".to_string(),
            ));
        }

        tracing::debug!(
            request_index = request_index,
            target_asset = %quote.output_asset,
            bytes = payload.len(),
            "Built unsigned transaction"
        );

        Ok(BuiltTransaction::new(request_index, payload))
    }
}
