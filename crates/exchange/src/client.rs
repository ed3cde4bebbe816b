use async_trait::async_trait;
use base64::Engine;
use bulkswap_types::{Address, ExecutionHints, PriorityFee};
use serde::Deserialize;
use std::time::Duration;

use crate::{ExchangeError, Quote, QuoteService};

/// HTTP client for a hosted swap-aggregator API.
///
/// Holds one long-lived `reqwest::Client`; construct once at process start
/// and inject wherever quotes are needed.
pub struct HttpExchangeClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SwapResponse {
    #[serde(rename = "swapTransaction")]
    swap_transaction: Option<String>,
}

impl HttpExchangeClient {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self, ExchangeError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ExchangeError::Transport(format!("failed to create client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn priority_fee_value(hints: &ExecutionHints) -> serde_json::Value {
        match hints.priority_fee {
            PriorityFee::Auto => serde_json::Value::from("auto"),
            PriorityFee::Fixed(lamports) => serde_json::Value::from(lamports),
        }
    }
}

#[async_trait]
impl QuoteService for HttpExchangeClient {
    async fn quote(
        &self,
        source_asset: &str,
        target_asset: &str,
        amount_base_units: u64,
    ) -> Result<Option<Quote>, ExchangeError> {
        let url = format!("{}/quote", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("inputMint", source_asset),
                ("outputMint", target_asset),
                ("amount", &amount_base_units.to_string()),
            ])
            .send()
            .await?;

        // The aggregator reports "no route" as a 404; that is an explicit
        // absence, not a transport failure.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::QuoteFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let payload: serde_json::Value = response.json().await?;
        if payload.is_null() {
            return Ok(None);
        }

        tracing::debug!(
            target_asset = target_asset,
            amount = amount_base_units,
            "Received quote"
        );

        Ok(Some(Quote {
            input_asset: source_asset.to_string(),
            output_asset: target_asset.to_string(),
            in_amount: amount_base_units,
            response: payload,
        }))
    }

    async fn build_swap(
        &self,
        quote: &Quote,
        signer: &Address,
        hints: &ExecutionHints,
    ) -> Result<Vec<u8>, ExchangeError> {
        let url = format!("{}/swap", self.base_url);

        let mut body = serde_json::json!({
            "quoteResponse": quote.response,
            "userPublicKey": signer.as_str(),
            "dynamicComputeUnitLimit": hints.dynamic_compute_limit,
            "prioritizationFeeLamports": Self::priority_fee_value(hints),
        });
        if let Some(slippage) = hints.slippage_bps {
            body["slippageBps"] = serde_json::Value::from(slippage);
        }

        let response = self.http.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ExchangeError::BuildFailed(format!(
                "status {}: {}",
                status, text
            )));
        }

        let swap: SwapResponse = response.json().await?;
        let encoded = swap.swap_transaction.ok_or_else(|| {
            ExchangeError::BuildFailed(format!(
                "no transaction in build response for {}",
                quote.output_asset
            ))
        })?;

        base64::engine::general_purpose::STANDARD
            .decode(&encoded)
            .map_err(|e| ExchangeError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client =
            HttpExchangeClient::new("https://quote.example.org/v6/", Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.base_url, "https://quote.example.org/v6");
    }

    #[test]
    fn test_priority_fee_wire_values() {
        let auto = ExecutionHints::default();
        assert_eq!(
            HttpExchangeClient::priority_fee_value(&auto),
            serde_json::Value::from("auto")
        );

        let fixed = ExecutionHints {
            priority_fee: PriorityFee::Fixed(5000),
            ..Default::default()
        };
        assert_eq!(
            HttpExchangeClient::priority_fee_value(&fixed),
            serde_json::Value::from(5000u64)
        );
    }

    // Live-network test, excluded from CI.
    #[tokio::test]
    #[ignore]
    async fn test_quote_against_hosted_api() {
        let client =
            HttpExchangeClient::new("https://quote-api.jup.ag/v6", Duration::from_secs(10))
                .unwrap();

        let quote = client
            .quote(
                "So11111111111111111111111111111111111111112",
                "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
                1_000_000_000,
            )
            .await;

        assert!(quote.is_ok());
    }
}
