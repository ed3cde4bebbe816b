mod builder;
mod client;
mod quote;

pub use builder::TransactionBuilder;
pub use client::HttpExchangeClient;
pub use quote::{Quote, QuoteService};

/// Exchange API errors
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("quote request failed: {0}")]
    QuoteFailed(String),

    #[error("build request failed: {0}")]
    BuildFailed(String),

    #[error("failed to decode transaction payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        ExchangeError::Transport(err.to_string())
    }
}
