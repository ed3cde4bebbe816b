//! Configuration validation

use crate::{AppConfig, ConfigError, Result};

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the entire application configuration
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    // Validate network config
    if let Err(e) = validate_log_level(&config.network.log_level) {
        errors.push(e);
    }

    if config.network.rpc_url.is_empty() {
        errors.push(ValidationError::new(
            "network.rpc_url",
            "ledger RPC endpoint is required",
        ));
    }

    if config.network.exchange_url.is_empty() {
        errors.push(ValidationError::new(
            "network.exchange_url",
            "exchange API endpoint is required",
        ));
    }

    if config.network.request_timeout_ms == 0 {
        errors.push(ValidationError::new(
            "network.request_timeout_ms",
            "must be greater than 0",
        ));
    }

    // Validate swap config
    if config.swap.max_batch_bytes == 0 {
        errors.push(ValidationError::new(
            "swap.max_batch_bytes",
            "must be greater than 0",
        ));
    }

    if let Some(slippage) = config.swap.slippage_bps {
        if slippage > 10000 {
            errors.push(ValidationError::new(
                "swap.slippage_bps",
                "must be <= 10000 (100%)",
            ));
        }
    }

    // Validate confirmation config
    if config.confirmation.timeout_ms == 0 {
        errors.push(ValidationError::new(
            "confirmation.timeout_ms",
            "must be greater than 0",
        ));
    }

    if config.confirmation.max_attempts == 0 {
        errors.push(ValidationError::new(
            "confirmation.max_attempts",
            "must be greater than 0",
        ));
    }

    // Validate fee config
    if config.fees.fee_bps > 10000 {
        errors.push(ValidationError::new(
            "fees.fee_bps",
            "must be <= 10000 (100%)",
        ));
    }

    if config.fees.fee_bps > 0 && config.fees.recipients.is_empty() {
        errors.push(ValidationError::new(
            "fees.recipients",
            "at least one fee recipient is required when fee_bps > 0",
        ));
    }

    if config.fees.recipients.len() > 2 {
        errors.push(ValidationError::new(
            "fees.recipients",
            "at most two fee recipients are supported",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        let combined = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Err(ConfigError::ValidationError(combined))
    }
}

fn validate_log_level(level: &str) -> std::result::Result<(), ValidationError> {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new(
            "network.log_level",
            format!("invalid log level: {}", level),
        )),
    }
}
