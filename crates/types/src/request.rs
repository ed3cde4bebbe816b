use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::BASE_ASSET_DECIMALS;

/// A single "buy this asset with this much base currency" request.
///
/// Caller-supplied and immutable once accepted into a job. The target
/// address and amount are validated inside the job, per request, so one bad
/// entry never blocks its siblings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapRequest {
    /// Target asset identifier (base58 ledger address of the asset).
    pub target_asset: String,

    /// Amount of base currency to spend, in whole units.
    pub amount: Decimal,

    /// Optional caller tag used to correlate results; defaults to the
    /// target asset id when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl SwapRequest {
    pub fn new(target_asset: impl Into<String>, amount: Decimal) -> Self {
        Self {
            target_asset: target_asset.into(),
            amount,
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Tag used in the result list for this request.
    pub fn result_tag(&self) -> String {
        self.tag.clone().unwrap_or_else(|| self.target_asset.clone())
    }

    /// Convert the decimal amount to base units by flooring.
    ///
    /// Truncation, not rounding: underpayment is safer than overpayment.
    /// Returns `None` when the amount is not positive or does not fit.
    pub fn amount_base_units(&self) -> Option<u64> {
        if self.amount <= Decimal::ZERO {
            return None;
        }
        let scale = Decimal::from(10u64.pow(BASE_ASSET_DECIMALS));
        self.amount.checked_mul(scale)?.floor().to_u64()
    }

    /// Split a total base-currency budget evenly across target assets.
    pub fn split_evenly(targets: &[String], total: Decimal) -> Vec<SwapRequest> {
        if targets.is_empty() {
            return Vec::new();
        }
        let per_target = total / Decimal::from(targets.len() as u64);
        targets
            .iter()
            .map(|t| SwapRequest::new(t.clone(), per_target))
            .collect()
    }
}
