pub mod address;
pub mod batch;
pub mod hints;
pub mod request;
pub mod result;
pub mod transaction;

pub use address::*;
pub use batch::*;
pub use hints::*;
pub use request::*;
pub use result::*;
pub use transaction::*;

/// Number of decimal places in the base asset (1 unit = 10^9 base units).
pub const BASE_ASSET_DECIMALS: u32 = 9;

/// Ledger identifier of the wrapped base asset, the input side of every
/// swap.
pub const BASE_ASSET_ID: &str = "So11111111111111111111111111111111111111112";

/// Hard wire-size ceiling for a transaction batch, in bytes.
pub const DEFAULT_MAX_BATCH_BYTES: usize = 1232;
