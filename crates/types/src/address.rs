use serde::{Deserialize, Serialize};

/// Address parsing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("not valid base58: {0}")]
    InvalidEncoding(String),

    #[error("decoded to {0} bytes, expected 32")]
    InvalidLength(usize),

    #[error("point is not on the ed25519 curve")]
    OffCurve,
}

/// A validated on-curve ledger address.
///
/// Parsing checks both the base58 encoding and that the decoded 32 bytes
/// decompress to a point on the ed25519 curve. The check is local and cheap,
/// so callers can reject bad addresses before spending a network round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| AddressError::InvalidEncoding(e.to_string()))?;

        let bytes: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength(bytes.len()))?;

        if ed25519_dalek::VerifyingKey::from_bytes(&bytes).is_err() {
            return Err(AddressError::OffCurve);
        }

        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
