//! Wallet address newtype.
//!
//! Addresses are base58-encoded public keys, 32 to 44 characters. The
//! coordinator never derives anything from the key material; the address
//! is an opaque identity used for seat ownership, turn checks, and escrow
//! accounting. Validation is shape-only.

use std::fmt;

use lazy_regex::regex;
use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, ValidationKind};

/// A validated wallet address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddr(String);

impl WalletAddr {
    /// Validate and wrap an address string.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let base58 = regex!(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$");
        let trimmed = raw.trim();
        if base58.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(DomainError::validation(
                ValidationKind::InvalidWallet,
                "Wallet address must be 32-44 base58 characters",
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for WalletAddr {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WalletAddr> for String {
    fn from(value: WalletAddr) -> Self {
        value.0
    }
}

impl std::str::FromStr for WalletAddr {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
