//! Lifecycle status and the wildcard/pinned address matcher shared by every resolver.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Derived lifecycle status of an intent. Never persisted, recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Pending,
    Failed,
    Success,
}

impl Status {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "PENDING",
            Status::Failed => "FAILED",
            Status::Success => "SUCCESS",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected address of a sender, caller, deployer or requested wallet.
///
/// `Wildcard` accepts any observed address, `Pinned` requires exact equality.
/// Serialized as an optional address so stored intents keep their natural shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<Address>", into = "Option<Address>")]
pub enum AddressMatch {
    #[default]
    Wildcard,
    Pinned(Address),
}

impl AddressMatch {
    /// `true` for a wildcard or an exact address match.
    pub fn matches(&self, observed: &Address) -> bool {
        match self {
            AddressMatch::Wildcard => true,
            AddressMatch::Pinned(expected) => expected == observed,
        }
    }

    pub fn pinned(&self) -> Option<&Address> {
        match self {
            AddressMatch::Wildcard => None,
            AddressMatch::Pinned(address) => Some(address),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, AddressMatch::Wildcard)
    }
}

impl From<Option<Address>> for AddressMatch {
    fn from(value: Option<Address>) -> Self {
        value.map_or(AddressMatch::Wildcard, AddressMatch::Pinned)
    }
}

impl From<AddressMatch> for Option<Address> {
    fn from(value: AddressMatch) -> Self {
        value.pinned().copied()
    }
}
