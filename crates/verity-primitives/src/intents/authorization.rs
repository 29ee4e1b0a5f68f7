use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use super::{
    default_challenge_message, Intent, IntentKind, IntentParams, SignedBy, SignedMessageIntent,
};
use crate::status::AddressMatch;

/// Prove control of a wallet by signing a challenge message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationParams {
    #[serde(default)]
    pub wallet: AddressMatch,
    pub message: Option<String>,
    /// When unset the intent is deleted after its first successful read.
    #[serde(default)]
    pub store_indefinitely: bool,
}

impl IntentParams for AuthorizationParams {
    const KIND: IntentKind = IntentKind::Authorization;

    fn sender(&self) -> Option<&Address> {
        self.wallet.pinned()
    }
}

impl SignedMessageIntent for Intent<AuthorizationParams> {
    fn requested_wallet(&self) -> &AddressMatch {
        &self.params.wallet
    }

    fn challenge_message(&self) -> String {
        self.params
            .message
            .clone()
            .unwrap_or_else(|| default_challenge_message(&self.id))
    }

    fn signed(&self) -> Option<&SignedBy> {
        self.slots.signed.as_ref()
    }
}
