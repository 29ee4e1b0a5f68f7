use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use super::{
    default_challenge_message, Intent, IntentKind, IntentParams, SignedBy, SignedMessageIntent,
};
use crate::{status::AddressMatch, transaction::BlockParameter};

/// Prove ownership of a wallet and report its balance, native or ERC20.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBalanceParams {
    pub token: Option<Address>,
    /// Read at `latest` when unset.
    pub block_number: Option<u64>,
    #[serde(default)]
    pub wallet: AddressMatch,
    pub message: Option<String>,
}

impl AssetBalanceParams {
    pub fn block(&self) -> BlockParameter {
        self.block_number.into()
    }
}

impl IntentParams for AssetBalanceParams {
    const KIND: IntentKind = IntentKind::AssetBalance;

    fn sender(&self) -> Option<&Address> {
        self.wallet.pinned()
    }
}

impl SignedMessageIntent for Intent<AssetBalanceParams> {
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
