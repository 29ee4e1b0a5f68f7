use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use super::signed_message::resolve_signed_message;
use crate::{
    signature::SignatureChecker, status::AddressMatch, transaction::AccountBalance, Status,
};

/// Verdict of a balance proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceProofOutcome {
    pub status: Status,
    pub balance: Option<AccountBalance>,
}

/// Signed-message verdict plus the balance snapshot of the signing wallet.
///
/// The snapshot is kept whatever the status, as long as a wallet is known.
pub fn resolve_balance_proof(
    requested_wallet: &AddressMatch,
    message: &str,
    wallet: Option<&Address>,
    signature: Option<&str>,
    checker: &dyn SignatureChecker,
    balance: Option<AccountBalance>,
) -> BalanceProofOutcome {
    let status = resolve_signed_message(requested_wallet, message, wallet, signature, checker);
    BalanceProofOutcome {
        status,
        balance: wallet.and(balance),
    }
}
