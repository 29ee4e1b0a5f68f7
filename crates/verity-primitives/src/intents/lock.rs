use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::{AttachedTx, Intent, IntentKind, IntentParams, VerifiableIntent};
use crate::{
    codec::{FunctionArgument, FunctionEncoder},
    resolution::ExpectedTransaction,
    status::AddressMatch,
    Result,
};

/// Lock an ERC20 amount in the lock contract for `duration` seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Erc20LockParams {
    pub token: Address,
    pub amount: U256,
    pub duration: u64,
    pub lock_contract: Address,
    #[serde(default)]
    pub sender: AddressMatch,
}

impl IntentParams for Erc20LockParams {
    const KIND: IntentKind = IntentKind::Erc20Lock;

    fn sender(&self) -> Option<&Address> {
        self.sender.pinned()
    }
}

impl VerifiableIntent for Intent<Erc20LockParams> {
    /// `lock(token, amount, duration, intentId, address(0))`
    fn expected_transaction(&self, encoder: &dyn FunctionEncoder) -> Result<ExpectedTransaction> {
        let params = &self.params;
        let data = encoder.encode(
            "lock",
            &[
                FunctionArgument::Address(params.token),
                FunctionArgument::Uint256(params.amount),
                FunctionArgument::Uint256(U256::from(params.duration)),
                FunctionArgument::String(self.id.to_string()),
                FunctionArgument::Address(Address::ZERO),
            ],
        )?;
        Ok(ExpectedTransaction::call(
            params.lock_contract,
            data,
            U256::ZERO,
            params.sender,
        ))
    }

    fn attached_tx(&self) -> Option<&AttachedTx> {
        self.slots.tx.as_ref()
    }
}
