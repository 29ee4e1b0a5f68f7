use alloy::{
    primitives::{Address, B256, U256},
    sol_types::SolEvent,
};
use serde::{Deserialize, Serialize};

use super::{AttachedTx, Intent, IntentKind, IntentParams, VerifiableIntent};
use crate::{
    abi::erc20::IERC20,
    codec::{FunctionArgument, FunctionEncoder},
    resolution::ExpectedTransaction,
    status::AddressMatch,
    Result,
};

/// Send native currency, or an ERC20 token when `token` is set, to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSendParams {
    pub token: Option<Address>,
    pub amount: U256,
    #[serde(default)]
    pub sender: AddressMatch,
    pub recipient: Address,
}

impl IntentParams for AssetSendParams {
    const KIND: IntentKind = IntentKind::AssetSend;

    fn sender(&self) -> Option<&Address> {
        self.sender.pinned()
    }

    fn recipients(&self) -> Vec<Address> {
        vec![self.recipient]
    }
}

impl VerifiableIntent for Intent<AssetSendParams> {
    fn expected_transaction(&self, encoder: &dyn FunctionEncoder) -> Result<ExpectedTransaction> {
        let params = &self.params;
        match params.token {
            Some(token) => {
                let data = encoder.encode(
                    "transfer",
                    &[
                        FunctionArgument::Address(params.recipient),
                        FunctionArgument::Uint256(params.amount),
                    ],
                )?;
                Ok(ExpectedTransaction::call(
                    token,
                    data,
                    U256::ZERO,
                    params.sender,
                ))
            }
            None => Ok(ExpectedTransaction::native(
                params.recipient,
                params.amount,
                params.sender,
            )),
        }
    }

    fn attached_tx(&self) -> Option<&AttachedTx> {
        self.slots.tx.as_ref()
    }

    fn event_filters(&self) -> Vec<B256> {
        match self.params.token {
            Some(_) => vec![IERC20::Transfer::SIGNATURE_HASH],
            None => Vec::new(),
        }
    }
}
