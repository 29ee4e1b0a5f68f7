use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use super::{AttachedTx, Intent, IntentKind, IntentParams, VerifiableIntent};
use crate::{codec::FunctionEncoder, resolution::ExpectedTransaction, status::AddressMatch, Result};

/// Send raw call-data to a contract. The stored data is itself the expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractArbitraryCallParams {
    pub contract_address: Address,
    pub data: Bytes,
    #[serde(default)]
    pub value: U256,
    #[serde(default)]
    pub caller: AddressMatch,
}

impl IntentParams for ContractArbitraryCallParams {
    const KIND: IntentKind = IntentKind::ContractArbitraryCall;

    fn sender(&self) -> Option<&Address> {
        self.caller.pinned()
    }
}

impl VerifiableIntent for Intent<ContractArbitraryCallParams> {
    fn expected_transaction(&self, _encoder: &dyn FunctionEncoder) -> Result<ExpectedTransaction> {
        let params = &self.params;
        Ok(ExpectedTransaction::call(
            params.contract_address,
            params.data.clone(),
            params.value,
            params.caller,
        ))
    }

    fn attached_tx(&self) -> Option<&AttachedTx> {
        self.slots.tx.as_ref()
    }
}
