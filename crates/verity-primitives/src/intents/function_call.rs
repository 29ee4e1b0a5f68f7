use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::{AttachedTx, Intent, IntentKind, IntentParams, VerifiableIntent};
use crate::{
    codec::{validate_function_name, FunctionArgument, FunctionEncoder},
    resolution::ExpectedTransaction,
    status::AddressMatch,
    PrimitivesError, Result,
};

/// Call a named function on a contract with typed arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractFunctionCallParams {
    pub contract_address: Address,
    pub function_name: String,
    #[serde(default)]
    pub args: Vec<FunctionArgument>,
    #[serde(default)]
    pub value: U256,
    #[serde(default)]
    pub caller: AddressMatch,
}

impl IntentParams for ContractFunctionCallParams {
    const KIND: IntentKind = IntentKind::ContractFunctionCall;

    fn sender(&self) -> Option<&Address> {
        self.caller.pinned()
    }

    fn validate(&self) -> Result<()> {
        validate_function_name(&self.function_name).map_err(|_| {
            PrimitivesError::InvalidParams(format!(
                "invalid function name: {:?}",
                self.function_name
            ))
        })
    }
}

impl VerifiableIntent for Intent<ContractFunctionCallParams> {
    fn expected_transaction(&self, encoder: &dyn FunctionEncoder) -> Result<ExpectedTransaction> {
        let params = &self.params;
        let data = encoder.encode(&params.function_name, &params.args)?;
        Ok(ExpectedTransaction::call(
            params.contract_address,
            data,
            params.value,
            params.caller,
        ))
    }

    fn attached_tx(&self) -> Option<&AttachedTx> {
        self.slots.tx.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abi::erc20::IERC20,
        codec::AbiFunctionEncoder,
        resolution::{resolve, test_utils::*},
        Status,
    };
    use alloy::sol_types::SolCall;
    use uuid::Uuid;

    fn call(function_name: &str, value: u64) -> Intent<ContractFunctionCallParams> {
        Intent::new(
            Uuid::new_v4(),
            1,
            ContractFunctionCallParams {
                contract_address: TOKEN,
                function_name: function_name.to_string(),
                args: vec![
                    FunctionArgument::Address(RECIPIENT),
                    FunctionArgument::Uint256(U256::from(9u64)),
                ],
                value: U256::from(value),
                caller: AddressMatch::Wildcard,
            },
        )
    }

    #[test]
    fn encodes_named_function() {
        let expected = call("approve", 0)
            .expected_transaction(&AbiFunctionEncoder)
            .unwrap();
        let approve = IERC20::approveCall {
            spender: RECIPIENT,
            amount: U256::from(9u64),
        }
        .abi_encode();
        assert_eq!(expected.data().unwrap().as_ref(), approve.as_slice());
    }

    #[test]
    fn value_is_checked() {
        let expected = call("approve", 2)
            .expected_transaction(&AbiFunctionEncoder)
            .unwrap();
        let mut observed = matching_transaction(&expected);
        observed.value = U256::ZERO;
        assert_eq!(
            resolve(&expected, Some(&TX_HASH), Some(&observed)),
            Status::Failed
        );
    }

    #[test]
    fn encoder_errors_propagate() {
        assert!(matches!(
            call("not a function", 0).expected_transaction(&AbiFunctionEncoder),
            Err(PrimitivesError::EncodingError(_))
        ));
    }

    #[test]
    fn bad_function_name_is_rejected_up_front() {
        assert!(call("approve", 0).params.validate().is_ok());
        for name in ["", "1mint", "mint(uint256)", "not a function"] {
            assert!(matches!(
                call(name, 0).params.validate(),
                Err(PrimitivesError::InvalidParams(_))
            ));
        }
    }
}
