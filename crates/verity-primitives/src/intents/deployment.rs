use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AttachedTx, Intent, IntentKind, IntentParams, VerifiableIntent};
use crate::{
    codec::{FunctionArgument, FunctionEncoder},
    resolution::ExpectedTransaction,
    status::AddressMatch,
    Result,
};

/// Deploy a contract, or register one deployed elsewhere when `imported` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDeploymentParams {
    /// Unique per project.
    pub alias: String,
    pub contract_id: Uuid,
    pub bytecode: Bytes,
    #[serde(default)]
    pub constructor_args: Vec<FunctionArgument>,
    #[serde(default)]
    pub value: U256,
    #[serde(default)]
    pub deployer: AddressMatch,
    #[serde(default)]
    pub imported: bool,
}

impl IntentParams for ContractDeploymentParams {
    const KIND: IntentKind = IntentKind::ContractDeployment;

    fn sender(&self) -> Option<&Address> {
        self.deployer.pinned()
    }

    fn alias(&self) -> Option<&str> {
        Some(&self.alias)
    }
}

impl Intent<ContractDeploymentParams> {
    /// Bytecode followed by the encoded constructor arguments.
    pub fn deployment_data(&self, encoder: &dyn FunctionEncoder) -> Result<Bytes> {
        let args = encoder.encode_constructor(&self.params.constructor_args)?;
        Ok([self.params.bytecode.as_ref(), args.as_ref()].concat().into())
    }

    pub fn contract_address(&self) -> Option<Address> {
        self.slots.deployed_contract_address
    }

    pub fn is_imported(&self) -> bool {
        self.params.imported
    }
}

impl VerifiableIntent for Intent<ContractDeploymentParams> {
    fn expected_transaction(&self, encoder: &dyn FunctionEncoder) -> Result<ExpectedTransaction> {
        Ok(ExpectedTransaction::deployment(
            self.slots.deployed_contract_address,
            self.deployment_data(encoder)?,
            self.params.value,
            self.params.deployer,
        ))
    }

    fn attached_tx(&self) -> Option<&AttachedTx> {
        self.slots.tx.as_ref()
    }
}
