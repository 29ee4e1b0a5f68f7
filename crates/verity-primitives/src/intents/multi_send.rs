use alloy::{
    primitives::{Address, B256, U256},
    sol_types::SolEvent,
};
use serde::{Deserialize, Serialize};

use super::{Intent, IntentKind, IntentParams, ScreenConfig};
use crate::{
    abi::erc20::IERC20,
    codec::{FunctionArgument, FunctionEncoder},
    resolution::ExpectedTransaction,
    status::AddressMatch,
    PrimitivesError, Result,
};

/// Send assets to many recipients through a disperse contract.
///
/// Tokens take two transactions (approve, then disperse). Native currency only the second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMultiSendParams {
    pub token: Option<Address>,
    pub disperse_contract: Address,
    pub recipients: Vec<Address>,
    pub amounts: Vec<U256>,
    #[serde(default)]
    pub sender: AddressMatch,
    #[serde(default)]
    pub approve_screen_config: ScreenConfig,
    #[serde(default)]
    pub disperse_screen_config: ScreenConfig,
}

impl AssetMultiSendParams {
    /// Sum of all amounts, the approval the disperse contract needs.
    pub fn total_amount(&self) -> Result<U256> {
        self.amounts
            .iter()
            .try_fold(U256::ZERO, |total, amount| total.checked_add(*amount))
            .ok_or_else(|| PrimitivesError::InvalidParams("total amount overflows".to_string()))
    }
}

impl IntentParams for AssetMultiSendParams {
    const KIND: IntentKind = IntentKind::AssetMultiSend;

    fn sender(&self) -> Option<&Address> {
        self.sender.pinned()
    }

    fn recipients(&self) -> Vec<Address> {
        self.recipients.clone()
    }

    fn validate(&self) -> Result<()> {
        if self.recipients.is_empty() {
            return Err(PrimitivesError::InvalidParams(
                "multi send needs at least one recipient".to_string(),
            ));
        }
        if self.recipients.len() != self.amounts.len() {
            return Err(PrimitivesError::InvalidParams(format!(
                "{} recipients but {} amounts",
                self.recipients.len(),
                self.amounts.len()
            )));
        }
        Ok(())
    }
}

impl Intent<AssetMultiSendParams> {
    /// `token.approve(disperseContract, total)`, or `None` for native assets.
    pub fn expected_approve(
        &self,
        encoder: &dyn FunctionEncoder,
    ) -> Result<Option<ExpectedTransaction>> {
        let params = &self.params;
        params.validate()?;
        let Some(token) = params.token else {
            return Ok(None);
        };

        let data = encoder.encode(
            "approve",
            &[
                FunctionArgument::Address(params.disperse_contract),
                FunctionArgument::Uint256(params.total_amount()?),
            ],
        )?;
        Ok(Some(ExpectedTransaction::call(
            token,
            data,
            U256::ZERO,
            params.sender,
        )))
    }

    /// `disperseToken(token, recipients, amounts)` or `disperseEther(recipients, amounts)`.
    pub fn expected_disperse(&self, encoder: &dyn FunctionEncoder) -> Result<ExpectedTransaction> {
        let params = &self.params;
        params.validate()?;
        let recipients = FunctionArgument::AddressArray(params.recipients.clone());
        let amounts = FunctionArgument::Uint256Array(params.amounts.clone());

        let (data, value) = match params.token {
            Some(token) => (
                encoder.encode(
                    "disperseToken",
                    &[FunctionArgument::Address(token), recipients, amounts],
                )?,
                U256::ZERO,
            ),
            None => (
                encoder.encode("disperseEther", &[recipients, amounts])?,
                params.total_amount()?,
            ),
        };

        Ok(ExpectedTransaction::call(
            params.disperse_contract,
            data,
            value,
            params.sender,
        ))
    }

    pub fn is_native(&self) -> bool {
        self.params.token.is_none()
    }

    pub fn approve_event_filters(&self) -> Vec<B256> {
        vec![IERC20::Approval::SIGNATURE_HASH]
    }

    pub fn disperse_event_filters(&self) -> Vec<B256> {
        vec![IERC20::Transfer::SIGNATURE_HASH]
    }
}
