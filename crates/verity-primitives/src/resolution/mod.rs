//! Status resolution: compares what an intent expects against what the chain (or a
//! signature) reports and derives a [`Status`].
//!
//! Every resolver here is a pure function. Fetching observations and persisting
//! anything is the caller's job.

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{status::AddressMatch, transaction::TransactionInfo, Status};

pub mod balance_proof;
pub mod multi_leg;
pub mod signed_message;

pub use balance_proof::{resolve_balance_proof, BalanceProofOutcome};
pub use multi_leg::{resolve_multi_leg, LegInput, MultiLegOutcome};
pub use signed_message::{resolve_signed_message, should_expire};

/// Whether the transaction is expected to create a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentExpectation {
    /// A receipt carrying a contract address is not a match.
    NotExpected,
    /// `None` while the deployed address has not been recorded yet.
    Expected(Option<Address>),
}

/// What the transaction is expected to carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpectedPayload {
    /// Contract interaction. Token legs expect a zero native value.
    Call {
        /// Selector plus ABI-encoded arguments, compared byte for byte.
        data: Bytes,
        /// Native amount attached to the call, always compared.
        value: U256,
    },
    /// Plain native transfer. Call-data is never compared.
    Native {
        /// Amount of native currency sent.
        value: U256,
    },
}

/// Expected shape of a transaction, recomputed from the intent on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedTransaction {
    /// Recipient, token or contract. The zero address for deployments.
    pub to: Address,
    pub deployment: DeploymentExpectation,
    pub payload: ExpectedPayload,
    /// Sender constraint; a wildcard accepts any wallet.
    pub from: AddressMatch,
}

impl ExpectedTransaction {
    /// Contract call with exact call-data and native value.
    pub fn call(to: Address, data: Bytes, value: U256, from: AddressMatch) -> Self {
        Self {
            to,
            deployment: DeploymentExpectation::NotExpected,
            payload: ExpectedPayload::Call { data, value },
            from,
        }
    }

    /// Plain transfer of `value` to `to`.
    pub fn native(to: Address, value: U256, from: AddressMatch) -> Self {
        Self {
            to,
            deployment: DeploymentExpectation::NotExpected,
            payload: ExpectedPayload::Native { value },
            from,
        }
    }

    /// Contract creation: sent to the zero address with bytecode and constructor args as data.
    pub fn deployment(
        deployed_address: Option<Address>,
        data: Bytes,
        value: U256,
        from: AddressMatch,
    ) -> Self {
        Self {
            to: Address::ZERO,
            deployment: DeploymentExpectation::Expected(deployed_address),
            payload: ExpectedPayload::Call { data, value },
            from,
        }
    }

    /// Call-data the wallet should send. `None` for native transfers.
    pub fn data(&self) -> Option<&Bytes> {
        match &self.payload {
            ExpectedPayload::Call { data, .. } => Some(data),
            ExpectedPayload::Native { .. } => None,
        }
    }

    /// Native value the wallet should attach.
    pub fn value(&self) -> U256 {
        match &self.payload {
            ExpectedPayload::Call { value, .. } => *value,
            ExpectedPayload::Native { value } => *value,
        }
    }
}

/// First check that failed when comparing a successful transaction with its expectation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Mismatch {
    #[error("observed hash {observed} differs from attached hash {attached}")]
    Hash { attached: B256, observed: B256 },
    #[error("transaction sent to {observed}, expected {expected}")]
    To { expected: Address, observed: Address },
    #[error("transaction did not deploy a contract")]
    MissingDeployment,
    #[error("deployed contract {observed} differs from expected {expected}")]
    DeployedAddress { expected: Address, observed: Address },
    #[error("call data differs from expected call data")]
    CallData,
    #[error("transaction value {observed} differs from expected {expected}")]
    Value { expected: U256, observed: U256 },
    #[error("transaction sent by {observed}, expected {expected}")]
    Sender { expected: Address, observed: Address },
}

/// Runs every applicable check against a successful transaction, in order.
pub fn verify_observed(
    expected: &ExpectedTransaction,
    tx_hash: &B256,
    observed: &TransactionInfo,
) -> core::result::Result<(), Mismatch> {
    if &observed.hash != tx_hash {
        return Err(Mismatch::Hash {
            attached: *tx_hash,
            observed: observed.hash,
        });
    }

    if observed.to != expected.to {
        return Err(Mismatch::To {
            expected: expected.to,
            observed: observed.to,
        });
    }

    if let DeploymentExpectation::Expected(declared) = expected.deployment {
        let deployed = observed
            .deployed_contract_address
            .ok_or(Mismatch::MissingDeployment)?;
        if let Some(declared) = declared {
            if declared != deployed {
                return Err(Mismatch::DeployedAddress {
                    expected: declared,
                    observed: deployed,
                });
            }
        }
    }

    match &expected.payload {
        ExpectedPayload::Call { data, value } => {
            if &observed.data != data {
                return Err(Mismatch::CallData);
            }
            verify_value(*value, observed.value)?;
        }
        ExpectedPayload::Native { value } => verify_value(*value, observed.value)?,
    }

    if let Some(pinned) = expected.from.pinned() {
        if pinned != &observed.from {
            return Err(Mismatch::Sender {
                expected: *pinned,
                observed: observed.from,
            });
        }
    }

    Ok(())
}

fn verify_value(expected: U256, observed: U256) -> core::result::Result<(), Mismatch> {
    if expected == observed {
        Ok(())
    } else {
        Err(Mismatch::Value { expected, observed })
    }
}

/// Single-transaction verdict.
///
/// No hash or no observation is PENDING, a reverted transaction is FAILED no matter
/// what it carried, otherwise every check in [`verify_observed`] must pass.
pub fn resolve(
    expected: &ExpectedTransaction,
    tx_hash: Option<&B256>,
    observed: Option<&TransactionInfo>,
) -> Status {
    let (Some(tx_hash), Some(observed)) = (tx_hash, observed) else {
        return Status::Pending;
    };

    if !observed.success {
        return Status::Failed;
    }

    match verify_observed(expected, tx_hash, observed) {
        Ok(()) => Status::Success,
        Err(mismatch) => {
            tracing::debug!(%tx_hash, %mismatch, "transaction does not match intent");
            Status::Failed
        }
    }
}

/// A resolved transaction leg: the verdict plus everything needed to render it.
///
/// `expected` is always populated so a pending leg can still show the wallet what to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLeg {
    pub status: Status,
    pub expected: ExpectedTransaction,
    pub tx_hash: Option<B256>,
    pub transaction_info: Option<TransactionInfo>,
}

impl ResolvedLeg {
    pub fn resolve(
        expected: ExpectedTransaction,
        tx_hash: Option<B256>,
        observed: Option<TransactionInfo>,
    ) -> Self {
        let status = resolve(&expected, tx_hash.as_ref(), observed.as_ref());
        Self {
            status,
            expected,
            tx_hash,
            transaction_info: observed,
        }
    }

    pub fn pending(expected: ExpectedTransaction) -> Self {
        Self::resolve(expected, None, None)
    }
}
