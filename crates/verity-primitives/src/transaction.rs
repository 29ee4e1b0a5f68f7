//! Observed on-chain data handed to the resolvers by a chain reader.

use alloy::primitives::{Address, Bytes, B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Identifies which network (and optionally which node) to query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainSpec {
    pub chain_id: u64,
    pub custom_rpc_url: Option<Url>,
}

impl ChainSpec {
    pub fn new(chain_id: u64, custom_rpc_url: Option<Url>) -> Self {
        Self {
            chain_id,
            custom_rpc_url,
        }
    }
}

/// Block at which a balance is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockParameter {
    #[default]
    Latest,
    Number(u64),
}

impl From<Option<u64>> for BlockParameter {
    fn from(value: Option<u64>) -> Self {
        value.map_or(BlockParameter::Latest, BlockParameter::Number)
    }
}

/// Log emitted by a transaction whose first topic matched one of the requested event signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// Mined transaction as seen by the chain reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfo {
    pub hash: B256,
    pub from: Address,
    /// Contract creations report the zero address.
    pub to: Address,
    pub deployed_contract_address: Option<Address>,
    pub data: Bytes,
    pub value: U256,
    pub block_confirmations: u64,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub events: Vec<EventLog>,
}

/// Deployment transaction located by contract address rather than by hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentTransactionInfo {
    pub hash: B256,
    pub from: Address,
    pub deployed_contract_address: Address,
    pub data: Bytes,
    pub value: U256,
    pub block_number: u64,
    pub binary: Bytes,
}

/// Balance of a wallet, native or ERC20, at a specific block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub wallet: Address,
    pub token: Option<Address>,
    pub block_number: u64,
    pub timestamp: DateTime<Utc>,
    pub amount: U256,
}
