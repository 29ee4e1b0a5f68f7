//! Read access to EVM chains.

use alloy::{
    consensus::Transaction as _,
    eips::BlockId,
    network::{primitives::BlockTransactionsKind, Ethereum, ReceiptResponse as _},
    primitives::{Address, B256},
    providers::{Provider, ProviderBuilder},
    transports::Transport,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{collections::HashMap, fmt::Display, time::Duration};
use tokio::time::timeout;
use url::Url;
use verity_primitives::{
    abi::erc20::IERC20::IERC20Instance,
    transaction::{
        AccountBalance, BlockParameter, ChainSpec, DeploymentTransactionInfo, EventLog,
        TransactionInfo,
    },
};

use crate::error::{Result, ServerError};

/// Source of observed on-chain data.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// `None` while the transaction is unknown, not yet mined, or the lookup timed out.
    async fn fetch_transaction_info(
        &self,
        chain: &ChainSpec,
        hash: B256,
        event_filters: &[B256],
    ) -> Result<Option<TransactionInfo>>;

    async fn fetch_account_balance(
        &self,
        chain: &ChainSpec,
        wallet: Address,
        block: BlockParameter,
    ) -> Result<AccountBalance>;

    async fn fetch_erc20_account_balance(
        &self,
        chain: &ChainSpec,
        token: Address,
        wallet: Address,
        block: BlockParameter,
    ) -> Result<AccountBalance>;

    /// Locates the transaction that created `contract`, if it was a top-level creation.
    async fn find_contract_deployment_transaction(
        &self,
        chain: &ChainSpec,
        contract: Address,
    ) -> Result<Option<DeploymentTransactionInfo>>;
}

/// [`ChainReader`] over JSON-RPC, one HTTP provider per request.
#[derive(Debug, Clone)]
pub struct AlloyChainReader {
    rpc_urls: HashMap<u64, Url>,
    read_timeout: Duration,
}

impl AlloyChainReader {
    pub fn new(rpc_urls: HashMap<u64, Url>, read_timeout: Duration) -> Self {
        Self {
            rpc_urls,
            read_timeout,
        }
    }

    /// A project's custom endpoint wins over the configured one.
    pub fn rpc_url(&self, chain: &ChainSpec) -> Result<Url> {
        chain
            .custom_rpc_url
            .clone()
            .or_else(|| self.rpc_urls.get(&chain.chain_id).cloned())
            .ok_or(ServerError::UnsupportedChain(chain.chain_id))
    }

    async fn with_timeout<F, O>(&self, what: &str, fut: F) -> Result<O>
    where
        F: std::future::Future<Output = Result<O>>,
    {
        timeout(self.read_timeout, fut).await.map_err(|_| {
            ServerError::ChainReadError(format!(
                "{what} timed out after {} seconds",
                self.read_timeout.as_secs()
            ))
        })?
    }
}

#[async_trait]
impl ChainReader for AlloyChainReader {
    async fn fetch_transaction_info(
        &self,
        chain: &ChainSpec,
        hash: B256,
        event_filters: &[B256],
    ) -> Result<Option<TransactionInfo>> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url(chain)?);
        match timeout(
            self.read_timeout,
            get_transaction_info(&provider, hash, event_filters),
        )
        .await
        {
            Ok(info) => info,
            Err(_) => {
                tracing::warn!(%hash, chain_id = chain.chain_id, "transaction lookup timed out");
                Ok(None)
            }
        }
    }

    async fn fetch_account_balance(
        &self,
        chain: &ChainSpec,
        wallet: Address,
        block: BlockParameter,
    ) -> Result<AccountBalance> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url(chain)?);
        self.with_timeout("balance lookup", async {
            let (block_number, timestamp) = resolve_block(&provider, block).await?;
            let amount = provider
                .get_balance(wallet)
                .block_id(BlockId::number(block_number))
                .await
                .map_err(chain_error)?;
            Ok(AccountBalance {
                wallet,
                token: None,
                block_number,
                timestamp,
                amount,
            })
        })
        .await
    }

    async fn fetch_erc20_account_balance(
        &self,
        chain: &ChainSpec,
        token: Address,
        wallet: Address,
        block: BlockParameter,
    ) -> Result<AccountBalance> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url(chain)?);
        self.with_timeout("token balance lookup", async {
            let (block_number, timestamp) = resolve_block(&provider, block).await?;
            let token_contract = IERC20Instance::new(token, provider.clone());
            let amount = token_contract
                .balanceOf(wallet)
                .block(BlockId::number(block_number))
                .call()
                .await
                .map_err(chain_error)?
                ._0;
            Ok(AccountBalance {
                wallet,
                token: Some(token),
                block_number,
                timestamp,
                amount,
            })
        })
        .await
    }

    async fn find_contract_deployment_transaction(
        &self,
        chain: &ChainSpec,
        contract: Address,
    ) -> Result<Option<DeploymentTransactionInfo>> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url(chain)?);
        self.with_timeout(
            "deployment lookup",
            find_deployment_transaction(&provider, contract),
        )
        .await
    }
}

fn chain_error(e: impl Display) -> ServerError {
    ServerError::ChainReadError(e.to_string())
}

async fn get_transaction_info<T, P>(
    provider: &P,
    hash: B256,
    event_filters: &[B256],
) -> Result<Option<TransactionInfo>>
where
    T: Transport + Clone,
    P: Provider<T, Ethereum>,
{
    let Some(tx) = provider
        .get_transaction_by_hash(hash)
        .await
        .map_err(chain_error)?
    else {
        return Ok(None);
    };
    let Some(block_number) = tx.block_number else {
        tracing::debug!(%hash, "transaction not mined yet");
        return Ok(None);
    };
    let Some(receipt) = provider
        .get_transaction_receipt(hash)
        .await
        .map_err(chain_error)?
    else {
        return Ok(None);
    };

    let latest_block = provider.get_block_number().await.map_err(chain_error)?;
    let timestamp = get_block_timestamp(provider, block_number).await?;

    let events = receipt
        .inner
        .logs()
        .iter()
        .filter(|log| {
            log.topics()
                .first()
                .is_some_and(|topic| event_filters.contains(topic))
        })
        .map(|log| EventLog {
            address: log.address(),
            topics: log.topics().to_vec(),
            data: log.data().data.clone(),
        })
        .collect();

    Ok(Some(TransactionInfo {
        hash: *tx.inner.tx_hash(),
        from: tx.from,
        to: tx.to().unwrap_or(Address::ZERO),
        deployed_contract_address: receipt.contract_address,
        data: tx.input().clone(),
        value: tx.value(),
        block_confirmations: latest_block.saturating_sub(block_number),
        timestamp,
        success: receipt.status(),
        events,
    }))
}

async fn get_block_timestamp<T, P>(provider: &P, block_number: u64) -> Result<DateTime<Utc>>
where
    T: Transport + Clone,
    P: Provider<T, Ethereum>,
{
    let timestamp = provider
        .get_block(
            BlockId::number(block_number),
            BlockTransactionsKind::Hashes,
        )
        .await
        .map_err(chain_error)?
        .map(|block| block.header.timestamp)
        .ok_or_else(|| ServerError::ChainReadError(format!("block {block_number} not found")))?;

    DateTime::from_timestamp(timestamp as i64, 0)
        .ok_or_else(|| ServerError::ChainReadError(format!("invalid block timestamp {timestamp}")))
}

/// Pins `latest` to a concrete block so the balance and its timestamp agree.
async fn resolve_block<T, P>(provider: &P, block: BlockParameter) -> Result<(u64, DateTime<Utc>)>
where
    T: Transport + Clone,
    P: Provider<T, Ethereum>,
{
    let block_number = match block {
        BlockParameter::Latest => provider.get_block_number().await.map_err(chain_error)?,
        BlockParameter::Number(number) => number,
    };
    let timestamp = get_block_timestamp(provider, block_number).await?;
    Ok((block_number, timestamp))
}

/// Binary-searches the first block holding code at `contract`, then scans that block's
/// creation transactions for the one whose receipt reports the contract.
async fn find_deployment_transaction<T, P>(
    provider: &P,
    contract: Address,
) -> Result<Option<DeploymentTransactionInfo>>
where
    T: Transport + Clone,
    P: Provider<T, Ethereum>,
{
    let latest_block = provider.get_block_number().await.map_err(chain_error)?;
    let binary = provider
        .get_code_at(contract)
        .block_id(BlockId::number(latest_block))
        .await
        .map_err(chain_error)?;
    if binary.is_empty() {
        return Ok(None);
    }

    let (mut low, mut high) = (0u64, latest_block);
    while low < high {
        let mid = low + (high - low) / 2;
        let code = provider
            .get_code_at(contract)
            .block_id(BlockId::number(mid))
            .await
            .map_err(chain_error)?;
        if code.is_empty() {
            low = mid + 1;
        } else {
            high = mid;
        }
    }
    let block_number = low;

    let Some(block) = provider
        .get_block(BlockId::number(block_number), BlockTransactionsKind::Full)
        .await
        .map_err(chain_error)?
    else {
        return Ok(None);
    };

    for tx in block.transactions.txns() {
        if tx.to().is_some() {
            continue;
        }
        let hash = *tx.inner.tx_hash();
        let Some(receipt) = provider
            .get_transaction_receipt(hash)
            .await
            .map_err(chain_error)?
        else {
            continue;
        };
        if receipt.contract_address == Some(contract) {
            return Ok(Some(DeploymentTransactionInfo {
                hash,
                from: tx.from,
                deployed_contract_address: contract,
                data: tx.input().clone(),
                value: tx.value(),
                block_number,
                binary,
            }));
        }
    }

    tracing::debug!(%contract, block_number, "contract not created by a top-level transaction");
    Ok(None)
}
