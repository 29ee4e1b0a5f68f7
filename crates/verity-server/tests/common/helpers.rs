use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};

use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use uuid::Uuid;
use verity_primitives::{
    intents::{AttachedTx, Intent, IntentParams, SignedBy},
    resolution::{DeploymentExpectation, ExpectedTransaction},
    transaction::{
        AccountBalance, BlockParameter, ChainSpec, DeploymentTransactionInfo, TransactionInfo,
    },
};
use verity_server::{
    chain::ChainReader,
    error::{Result, ServerError},
    store::{IntentStore, Project, ProjectStore},
};

/// Intent store backed by a map, with the same first-writer-wins slot semantics as postgres.
pub struct MemoryIntentStore<P> {
    intents: Mutex<HashMap<Uuid, Intent<P>>>,
    deletes: AtomicUsize,
}

impl<P> Default for MemoryIntentStore<P> {
    fn default() -> Self {
        Self {
            intents: Mutex::new(HashMap::new()),
            deletes: AtomicUsize::new(0),
        }
    }
}

impl<P: IntentParams> MemoryIntentStore<P> {
    /// Number of deletes that actually removed an intent.
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn filter(&self, keep: impl Fn(&Intent<P>) -> bool) -> Vec<Intent<P>> {
        let intents = self.intents.lock().unwrap();
        let mut found: Vec<Intent<P>> = intents
            .values()
            .filter(|intent| keep(*intent))
            .cloned()
            .collect();
        found.sort_by_key(|intent| intent.created_at);
        found
    }

    fn fill_slot(&self, id: Uuid, update: impl FnOnce(&mut Intent<P>) -> bool) -> bool {
        let mut intents = self.intents.lock().unwrap();
        intents.get_mut(&id).map_or(false, update)
    }
}

fn fill<T>(slot: &mut Option<T>, value: T) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(value);
    true
}

#[async_trait]
impl<P: IntentParams> IntentStore<P> for MemoryIntentStore<P> {
    async fn store(&self, intent: &Intent<P>) -> Result<()> {
        self.intents
            .lock()
            .unwrap()
            .insert(intent.id, intent.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Intent<P>>> {
        Ok(self.intents.lock().unwrap().get(&id).cloned())
    }

    async fn get_all_by_project_id(&self, project_id: Uuid) -> Result<Vec<Intent<P>>> {
        Ok(self.filter(|intent| intent.project_id == project_id))
    }

    async fn get_by_sender(&self, project_id: Uuid, sender: Address) -> Result<Vec<Intent<P>>> {
        Ok(self.filter(|intent| {
            intent.project_id == project_id && intent.params.sender() == Some(&sender)
        }))
    }

    async fn get_by_recipient(
        &self,
        project_id: Uuid,
        recipient: Address,
    ) -> Result<Vec<Intent<P>>> {
        Ok(self.filter(|intent| {
            intent.project_id == project_id && intent.params.recipients().contains(&recipient)
        }))
    }

    async fn get_by_alias(&self, project_id: Uuid, alias: &str) -> Result<Option<Intent<P>>> {
        Ok(self
            .filter(|intent| {
                intent.project_id == project_id && intent.params.alias() == Some(alias)
            })
            .into_iter()
            .next())
    }

    async fn set_tx_info(&self, id: Uuid, tx: AttachedTx) -> Result<bool> {
        Ok(self.fill_slot(id, |intent| fill(&mut intent.slots.tx, tx)))
    }

    async fn set_approve_tx_info(&self, id: Uuid, tx: AttachedTx) -> Result<bool> {
        Ok(self.fill_slot(id, |intent| fill(&mut intent.slots.approve_tx, tx)))
    }

    async fn set_disperse_tx_info(&self, id: Uuid, tx: AttachedTx) -> Result<bool> {
        Ok(self.fill_slot(id, |intent| fill(&mut intent.slots.disperse_tx, tx)))
    }

    async fn set_signed_message(&self, id: Uuid, signed: SignedBy) -> Result<bool> {
        Ok(self.fill_slot(id, |intent| fill(&mut intent.slots.signed, signed)))
    }

    async fn set_contract_address(&self, id: Uuid, address: Address) -> Result<bool> {
        Ok(self.fill_slot(id, |intent| {
            fill(&mut intent.slots.deployed_contract_address, address)
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let removed = self.intents.lock().unwrap().remove(&id).is_some();
        if removed {
            self.deletes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(removed)
    }
}

#[derive(Default)]
pub struct MemoryProjectStore {
    projects: Mutex<HashMap<Uuid, Project>>,
}

impl MemoryProjectStore {
    pub fn insert(&self, project: Project) {
        self.projects.lock().unwrap().insert(project.id, project);
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn get_by_id(&self, project_id: Uuid) -> Result<Option<Project>> {
        Ok(self.projects.lock().unwrap().get(&project_id).cloned())
    }
}

/// Chain reader serving canned transactions, balances and deployments.
#[derive(Default)]
pub struct MockChainReader {
    transactions: Mutex<HashMap<B256, TransactionInfo>>,
    balances: Mutex<HashMap<(Option<Address>, Address), AccountBalance>>,
    deployments: Mutex<HashMap<Address, DeploymentTransactionInfo>>,
    transaction_lookups: AtomicUsize,
    unreachable: AtomicBool,
    chains_seen: Mutex<Vec<ChainSpec>>,
}

impl MockChainReader {
    pub fn add_transaction(&self, tx: TransactionInfo) {
        self.transactions.lock().unwrap().insert(tx.hash, tx);
    }

    pub fn set_balance(&self, balance: AccountBalance) {
        self.balances
            .lock()
            .unwrap()
            .insert((balance.token, balance.wallet), balance);
    }

    pub fn add_deployment(&self, deployment: DeploymentTransactionInfo) {
        self.deployments
            .lock()
            .unwrap()
            .insert(deployment.deployed_contract_address, deployment);
    }

    pub fn transaction_lookups(&self) -> usize {
        self.transaction_lookups.load(Ordering::SeqCst)
    }

    /// Every later transaction lookup fails as if the node were down.
    pub fn go_offline(&self) {
        self.unreachable.store(true, Ordering::SeqCst);
    }

    pub fn last_chain(&self) -> Option<ChainSpec> {
        self.chains_seen.lock().unwrap().last().cloned()
    }

    fn seen(&self, chain: &ChainSpec) {
        self.chains_seen.lock().unwrap().push(chain.clone());
    }

    fn balance(&self, token: Option<Address>, wallet: Address) -> Result<AccountBalance> {
        self.balances
            .lock()
            .unwrap()
            .get(&(token, wallet))
            .cloned()
            .ok_or_else(|| ServerError::ChainReadError(format!("no balance for {wallet}")))
    }
}

#[async_trait]
impl ChainReader for MockChainReader {
    async fn fetch_transaction_info(
        &self,
        chain: &ChainSpec,
        hash: B256,
        _event_filters: &[B256],
    ) -> Result<Option<TransactionInfo>> {
        self.seen(chain);
        self.transaction_lookups.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(ServerError::ChainReadError(format!("node unreachable for {hash}")));
        }
        Ok(self.transactions.lock().unwrap().get(&hash).cloned())
    }

    async fn fetch_account_balance(
        &self,
        chain: &ChainSpec,
        wallet: Address,
        _block: BlockParameter,
    ) -> Result<AccountBalance> {
        self.seen(chain);
        self.balance(None, wallet)
    }

    async fn fetch_erc20_account_balance(
        &self,
        chain: &ChainSpec,
        token: Address,
        wallet: Address,
        _block: BlockParameter,
    ) -> Result<AccountBalance> {
        self.seen(chain);
        self.balance(Some(token), wallet)
    }

    async fn find_contract_deployment_transaction(
        &self,
        chain: &ChainSpec,
        contract: Address,
    ) -> Result<Option<DeploymentTransactionInfo>> {
        self.seen(chain);
        Ok(self.deployments.lock().unwrap().get(&contract).cloned())
    }
}

/// A successful transaction `hash` that satisfies `expected` on every field.
pub fn mined(hash: B256, from: Address, expected: &ExpectedTransaction) -> TransactionInfo {
    TransactionInfo {
        hash,
        from,
        to: expected.to,
        deployed_contract_address: match expected.deployment {
            DeploymentExpectation::NotExpected => None,
            DeploymentExpectation::Expected(address) => {
                Some(address.unwrap_or(Address::repeat_byte(0xdd)))
            }
        },
        data: expected.data().cloned().unwrap_or_default(),
        value: expected.value(),
        block_confirmations: 3,
        timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        success: true,
        events: Vec::new(),
    }
}

pub fn attached(hash: B256, caller: Address) -> AttachedTx {
    AttachedTx { hash, caller }
}
