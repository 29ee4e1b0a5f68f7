use std::{str::FromStr, sync::Arc};

use alloy::{
    primitives::{address, hex, Address},
    signers::{local::PrivateKeySigner, SignerSync},
};
use rstest::*;
use uuid::Uuid;
use verity_primitives::{
    codec::AbiFunctionEncoder, intents::IntentParams, signature::EthereumSignatureChecker,
};
use verity_server::{services::IntentService, state::BaseState, store::Project};

use super::helpers::{MemoryIntentStore, MemoryProjectStore, MockChainReader};

pub const CHAIN_ID: u64 = 11155111;
pub const SENDER: Address = address!("865f603F42ca1231e5B5F90e15663b0FE19F0b21");
pub const RECIPIENT: Address = address!("2222222222222222222222222222222222222222");
pub const TOKEN: Address = address!("3333333333333333333333333333333333333333");
pub const DISPERSE: Address = address!("D152f549545093347A162Dce210e7293f1452150");

pub const WALLET_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const OTHER_WALLET_KEY: &str =
    "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";

/// Shared collaborators for one test, with a single registered project.
pub struct TestContext {
    pub project_id: Uuid,
    pub chain: Arc<MockChainReader>,
    pub projects: Arc<MemoryProjectStore>,
    pub base: BaseState,
}

impl TestContext {
    pub fn service<P: IntentParams>(&self) -> (IntentService<P>, Arc<MemoryIntentStore<P>>) {
        let store = Arc::new(MemoryIntentStore::<P>::default());
        (IntentService::new(self.base.clone(), store.clone()), store)
    }
}

#[fixture]
pub fn ctx() -> TestContext {
    let project_id = Uuid::new_v4();
    let chain = Arc::new(MockChainReader::default());
    let projects = Arc::new(MemoryProjectStore::default());
    projects.insert(Project {
        id: project_id,
        name: "test project".to_string(),
        custom_rpc_url: None,
    });
    let base = BaseState::new(
        chain.clone(),
        projects.clone(),
        Arc::new(AbiFunctionEncoder::new()),
        Arc::new(EthereumSignatureChecker::new()),
    );
    TestContext {
        project_id,
        chain,
        projects,
        base,
    }
}

/// Personal-sign `message` with `key`, returning the signer and the hex signature.
pub fn sign(key: &str, message: &str) -> (Address, String) {
    let signer = PrivateKeySigner::from_str(key).unwrap();
    let signature = signer.sign_message_sync(message.as_bytes()).unwrap();
    (signer.address(), hex::encode_prefixed(signature.as_bytes()))
}

pub fn wallet(key: &str) -> Address {
    PrivateKeySigner::from_str(key).unwrap().address()
}
