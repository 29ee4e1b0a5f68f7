//! Persistence boundaries for intents and projects.

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;
use verity_primitives::intents::{AttachedTx, Intent, IntentParams, SignedBy};

use crate::error::Result;

/// Per-kind intent persistence.
///
/// Every `set_*` is first-writer-wins: it returns `false` when the slot was already
/// filled (or the intent does not exist) and leaves the stored value untouched.
#[async_trait]
pub trait IntentStore<P: IntentParams>: Send + Sync {
    async fn store(&self, intent: &Intent<P>) -> Result<()>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Intent<P>>>;

    async fn get_all_by_project_id(&self, project_id: Uuid) -> Result<Vec<Intent<P>>>;

    async fn get_by_sender(&self, project_id: Uuid, sender: Address) -> Result<Vec<Intent<P>>>;

    async fn get_by_recipient(
        &self,
        project_id: Uuid,
        recipient: Address,
    ) -> Result<Vec<Intent<P>>>;

    async fn get_by_alias(&self, project_id: Uuid, alias: &str) -> Result<Option<Intent<P>>>;

    async fn set_tx_info(&self, id: Uuid, tx: AttachedTx) -> Result<bool>;

    async fn set_approve_tx_info(&self, id: Uuid, tx: AttachedTx) -> Result<bool>;

    async fn set_disperse_tx_info(&self, id: Uuid, tx: AttachedTx) -> Result<bool>;

    async fn set_signed_message(&self, id: Uuid, signed: SignedBy) -> Result<bool>;

    async fn set_contract_address(&self, id: Uuid, address: Address) -> Result<bool>;

    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// A tenant owning intents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    /// Overrides the configured RPC endpoint for every chain read done for this project.
    pub custom_rpc_url: Option<Url>,
}

/// Read access to projects.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn get_by_id(&self, project_id: Uuid) -> Result<Option<Project>>;
}
