//! Per-kind orchestration: load → recompute → observe → resolve → view.

use alloy::primitives::Address;
use async_trait::async_trait;
use futures::future::try_join_all;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;
use verity_primitives::{
    intents::{Intent, IntentParams},
    Status,
};

use crate::error::{Result, ServerError};
use crate::state::BaseState;
use crate::store::IntentStore;

pub mod authorization;
pub mod balance;
pub mod deployment;
pub mod multi_send;
pub mod transaction;

pub use authorization::{AuthorizationService, SignedMessageResolution};
pub use balance::{BalanceResolution, BalanceService};
pub use deployment::{DeploymentResolution, DeploymentService};
pub use multi_send::MultiSendService;
pub use transaction::TransactionService;

/// A stored intent annotated with its freshly derived status.
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = "P: IntentParams, R: Serialize"))]
pub struct IntentView<P, R> {
    pub intent: Intent<P>,
    /// Redirect URL with the intent id substituted.
    pub redirect_url: Option<String>,
    pub status: Status,
    pub resolution: R,
}

impl<P: IntentParams, R> IntentView<P, R> {
    pub fn new(intent: Intent<P>, status: Status, resolution: R) -> Self {
        Self {
            redirect_url: intent.rendered_redirect_url(),
            intent,
            status,
            resolution,
        }
    }
}

/// Storage of one intent kind plus the shared collaborators.
pub struct IntentService<P> {
    base: BaseState,
    store: Arc<dyn IntentStore<P>>,
}

impl<P> Clone for IntentService<P> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            store: self.store.clone(),
        }
    }
}

impl<P: IntentParams> IntentService<P> {
    pub fn new(base: BaseState, store: Arc<dyn IntentStore<P>>) -> Self {
        Self { base, store }
    }

    pub fn store(&self) -> &dyn IntentStore<P> {
        self.store.as_ref()
    }

    /// Validates and stores a new intent.
    pub async fn create(&self, intent: Intent<P>) -> Result<Intent<P>> {
        intent.params.validate()?;
        self.store.store(&intent).await?;
        Ok(intent)
    }

    pub async fn load(&self, id: Uuid) -> Result<Intent<P>> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or(ServerError::NotFound(id))
    }

    /// Intents of another project are reported as missing.
    pub async fn load_owned(&self, project_id: Uuid, id: Uuid) -> Result<Intent<P>> {
        let intent = self.load(id).await?;
        if intent.project_id != project_id {
            tracing::debug!(intent_id = %id, %project_id, "intent belongs to another project");
            return Err(ServerError::NotFound(id));
        }
        Ok(intent)
    }
}

impl<P> std::ops::Deref for IntentService<P> {
    type Target = BaseState;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

/// Resolution of one intent kind, with the lookups every kind supports.
#[async_trait]
pub trait IntentResolver: Send + Sync {
    type Params: IntentParams;
    type Resolution: Serialize + Send + Sync;

    fn intents(&self) -> &IntentService<Self::Params>;

    async fn resolve(
        &self,
        intent: Intent<Self::Params>,
    ) -> Result<IntentView<Self::Params, Self::Resolution>>;

    async fn get(&self, id: Uuid) -> Result<IntentView<Self::Params, Self::Resolution>> {
        let intent = self.intents().load(id).await?;
        self.resolve(intent).await
    }

    async fn get_owned(
        &self,
        project_id: Uuid,
        id: Uuid,
    ) -> Result<IntentView<Self::Params, Self::Resolution>> {
        let intent = self.intents().load_owned(project_id, id).await?;
        self.resolve(intent).await
    }

    async fn resolve_all(
        &self,
        intents: Vec<Intent<Self::Params>>,
    ) -> Result<Vec<IntentView<Self::Params, Self::Resolution>>> {
        try_join_all(intents.into_iter().map(|intent| self.resolve(intent))).await
    }

    async fn list_by_project(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<IntentView<Self::Params, Self::Resolution>>> {
        let intents = self
            .intents()
            .store()
            .get_all_by_project_id(project_id)
            .await?;
        self.resolve_all(intents).await
    }

    async fn list_by_sender(
        &self,
        project_id: Uuid,
        sender: Address,
    ) -> Result<Vec<IntentView<Self::Params, Self::Resolution>>> {
        let intents = self
            .intents()
            .store()
            .get_by_sender(project_id, sender)
            .await?;
        self.resolve_all(intents).await
    }

    async fn list_by_recipient(
        &self,
        project_id: Uuid,
        recipient: Address,
    ) -> Result<Vec<IntentView<Self::Params, Self::Resolution>>> {
        let intents = self
            .intents()
            .store()
            .get_by_recipient(project_id, recipient)
            .await?;
        self.resolve_all(intents).await
    }
}
