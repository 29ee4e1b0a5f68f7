use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;
use verity_primitives::{
    intents::{AttachedTx, ContractDeploymentParams, Intent, VerifiableIntent},
    resolution::ResolvedLeg,
    transaction::DeploymentTransactionInfo,
    PrimitivesError, Status,
};

use super::{IntentResolver, IntentService, IntentView};
use crate::error::{Result, ServerError};

/// Resolution of a deployment intent.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentResolution {
    pub leg: ResolvedLeg,
    /// Creation transaction of an imported contract.
    pub deployment_transaction: Option<DeploymentTransactionInfo>,
}

/// Contract deployments, addressable by project alias.
#[derive(Clone)]
pub struct DeploymentService {
    intents: IntentService<ContractDeploymentParams>,
}

impl DeploymentService {
    pub fn new(intents: IntentService<ContractDeploymentParams>) -> Self {
        Self { intents }
    }

    /// Aliases are unique per project.
    pub async fn create(
        &self,
        intent: Intent<ContractDeploymentParams>,
    ) -> Result<Intent<ContractDeploymentParams>> {
        let existing = self
            .intents
            .store()
            .get_by_alias(intent.project_id, &intent.params.alias)
            .await?;
        if existing.is_some() {
            return Err(PrimitivesError::InvalidParams(format!(
                "alias {} is already in use",
                intent.params.alias
            ))
            .into());
        }
        self.intents.create(intent).await
    }

    pub async fn get_by_alias(
        &self,
        project_id: Uuid,
        alias: &str,
    ) -> Result<IntentView<ContractDeploymentParams, DeploymentResolution>> {
        let intent = self
            .intents
            .store()
            .get_by_alias(project_id, alias)
            .await?
            .ok_or_else(|| ServerError::AliasNotFound(alias.to_string()))?;
        self.resolve(intent).await
    }

    /// With `deployed_only` set, only successfully deployed contracts are returned.
    pub async fn list(
        &self,
        project_id: Uuid,
        deployed_only: bool,
    ) -> Result<Vec<IntentView<ContractDeploymentParams, DeploymentResolution>>> {
        let views = self.list_by_project(project_id).await?;
        Ok(views
            .into_iter()
            .filter(|view| !deployed_only || view.status.is_success())
            .collect())
    }

    pub async fn attach_tx(
        &self,
        project_id: Uuid,
        id: Uuid,
        tx: AttachedTx,
    ) -> Result<IntentView<ContractDeploymentParams, DeploymentResolution>> {
        let intent = self.intents.load_owned(project_id, id).await?;
        if intent.is_imported() || !self.intents.store().set_tx_info(id, tx).await? {
            return Err(ServerError::CannotAttachTxInfo(id));
        }
        tracing::info!(intent_id = %id, tx_hash = %tx.hash, "deployment transaction attached");
        self.get(id).await
    }

    async fn resolve_imported(
        &self,
        intent: Intent<ContractDeploymentParams>,
    ) -> Result<IntentView<ContractDeploymentParams, DeploymentResolution>> {
        let expected = intent.expected_transaction(self.intents.encoder())?;
        let deployment_transaction = match intent.contract_address() {
            Some(contract) => {
                let chain = self
                    .intents
                    .chain_spec(intent.project_id, intent.chain_id)
                    .await?;
                self.intents
                    .chain_reader()
                    .find_contract_deployment_transaction(&chain, contract)
                    .await?
            }
            None => None,
        };

        let leg = ResolvedLeg {
            status: Status::Success,
            expected,
            tx_hash: deployment_transaction.as_ref().map(|tx| tx.hash),
            transaction_info: None,
        };
        Ok(IntentView::new(
            intent,
            Status::Success,
            DeploymentResolution {
                leg,
                deployment_transaction,
            },
        ))
    }
}

#[async_trait]
impl IntentResolver for DeploymentService {
    type Params = ContractDeploymentParams;
    type Resolution = DeploymentResolution;

    fn intents(&self) -> &IntentService<ContractDeploymentParams> {
        &self.intents
    }

    /// Imported contracts are deployed by definition. Otherwise the deployed address
    /// reported by the chain is recorded before the transaction is checked.
    async fn resolve(
        &self,
        mut intent: Intent<ContractDeploymentParams>,
    ) -> Result<IntentView<ContractDeploymentParams, DeploymentResolution>> {
        if intent.is_imported() {
            return self.resolve_imported(intent).await;
        }

        let attached = intent.attached_tx().copied();
        let observed = match attached {
            Some(_) => {
                let chain = self
                    .intents
                    .chain_spec(intent.project_id, intent.chain_id)
                    .await?;
                self.intents
                    .observe(&chain, attached.as_ref(), &intent.event_filters())
                    .await?
            }
            None => None,
        };

        if let Some(deployed) = observed
            .as_ref()
            .filter(|tx| tx.success)
            .and_then(|tx| tx.deployed_contract_address)
        {
            if intent.slots.deployed_contract_address.is_none() {
                if self
                    .intents
                    .store()
                    .set_contract_address(intent.id, deployed)
                    .await?
                {
                    tracing::info!(
                        intent_id = %intent.id,
                        contract = %deployed,
                        "deployed contract address recorded"
                    );
                }
                intent.slots.deployed_contract_address = Some(deployed);
            }
        }

        let expected = intent.expected_transaction(self.intents.encoder())?;
        let leg = ResolvedLeg::resolve(expected, attached.map(|tx| tx.hash), observed);
        Ok(IntentView::new(
            intent,
            leg.status,
            DeploymentResolution {
                leg,
                deployment_transaction: None,
            },
        ))
    }
}
