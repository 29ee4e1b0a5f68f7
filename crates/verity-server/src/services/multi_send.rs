use async_trait::async_trait;
use uuid::Uuid;
use verity_primitives::{
    intents::{AssetMultiSendParams, AttachedTx, Intent},
    resolution::{resolve_multi_leg, LegInput, MultiLegOutcome},
};

use super::{IntentResolver, IntentService, IntentView};
use crate::error::{Result, ServerError};

/// Approve → disperse flows. Each leg is observed and resolved on its own.
#[derive(Clone)]
pub struct MultiSendService {
    intents: IntentService<AssetMultiSendParams>,
}

impl MultiSendService {
    pub fn new(intents: IntentService<AssetMultiSendParams>) -> Self {
        Self { intents }
    }

    pub async fn attach_approve_tx(
        &self,
        project_id: Uuid,
        id: Uuid,
        tx: AttachedTx,
    ) -> Result<IntentView<AssetMultiSendParams, MultiLegOutcome>> {
        let intent = self.intents.load_owned(project_id, id).await?;
        if intent.is_native() || !self.intents.store().set_approve_tx_info(id, tx).await? {
            return Err(ServerError::CannotAttachTxInfo(id));
        }
        tracing::info!(intent_id = %id, tx_hash = %tx.hash, "approve transaction attached");
        self.get(id).await
    }

    pub async fn attach_disperse_tx(
        &self,
        project_id: Uuid,
        id: Uuid,
        tx: AttachedTx,
    ) -> Result<IntentView<AssetMultiSendParams, MultiLegOutcome>> {
        self.intents.load_owned(project_id, id).await?;
        if !self.intents.store().set_disperse_tx_info(id, tx).await? {
            return Err(ServerError::CannotAttachTxInfo(id));
        }
        tracing::info!(intent_id = %id, tx_hash = %tx.hash, "disperse transaction attached");
        self.get(id).await
    }
}

#[async_trait]
impl IntentResolver for MultiSendService {
    type Params = AssetMultiSendParams;
    type Resolution = MultiLegOutcome;

    fn intents(&self) -> &IntentService<AssetMultiSendParams> {
        &self.intents
    }

    async fn resolve(
        &self,
        intent: Intent<AssetMultiSendParams>,
    ) -> Result<IntentView<AssetMultiSendParams, MultiLegOutcome>> {
        let encoder = self.intents.encoder();
        let expected_approve = intent.expected_approve(encoder)?;
        let expected_disperse = intent.expected_disperse(encoder)?;
        let approve_tx = intent.slots.approve_tx;
        let disperse_tx = intent.slots.disperse_tx;

        let chain = match (approve_tx, disperse_tx) {
            (None, None) => None,
            _ => Some(
                self.intents
                    .chain_spec(intent.project_id, intent.chain_id)
                    .await?,
            ),
        };

        let approve = match (expected_approve, &chain) {
            (Some(expected), Some(chain)) => {
                let observed = self
                    .intents
                    .observe(chain, approve_tx.as_ref(), &intent.approve_event_filters())
                    .await?;
                Some(LegInput::new(expected, approve_tx.map(|tx| tx.hash), observed))
            }
            (Some(expected), None) => Some(LegInput::new(expected, None, None)),
            (None, _) => None,
        };

        let disperse_observed = match &chain {
            Some(chain) => {
                self.intents
                    .observe(
                        chain,
                        disperse_tx.as_ref(),
                        &intent.disperse_event_filters(),
                    )
                    .await?
            }
            None => None,
        };
        let disperse = LegInput::new(
            expected_disperse,
            disperse_tx.map(|tx| tx.hash),
            disperse_observed,
        );

        let outcome = resolve_multi_leg(approve, disperse);
        let status = outcome.status();
        tracing::debug!(intent_id = %intent.id, %status, "multi send resolved");
        Ok(IntentView::new(intent, status, outcome))
    }
}
