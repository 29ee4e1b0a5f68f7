use async_trait::async_trait;
use uuid::Uuid;
use verity_primitives::{
    intents::{AttachedTx, Intent, IntentParams, VerifiableIntent},
    resolution::ResolvedLeg,
};

use super::{IntentResolver, IntentService, IntentView};
use crate::error::{Result, ServerError};

/// Intents settled by a single transaction: asset sends, ERC20 locks, function and
/// arbitrary contract calls.
pub struct TransactionService<P> {
    intents: IntentService<P>,
}

impl<P> Clone for TransactionService<P> {
    fn clone(&self) -> Self {
        Self {
            intents: self.intents.clone(),
        }
    }
}

impl<P> TransactionService<P>
where
    P: IntentParams,
    Intent<P>: VerifiableIntent,
{
    pub fn new(intents: IntentService<P>) -> Self {
        Self { intents }
    }

    /// Records the wallet's transaction hash. A hash can only be attached once.
    pub async fn attach_tx(
        &self,
        project_id: Uuid,
        id: Uuid,
        tx: AttachedTx,
    ) -> Result<IntentView<P, ResolvedLeg>> {
        self.intents.load_owned(project_id, id).await?;
        if !self.intents.store().set_tx_info(id, tx).await? {
            return Err(ServerError::CannotAttachTxInfo(id));
        }
        tracing::info!(intent_id = %id, tx_hash = %tx.hash, "transaction attached");
        self.get(id).await
    }
}

#[async_trait]
impl<P> IntentResolver for TransactionService<P>
where
    P: IntentParams,
    Intent<P>: VerifiableIntent,
{
    type Params = P;
    type Resolution = ResolvedLeg;

    fn intents(&self) -> &IntentService<P> {
        &self.intents
    }

    async fn resolve(&self, intent: Intent<P>) -> Result<IntentView<P, ResolvedLeg>> {
        let expected = intent.expected_transaction(self.intents.encoder())?;
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

        let leg = ResolvedLeg::resolve(expected, attached.map(|tx| tx.hash), observed);
        tracing::debug!(intent_id = %intent.id, status = %leg.status, "intent resolved");
        Ok(IntentView::new(intent, leg.status, leg))
    }
}
