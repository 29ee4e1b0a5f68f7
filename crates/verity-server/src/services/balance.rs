use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;
use verity_primitives::{
    intents::{AssetBalanceParams, Intent, SignedBy, SignedMessageIntent},
    resolution::resolve_balance_proof,
    transaction::AccountBalance,
};

use super::{IntentResolver, IntentService, IntentView};
use crate::error::{Result, ServerError};

/// Signed-message verdict plus the wallet balance snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceResolution {
    pub message: String,
    /// Present whenever a wallet has signed, whatever the status.
    pub balance: Option<AccountBalance>,
}

/// Balance proofs: a signature plus a balance read at the requested block.
#[derive(Clone)]
pub struct BalanceService {
    intents: IntentService<AssetBalanceParams>,
}

impl BalanceService {
    pub fn new(intents: IntentService<AssetBalanceParams>) -> Self {
        Self { intents }
    }

    pub async fn attach_signed_message(
        &self,
        project_id: Uuid,
        id: Uuid,
        signed: SignedBy,
    ) -> Result<IntentView<AssetBalanceParams, BalanceResolution>> {
        self.intents.load_owned(project_id, id).await?;
        let wallet = signed.wallet;
        if !self.intents.store().set_signed_message(id, signed).await? {
            return Err(ServerError::CannotAttachSignedMessage(id));
        }
        tracing::info!(intent_id = %id, %wallet, "balance proof signature attached");
        self.get(id).await
    }
}

#[async_trait]
impl IntentResolver for BalanceService {
    type Params = AssetBalanceParams;
    type Resolution = BalanceResolution;

    fn intents(&self) -> &IntentService<AssetBalanceParams> {
        &self.intents
    }

    async fn resolve(
        &self,
        intent: Intent<AssetBalanceParams>,
    ) -> Result<IntentView<AssetBalanceParams, BalanceResolution>> {
        let message = intent.challenge_message();
        let signed = intent.signed();
        let wallet = signed.map(|signed| signed.wallet);

        let balance = match wallet {
            Some(wallet) => {
                let chain = self
                    .intents
                    .chain_spec(intent.project_id, intent.chain_id)
                    .await?;
                let reader = self.intents.chain_reader();
                let block = intent.params.block();
                let balance = match intent.params.token {
                    Some(token) => {
                        reader
                            .fetch_erc20_account_balance(&chain, token, wallet, block)
                            .await?
                    }
                    None => reader.fetch_account_balance(&chain, wallet, block).await?,
                };
                Some(balance)
            }
            None => None,
        };

        let outcome = resolve_balance_proof(
            intent.requested_wallet(),
            &message,
            wallet.as_ref(),
            signed.map(|signed| signed.signature.as_str()),
            self.intents.signature_checker(),
            balance,
        );
        Ok(IntentView::new(
            intent,
            outcome.status,
            BalanceResolution {
                message,
                balance: outcome.balance,
            },
        ))
    }
}
