use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;
use verity_primitives::{
    intents::{AuthorizationParams, Intent, SignedBy, SignedMessageIntent},
    resolution::{resolve_signed_message, should_expire},
};

use super::{IntentResolver, IntentService, IntentView};
use crate::error::{Result, ServerError};

/// Resolution payload of an authorization.
#[derive(Debug, Clone, Serialize)]
pub struct SignedMessageResolution {
    /// Challenge the wallet has to sign.
    pub message: String,
}

/// Wallet authorizations proven by a signed challenge message.
#[derive(Clone)]
pub struct AuthorizationService {
    intents: IntentService<AuthorizationParams>,
}

impl AuthorizationService {
    pub fn new(intents: IntentService<AuthorizationParams>) -> Self {
        Self { intents }
    }

    pub async fn attach_signed_message(
        &self,
        project_id: Uuid,
        id: Uuid,
        signed: SignedBy,
    ) -> Result<IntentView<AuthorizationParams, SignedMessageResolution>> {
        self.intents.load_owned(project_id, id).await?;
        let wallet = signed.wallet;
        if !self.intents.store().set_signed_message(id, signed).await? {
            return Err(ServerError::CannotAttachSignedMessage(id));
        }
        tracing::info!(intent_id = %id, %wallet, "signed message attached");
        self.get(id).await
    }

    /// Resolves and, on the first successful read of an intent that is not kept
    /// indefinitely, deletes it. Later reads report it as missing.
    pub async fn resolve_and_expire_if_done(
        &self,
        project_id: Uuid,
        id: Uuid,
    ) -> Result<IntentView<AuthorizationParams, SignedMessageResolution>> {
        let view = self.get_owned(project_id, id).await?;
        if should_expire(view.status, view.intent.params.store_indefinitely)
            && self.intents.store().delete(id).await?
        {
            tracing::info!(intent_id = %id, "authorization expired after successful verification");
        }
        Ok(view)
    }
}

#[async_trait]
impl IntentResolver for AuthorizationService {
    type Params = AuthorizationParams;
    type Resolution = SignedMessageResolution;

    fn intents(&self) -> &IntentService<AuthorizationParams> {
        &self.intents
    }

    async fn resolve(
        &self,
        intent: Intent<AuthorizationParams>,
    ) -> Result<IntentView<AuthorizationParams, SignedMessageResolution>> {
        let message = intent.challenge_message();
        let signed = intent.signed();
        let status = resolve_signed_message(
            intent.requested_wallet(),
            &message,
            signed.map(|signed| &signed.wallet),
            signed.map(|signed| signed.signature.as_str()),
            self.intents.signature_checker(),
        );
        Ok(IntentView::new(
            intent,
            status,
            SignedMessageResolution { message },
        ))
    }
}
