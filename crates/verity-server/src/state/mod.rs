use alloy::primitives::B256;
use std::sync::Arc;
use uuid::Uuid;
use verity_primitives::{
    codec::FunctionEncoder,
    intents::AttachedTx,
    signature::SignatureChecker,
    transaction::{ChainSpec, TransactionInfo},
};

use crate::chain::ChainReader;
use crate::error::Result;
use crate::store::ProjectStore;

// Collaborators shared by every intent service
/// Collaborators shared by every service.
#[derive(Clone)]
pub struct BaseState {
    chain_reader: Arc<dyn ChainReader>,
    projects: Arc<dyn ProjectStore>,
    encoder: Arc<dyn FunctionEncoder>,
    signature_checker: Arc<dyn SignatureChecker>,
}

impl BaseState {
    pub fn new(
        chain_reader: Arc<dyn ChainReader>,
        projects: Arc<dyn ProjectStore>,
        encoder: Arc<dyn FunctionEncoder>,
        signature_checker: Arc<dyn SignatureChecker>,
    ) -> Self {
        Self {
            chain_reader,
            projects,
            encoder,
            signature_checker,
        }
    }

    pub fn chain_reader(&self) -> &dyn ChainReader {
        self.chain_reader.as_ref()
    }

    pub fn projects(&self) -> &dyn ProjectStore {
        self.projects.as_ref()
    }

    pub fn encoder(&self) -> &dyn FunctionEncoder {
        self.encoder.as_ref()
    }

    pub fn signature_checker(&self) -> &dyn SignatureChecker {
        self.signature_checker.as_ref()
    }

    /// Chain to read for an intent, honouring the project's custom RPC endpoint.
    pub async fn chain_spec(&self, project_id: Uuid, chain_id: u64) -> Result<ChainSpec> {
        let custom_rpc_url = self
            .projects
            .get_by_id(project_id)
            .await?
            .and_then(|project| project.custom_rpc_url);
        Ok(ChainSpec::new(chain_id, custom_rpc_url))
    }

    /// Observed transaction for an attached hash, `None` when nothing is attached yet.
    pub async fn observe(
        &self,
        chain: &ChainSpec,
        attached: Option<&AttachedTx>,
        event_filters: &[B256],
    ) -> Result<Option<TransactionInfo>> {
        match attached {
            Some(tx) => {
                self.chain_reader
                    .fetch_transaction_info(chain, tx.hash, event_filters)
                    .await
            }
            None => Ok(None),
        }
    }
}
