//! Intents: what a wallet was asked to do, recorded before it acts.
//!
//! Every kind shares the [`Intent`] envelope and supplies its own parameters.

use alloy::primitives::{Address, B256};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt::{self, Debug};
use uuid::Uuid;

use crate::{codec::FunctionEncoder, resolution::ExpectedTransaction, status::AddressMatch, Result};

pub mod arbitrary_call;
pub mod asset_send;
pub mod authorization;
pub mod balance;
pub mod deployment;
pub mod function_call;
pub mod lock;
pub mod multi_send;

pub use arbitrary_call::ContractArbitraryCallParams;
pub use asset_send::AssetSendParams;
pub use authorization::AuthorizationParams;
pub use balance::AssetBalanceParams;
pub use deployment::ContractDeploymentParams;
pub use function_call::ContractFunctionCallParams;
pub use lock::Erc20LockParams;
pub use multi_send::AssetMultiSendParams;

/// Placeholder in redirect URLs replaced with the intent id.
pub const REDIRECT_ID_PLACEHOLDER: &str = "${id}";

/// The eight intent kinds, one storage tag each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    AssetSend,
    AssetMultiSend,
    Erc20Lock,
    ContractDeployment,
    ContractFunctionCall,
    ContractArbitraryCall,
    Authorization,
    AssetBalance,
}

impl IntentKind {
    pub const ALL: [IntentKind; 8] = [
        IntentKind::AssetSend,
        IntentKind::AssetMultiSend,
        IntentKind::Erc20Lock,
        IntentKind::ContractDeployment,
        IntentKind::ContractFunctionCall,
        IntentKind::ContractArbitraryCall,
        IntentKind::Authorization,
        IntentKind::AssetBalance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::AssetSend => "asset_send",
            IntentKind::AssetMultiSend => "asset_multi_send",
            IntentKind::Erc20Lock => "erc20_lock",
            IntentKind::ContractDeployment => "contract_deployment",
            IntentKind::ContractFunctionCall => "contract_function_call",
            IntentKind::ContractArbitraryCall => "contract_arbitrary_call",
            IntentKind::Authorization => "authorization",
            IntentKind::AssetBalance => "asset_balance",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IntentKind {
    type Err = crate::PrimitivesError;

    fn from_str(s: &str) -> Result<Self> {
        IntentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                crate::PrimitivesError::InvalidParams(format!("unknown intent kind: {s}"))
            })
    }
}

/// Messages shown to the user around the wallet action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenConfig {
    pub before_action_message: Option<String>,
    pub after_action_message: Option<String>,
}

/// A transaction hash attached by the client after the wallet broadcast it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedTx {
    pub hash: B256,
    /// Wallet that reported the hash.
    pub caller: Address,
}

/// A signature attached by the client for a signed-message intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBy {
    pub wallet: Address,
    pub signature: String,
}

/// Write-once slots filled in after the intent was created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentSlots {
    pub tx: Option<AttachedTx>,
    pub approve_tx: Option<AttachedTx>,
    pub disperse_tx: Option<AttachedTx>,
    pub signed: Option<SignedBy>,
    pub deployed_contract_address: Option<Address>,
}

/// Kind-specific parameters of an intent.
pub trait IntentParams:
    Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Sync + 'static
{
    const KIND: IntentKind;

    /// Pinned sender, caller, deployer or wallet, used for lookups by sender.
    fn sender(&self) -> Option<&Address>;

    /// Addresses receiving assets, used for lookups by recipient.
    fn recipients(&self) -> Vec<Address> {
        Vec::new()
    }

    /// Project-unique alias, for kinds that have one.
    fn alias(&self) -> Option<&str> {
        None
    }

    /// Checks run before the intent is stored.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// A stored intent: shared envelope, kind parameters and the attach-once slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "P: IntentParams")]
pub struct Intent<P> {
    pub id: Uuid,
    pub project_id: Uuid,
    pub chain_id: u64,
    pub created_at: DateTime<Utc>,
    pub redirect_url: Option<String>,
    pub arbitrary_data: Option<serde_json::Value>,
    #[serde(default)]
    pub screen_config: ScreenConfig,
    pub params: P,
    #[serde(default)]
    pub slots: IntentSlots,
}

impl<P: IntentParams> Intent<P> {
    pub fn new(project_id: Uuid, chain_id: u64, params: P) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            chain_id,
            created_at: Utc::now(),
            redirect_url: None,
            arbitrary_data: None,
            screen_config: ScreenConfig::default(),
            params,
            slots: IntentSlots::default(),
        }
    }

    pub fn with_redirect_url(mut self, redirect_url: impl Into<String>) -> Self {
        self.redirect_url = Some(redirect_url.into());
        self
    }

    pub fn with_arbitrary_data(mut self, arbitrary_data: serde_json::Value) -> Self {
        self.arbitrary_data = Some(arbitrary_data);
        self
    }

    pub fn with_screen_config(mut self, screen_config: ScreenConfig) -> Self {
        self.screen_config = screen_config;
        self
    }

    /// Kind tag derived from the parameter type.
    pub fn kind(&self) -> IntentKind {
        P::KIND
    }

    /// Redirect URL with the intent id substituted in.
    pub fn rendered_redirect_url(&self) -> Option<String> {
        self.redirect_url
            .as_ref()
            .map(|url| url.replace(REDIRECT_ID_PLACEHOLDER, &self.id.to_string()))
    }
}

/// Intents settled by a single on-chain transaction.
pub trait VerifiableIntent {
    /// Recomputes the expected transaction from the intent's current parameters.
    fn expected_transaction(&self, encoder: &dyn FunctionEncoder) -> Result<ExpectedTransaction>;

    fn attached_tx(&self) -> Option<&AttachedTx>;

    /// Event signatures whose logs should be returned with the transaction.
    fn event_filters(&self) -> Vec<B256> {
        Vec::new()
    }
}

/// Intents settled by an off-chain signed message.
pub trait SignedMessageIntent {
    fn requested_wallet(&self) -> &AddressMatch;

    /// Message the wallet is asked to sign.
    fn challenge_message(&self) -> String;

    fn signed(&self) -> Option<&SignedBy>;
}

pub fn default_challenge_message(id: &Uuid) -> String {
    format!("Verification message ID to sign: {id}")
}
