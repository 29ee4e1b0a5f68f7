use color_eyre::{eyre::Context, Result};
use dotenv::dotenv;
use std::{env, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use verity_primitives::{
    codec::AbiFunctionEncoder,
    intents::{
        AssetSendParams, ContractArbitraryCallParams, ContractFunctionCallParams, Erc20LockParams,
        IntentKind, IntentParams,
    },
    signature::EthereumSignatureChecker,
};
use verity_server::{
    chain::AlloyChainReader,
    config::Config,
    postgres::{Db, PgIntentStore, PgProjectStore},
    services::{
        AuthorizationService, BalanceService, DeploymentService, IntentResolver, IntentService,
        MultiSendService, TransactionService,
    },
    state::BaseState,
};

/// Resolves a single intent and prints its view as JSON.
///
/// Reads `INTENT_KIND`, `INTENT_ID` and `PROJECT_ID` from the environment.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let config = Config::from_file("config.json").context("Failed to load config")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_max_level(config.log_level()?)
        .init();

    let kind: IntentKind = env::var("INTENT_KIND")
        .context("INTENT_KIND not set")?
        .parse()?;
    let id: Uuid = env::var("INTENT_ID")
        .context("INTENT_ID not set")?
        .parse()
        .context("INTENT_ID is not a uuid")?;
    let project_id: Uuid = env::var("PROJECT_ID")
        .context("PROJECT_ID not set")?
        .parse()
        .context("PROJECT_ID is not a uuid")?;

    let db = Db::new(config.db_pool_size)
        .await
        .context("Failed to connect to postgres")?;
    db.migrate().await?;

    let chain_reader = AlloyChainReader::new(config.rpc_urls()?, config.chain_read_timeout());
    let base = BaseState::new(
        Arc::new(chain_reader),
        Arc::new(PgProjectStore::new(db.clone())),
        Arc::new(AbiFunctionEncoder::new()),
        Arc::new(EthereumSignatureChecker::new()),
    );

    info!(%kind, intent_id = %id, "resolving intent");
    let view = match kind {
        IntentKind::AssetSend => {
            let service = TransactionService::new(intents::<AssetSendParams>(&base, &db));
            render(&service, project_id, id).await?
        }
        IntentKind::Erc20Lock => {
            let service = TransactionService::new(intents::<Erc20LockParams>(&base, &db));
            render(&service, project_id, id).await?
        }
        IntentKind::ContractFunctionCall => {
            let service =
                TransactionService::new(intents::<ContractFunctionCallParams>(&base, &db));
            render(&service, project_id, id).await?
        }
        IntentKind::ContractArbitraryCall => {
            let service =
                TransactionService::new(intents::<ContractArbitraryCallParams>(&base, &db));
            render(&service, project_id, id).await?
        }
        IntentKind::AssetMultiSend => {
            render(&MultiSendService::new(intents(&base, &db)), project_id, id).await?
        }
        IntentKind::ContractDeployment => {
            render(&DeploymentService::new(intents(&base, &db)), project_id, id).await?
        }
        IntentKind::AssetBalance => {
            render(&BalanceService::new(intents(&base, &db)), project_id, id).await?
        }
        // One-shot authorizations are consumed by a successful check.
        IntentKind::Authorization => {
            let service = AuthorizationService::new(intents(&base, &db));
            let view = service.resolve_and_expire_if_done(project_id, id).await?;
            serde_json::to_string_pretty(&view)?
        }
    };

    println!("{view}");
    Ok(())
}

fn intents<P: IntentParams>(base: &BaseState, db: &Db) -> IntentService<P> {
    IntentService::new(base.clone(), Arc::new(PgIntentStore::<P>::new(db.clone())))
}

async fn render<R: IntentResolver>(resolver: &R, project_id: Uuid, id: Uuid) -> Result<String> {
    let view = resolver.get_owned(project_id, id).await?;
    Ok(serde_json::to_string_pretty(&view)?)
}
