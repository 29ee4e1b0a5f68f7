use crate::error::{Result, ServerError};
use crate::store::{IntentStore, Project, ProjectStore};
use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::{Manager, Pool};
use std::marker::PhantomData;
use tokio_postgres::{types::ToSql, Config, NoTls, Row};
use url::Url;
use uuid::Uuid;
use verity_primitives::intents::{AttachedTx, Intent, IntentParams, IntentSlots, SignedBy};

pub const CREATE_TABLES: &str = "
    CREATE TABLE IF NOT EXISTS projects (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        custom_rpc_url TEXT
    );
    CREATE TABLE IF NOT EXISTS intents (
        id UUID PRIMARY KEY,
        project_id UUID NOT NULL REFERENCES projects(id),
        kind TEXT NOT NULL,
        chain_id BIGINT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        redirect_url TEXT,
        arbitrary_data JSONB,
        screen_config JSONB NOT NULL,
        params JSONB NOT NULL,
        sender BYTEA,
        recipients BYTEA[] NOT NULL DEFAULT '{}',
        alias TEXT,
        tx_hash BYTEA,
        tx_caller BYTEA,
        approve_tx_hash BYTEA,
        approve_tx_caller BYTEA,
        disperse_tx_hash BYTEA,
        disperse_tx_caller BYTEA,
        signed_wallet BYTEA,
        signature TEXT,
        deployed_contract_address BYTEA,
        UNIQUE (project_id, kind, alias)
    );
";

const INTENT_COLUMNS: &str = "id, project_id, kind, chain_id, created_at, redirect_url, arbitrary_data, \
    screen_config, params, tx_hash, tx_caller, approve_tx_hash, approve_tx_caller, disperse_tx_hash, \
    disperse_tx_caller, signed_wallet, signature, deployed_contract_address";

pub const INSERT_INTENT: &str = "
    INSERT INTO intents (id, project_id, kind, chain_id, created_at, redirect_url, arbitrary_data,
        screen_config, params, sender, recipients, alias, deployed_contract_address)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13);
";

pub const SET_TX: &str =
    "UPDATE intents SET tx_hash = $2, tx_caller = $3 WHERE id = $1 AND tx_hash IS NULL;";
pub const SET_APPROVE_TX: &str = "UPDATE intents SET approve_tx_hash = $2, approve_tx_caller = $3 \
    WHERE id = $1 AND approve_tx_hash IS NULL;";
pub const SET_DISPERSE_TX: &str = "UPDATE intents SET disperse_tx_hash = $2, disperse_tx_caller = $3 \
    WHERE id = $1 AND disperse_tx_hash IS NULL;";
pub const SET_SIGNED_MESSAGE: &str = "UPDATE intents SET signed_wallet = $2, signature = $3 \
    WHERE id = $1 AND signature IS NULL;";
pub const SET_CONTRACT_ADDRESS: &str = "UPDATE intents SET deployed_contract_address = $2 \
    WHERE id = $1 AND deployed_contract_address IS NULL;";
pub const DELETE_INTENT: &str = "DELETE FROM intents WHERE id = $1;";
pub const GET_PROJECT_BY_ID: &str = "SELECT id, name, custom_rpc_url FROM projects WHERE id = $1;";

/// Pooled postgres connections shared by the stores.
#[derive(Clone)]
pub struct Db {
    pub pool: Pool,
}

impl Db {
    /// Connects using `POSTGRES_*` environment variables.
    pub async fn new(pool_size: usize) -> Result<Self> {
        let mut config: Config = Config::new();
        config.host(std::env::var("POSTGRES_URL").unwrap_or("localhost".to_string()));
        let postgres_port = std::env::var("POSTGRES_PORT").unwrap_or("5432".to_string());
        config.port(postgres_port.parse::<u16>().unwrap_or(5432));
        config.user(std::env::var("POSTGRES_USER").unwrap_or("verity".to_string()));
        if let Ok(password) = std::env::var("POSTGRES_PASSWORD") {
            config.password(password);
        }
        config.dbname(std::env::var("POSTGRES_DB").unwrap_or("verity-db".to_string()));

        let manager = Manager::new(config, NoTls);
        let pool = Pool::builder(manager)
            .max_size(pool_size)
            .build()
            .map_err(|e| ServerError::DatabaseError(e.to_string()))?;
        {
            let client = pool
                .get()
                .await
                .map_err(|e| ServerError::DatabaseError(e.to_string()))?;
            client
                .simple_query("SELECT 1")
                .await
                .map_err(|e| ServerError::DatabaseError(e.to_string()))?;
        }
        Ok(Db { pool })
    }

    /// Creates the tables if they do not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        let conn = self
            .pool
            .get()
            .await
            .map_err(|e| ServerError::DatabaseError(e.to_string()))?;
        conn.batch_execute(CREATE_TABLES)
            .await
            .map_err(|e| ServerError::DatabaseError(e.to_string()))
    }

    async fn query(&self, stmt: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Row>> {
        let conn = self
            .pool
            .get()
            .await
            .map_err(|e| ServerError::DatabaseError(e.to_string()))?;
        let prepared_stmt = conn
            .prepare(stmt)
            .await
            .map_err(|e| ServerError::DatabaseError(e.to_string()))?;
        conn.query(&prepared_stmt, params)
            .await
            .map_err(|e| ServerError::DatabaseError(e.to_string()))
    }

    async fn execute(&self, stmt: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        let conn = self
            .pool
            .get()
            .await
            .map_err(|e| ServerError::DatabaseError(e.to_string()))?;
        let prepared_stmt = conn
            .prepare(stmt)
            .await
            .map_err(|e| ServerError::DatabaseError(e.to_string()))?;
        conn.execute(&prepared_stmt, params)
            .await
            .map_err(|e| ServerError::DatabaseError(e.to_string()))
    }
}

/// Row of the `intents` table with the kind-specific parameters still encoded.
#[derive(Debug)]
pub struct StoredIntent {
    pub id: Uuid,
    pub project_id: Uuid,
    pub kind: String,
    pub chain_id: i64,
    pub created_at: DateTime<Utc>,
    pub redirect_url: Option<String>,
    pub arbitrary_data: Option<serde_json::Value>,
    pub screen_config: serde_json::Value,
    pub params: serde_json::Value,
    pub slots: IntentSlots,
}

impl TryFrom<Row> for StoredIntent {
    type Error = ServerError;
    fn try_from(row: Row) -> Result<Self> {
        let slots = IntentSlots {
            tx: attached_tx(&row, "tx_hash", "tx_caller")?,
            approve_tx: attached_tx(&row, "approve_tx_hash", "approve_tx_caller")?,
            disperse_tx: attached_tx(&row, "disperse_tx_hash", "disperse_tx_caller")?,
            signed: match (
                optional_address(&row, "signed_wallet")?,
                row.get::<_, Option<String>>("signature"),
            ) {
                (Some(wallet), Some(signature)) => Some(SignedBy { wallet, signature }),
                _ => None,
            },
            deployed_contract_address: optional_address(&row, "deployed_contract_address")?,
        };

        Ok(StoredIntent {
            id: row.get("id"),
            project_id: row.get("project_id"),
            kind: row.get("kind"),
            chain_id: row.get("chain_id"),
            created_at: row.get("created_at"),
            redirect_url: row.get("redirect_url"),
            arbitrary_data: row.get("arbitrary_data"),
            screen_config: row.get("screen_config"),
            params: row.get("params"),
            slots,
        })
    }
}

impl StoredIntent {
    pub fn into_intent<P: IntentParams>(self) -> Result<Intent<P>> {
        if self.kind != P::KIND.as_str() {
            return Err(ServerError::SerializationError(format!(
                "intent {} is a {} intent, not {}",
                self.id,
                self.kind,
                P::KIND
            )));
        }
        Ok(Intent {
            id: self.id,
            project_id: self.project_id,
            chain_id: self.chain_id as u64,
            created_at: self.created_at,
            redirect_url: self.redirect_url,
            arbitrary_data: self.arbitrary_data,
            screen_config: serde_json::from_value(self.screen_config)
                .map_err(|e| ServerError::SerializationError(e.to_string()))?,
            params: serde_json::from_value(self.params)
                .map_err(|e| ServerError::SerializationError(e.to_string()))?,
            slots: self.slots,
        })
    }
}

fn optional_bytes<'a>(row: &'a Row, column: &str) -> Option<&'a [u8]> {
    row.get::<_, Option<&[u8]>>(column)
}

fn optional_address(row: &Row, column: &str) -> Result<Option<Address>> {
    optional_bytes(row, column)
        .map(|bytes| {
            if bytes.len() == 20 {
                Ok(Address::from_slice(bytes))
            } else {
                Err(ServerError::SerializationError(format!(
                    "column {column} holds {} bytes, expected an address",
                    bytes.len()
                )))
            }
        })
        .transpose()
}

fn attached_tx(row: &Row, hash_column: &str, caller_column: &str) -> Result<Option<AttachedTx>> {
    let Some(hash) = optional_bytes(row, hash_column) else {
        return Ok(None);
    };
    if hash.len() != 32 {
        return Err(ServerError::SerializationError(format!(
            "column {hash_column} holds {} bytes, expected a hash",
            hash.len()
        )));
    }
    let caller = optional_address(row, caller_column)?.unwrap_or(Address::ZERO);
    Ok(Some(AttachedTx {
        hash: B256::from_slice(hash),
        caller,
    }))
}

/// Single `intents` table, filtered by kind.
pub struct PgIntentStore<P> {
    db: Db,
    phantom: PhantomData<P>,
}

impl<P> Clone for PgIntentStore<P> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            phantom: PhantomData,
        }
    }
}

impl<P: IntentParams> PgIntentStore<P> {
    pub fn new(db: Db) -> Self {
        Self {
            db,
            phantom: PhantomData,
        }
    }

    async fn select(&self, filter: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Intent<P>>> {
        let stmt = format!(
            "SELECT {INTENT_COLUMNS} FROM intents WHERE kind = '{}' AND {filter} ORDER BY created_at;",
            P::KIND.as_str()
        );
        self.db
            .query(&stmt, params)
            .await?
            .into_iter()
            .map(|row| StoredIntent::try_from(row)?.into_intent())
            .collect()
    }

    async fn set_tx_slot(&self, stmt: &str, id: Uuid, tx: AttachedTx) -> Result<bool> {
        let updated = self
            .db
            .execute(stmt, &[&id, &tx.hash.as_slice(), &tx.caller.as_slice()])
            .await?;
        Ok(updated == 1)
    }
}

#[async_trait]
impl<P: IntentParams> IntentStore<P> for PgIntentStore<P> {
    async fn store(&self, intent: &Intent<P>) -> Result<()> {
        let screen_config = serde_json::to_value(&intent.screen_config)
            .map_err(|e| ServerError::SerializationError(e.to_string()))?;
        let params = serde_json::to_value(&intent.params)
            .map_err(|e| ServerError::SerializationError(e.to_string()))?;
        let sender = intent.params.sender().map(|sender| sender.to_vec());
        let recipients = intent
            .params
            .recipients()
            .iter()
            .map(|recipient| recipient.to_vec())
            .collect::<Vec<_>>();
        let alias = intent.params.alias();
        let deployed_contract_address = intent
            .slots
            .deployed_contract_address
            .map(|address| address.to_vec());

        self.db
            .execute(
                INSERT_INTENT,
                &[
                    &intent.id,
                    &intent.project_id,
                    &P::KIND.as_str(),
                    &(intent.chain_id as i64),
                    &intent.created_at,
                    &intent.redirect_url,
                    &intent.arbitrary_data,
                    &screen_config,
                    &params,
                    &sender,
                    &recipients,
                    &alias,
                    &deployed_contract_address,
                ],
            )
            .await?;
        tracing::info!(intent_id = %intent.id, kind = %P::KIND, "intent stored");
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Intent<P>>> {
        Ok(self.select("id = $1", &[&id]).await?.into_iter().next())
    }

    async fn get_all_by_project_id(&self, project_id: Uuid) -> Result<Vec<Intent<P>>> {
        self.select("project_id = $1", &[&project_id]).await
    }

    async fn get_by_sender(&self, project_id: Uuid, sender: Address) -> Result<Vec<Intent<P>>> {
        self.select(
            "project_id = $1 AND sender = $2",
            &[&project_id, &sender.as_slice()],
        )
        .await
    }

    async fn get_by_recipient(
        &self,
        project_id: Uuid,
        recipient: Address,
    ) -> Result<Vec<Intent<P>>> {
        self.select(
            "project_id = $1 AND $2 = ANY(recipients)",
            &[&project_id, &recipient.as_slice()],
        )
        .await
    }

    async fn get_by_alias(&self, project_id: Uuid, alias: &str) -> Result<Option<Intent<P>>> {
        Ok(self
            .select("project_id = $1 AND alias = $2", &[&project_id, &alias])
            .await?
            .into_iter()
            .next())
    }

    async fn set_tx_info(&self, id: Uuid, tx: AttachedTx) -> Result<bool> {
        self.set_tx_slot(SET_TX, id, tx).await
    }

    async fn set_approve_tx_info(&self, id: Uuid, tx: AttachedTx) -> Result<bool> {
        self.set_tx_slot(SET_APPROVE_TX, id, tx).await
    }

    async fn set_disperse_tx_info(&self, id: Uuid, tx: AttachedTx) -> Result<bool> {
        self.set_tx_slot(SET_DISPERSE_TX, id, tx).await
    }

    async fn set_signed_message(&self, id: Uuid, signed: SignedBy) -> Result<bool> {
        let updated = self
            .db
            .execute(
                SET_SIGNED_MESSAGE,
                &[&id, &signed.wallet.as_slice(), &signed.signature],
            )
            .await?;
        Ok(updated == 1)
    }

    async fn set_contract_address(&self, id: Uuid, address: Address) -> Result<bool> {
        let updated = self
            .db
            .execute(SET_CONTRACT_ADDRESS, &[&id, &address.as_slice()])
            .await?;
        Ok(updated == 1)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let deleted = self.db.execute(DELETE_INTENT, &[&id]).await?;
        if deleted == 1 {
            tracing::info!(intent_id = %id, "intent deleted");
        }
        Ok(deleted == 1)
    }
}

/// Project lookups backed by postgres.
#[derive(Clone)]
pub struct PgProjectStore {
    db: Db,
}

impl PgProjectStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

impl TryFrom<Row> for Project {
    type Error = ServerError;
    fn try_from(row: Row) -> Result<Self> {
        let custom_rpc_url = row
            .get::<_, Option<String>>("custom_rpc_url")
            .map(|url| Url::parse(&url))
            .transpose()
            .map_err(|e| ServerError::SerializationError(e.to_string()))?;
        Ok(Project {
            id: row.get("id"),
            name: row.get("name"),
            custom_rpc_url,
        })
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn get_by_id(&self, project_id: Uuid) -> Result<Option<Project>> {
        self.db
            .query(GET_PROJECT_BY_ID, &[&project_id])
            .await?
            .into_iter()
            .next()
            .map(Project::try_from)
            .transpose()
    }
}
