//! SQLite-backed reference store.
//!
//! The embedded, file-backed deployment. Schema is bootstrapped on
//! connect; uniqueness lives in the schema (`name_norm` unique columns,
//! `UNIQUE(kind, name_norm)` on the pending queue) so racing writers
//! resolve inside the database.

use std::str::FromStr;

use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::{info, instrument};

use crate::models::{
    BankDetail, City, Party, PendingKind, PendingRequest, ProposalOutcome, Transport,
};
use crate::store::{normalize_name, ReferenceStore};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct PartyRow {
    name: String,
    gstin: String,
    place: String,
    fixed_place: bool,
}

#[derive(FromRow)]
struct TransportRow {
    name: String,
    gstin: String,
}

#[derive(FromRow)]
struct CityRow {
    city: String,
    state: String,
}

#[derive(FromRow)]
struct BankDetailRow {
    bank_name: String,
    account_number: String,
    ifsc: String,
}

#[derive(FromRow)]
struct PendingRow {
    kind: String,
    name: String,
    gstin: String,
    place: String,
}

impl From<PendingRow> for PendingRequest {
    fn from(row: PendingRow) -> Self {
        PendingRequest {
            kind: PendingKind::parse(&row.kind).unwrap_or(PendingKind::Party),
            name: row.name,
            gstin: row.gstin,
            place: row.place,
        }
    }
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS parties (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        name_norm TEXT NOT NULL UNIQUE,
        gstin TEXT NOT NULL DEFAULT '',
        place TEXT NOT NULL DEFAULT '',
        fixed_place INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS transports (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        name_norm TEXT NOT NULL UNIQUE,
        gstin TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS cities (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        city TEXT NOT NULL,
        state TEXT NOT NULL,
        UNIQUE(city, state)
    )",
    "CREATE TABLE IF NOT EXISTS bank_details (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        bank_name TEXT NOT NULL,
        account_number TEXT NOT NULL,
        ifsc TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS pending_requests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL,
        name TEXT NOT NULL,
        name_norm TEXT NOT NULL,
        gstin TEXT NOT NULL DEFAULT '',
        place TEXT NOT NULL DEFAULT '',
        UNIQUE(kind, name_norm)
    )",
];

impl SqliteStore {
    /// Open (creating if missing) the database at `url`, e.g.
    /// `sqlite:data.db` or `sqlite::memory:`, and bootstrap the schema.
    #[instrument(skip(url))]
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // An in-memory database exists per connection; a pool of one
        // keeps every query on the same database.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        info!(url = url, "SQLite store ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ReferenceStore for SqliteStore {
    #[instrument(skip(self, party), fields(name = %party.name))]
    async fn upsert_party(&self, party: Party) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO parties (name, name_norm, gstin, place, fixed_place)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(name_norm) DO UPDATE SET
                name = excluded.name,
                gstin = excluded.gstin,
                place = excluded.place,
                fixed_place = excluded.fixed_place
            "#,
        )
        .bind(&party.name)
        .bind(normalize_name(&party.name))
        .bind(&party.gstin)
        .bind(&party.place)
        .bind(party.fixed_place)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_party(&self, name: &str) -> Result<Option<Party>, AppError> {
        let row = sqlx::query_as::<_, PartyRow>(
            "SELECT name, gstin, place, fixed_place FROM parties WHERE name_norm = ?1",
        )
        .bind(normalize_name(name))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Party {
            name: r.name,
            gstin: r.gstin,
            place: r.place,
            fixed_place: r.fixed_place,
        }))
    }

    async fn party_names(&self) -> Result<Vec<String>, AppError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT name FROM parties ORDER BY name_norm",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    async fn parties(&self) -> Result<Vec<Party>, AppError> {
        let rows = sqlx::query_as::<_, PartyRow>(
            "SELECT name, gstin, place, fixed_place FROM parties ORDER BY name_norm",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| Party {
                name: r.name,
                gstin: r.gstin,
                place: r.place,
                fixed_place: r.fixed_place,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn delete_party(&self, name: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM parties WHERE name_norm = ?1")
            .bind(normalize_name(name))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, transport), fields(name = %transport.name))]
    async fn upsert_transport(&self, transport: Transport) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO transports (name, name_norm, gstin)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(name_norm) DO UPDATE SET
                name = excluded.name,
                gstin = excluded.gstin
            "#,
        )
        .bind(&transport.name)
        .bind(normalize_name(&transport.name))
        .bind(&transport.gstin)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_transport(&self, name: &str) -> Result<Option<Transport>, AppError> {
        let row = sqlx::query_as::<_, TransportRow>(
            "SELECT name, gstin FROM transports WHERE name_norm = ?1",
        )
        .bind(normalize_name(name))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Transport {
            name: r.name,
            gstin: r.gstin,
        }))
    }

    async fn transport_names(&self) -> Result<Vec<String>, AppError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT name FROM transports ORDER BY name_norm",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    async fn transports(&self) -> Result<Vec<Transport>, AppError> {
        let rows = sqlx::query_as::<_, TransportRow>(
            "SELECT name, gstin FROM transports ORDER BY name_norm",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| Transport {
                name: r.name,
                gstin: r.gstin,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn delete_transport(&self, name: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM transports WHERE name_norm = ?1")
            .bind(normalize_name(name))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn add_city(&self, city: &str, state: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO cities (city, state) VALUES (?1, ?2)
             ON CONFLICT(city, state) DO NOTHING",
        )
        .bind(city.trim())
        .bind(state.trim())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn cities(&self) -> Result<Vec<City>, AppError> {
        let rows = sqlx::query_as::<_, CityRow>("SELECT city, state FROM cities ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| City {
                city: r.city,
                state: r.state,
            })
            .collect())
    }

    #[instrument(skip(self, detail), fields(bank = %detail.bank_name))]
    async fn add_bank_detail(&self, detail: BankDetail) -> Result<(), AppError> {
        sqlx::query("INSERT INTO bank_details (bank_name, account_number, ifsc) VALUES (?1, ?2, ?3)")
            .bind(&detail.bank_name)
            .bind(&detail.account_number)
            .bind(&detail.ifsc)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn bank_details(&self) -> Result<Vec<BankDetail>, AppError> {
        let rows = sqlx::query_as::<_, BankDetailRow>(
            "SELECT bank_name, account_number, ifsc FROM bank_details ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| BankDetail {
                bank_name: r.bank_name,
                account_number: r.account_number,
                ifsc: r.ifsc,
            })
            .collect())
    }

    #[instrument(skip(self, request), fields(kind = request.kind.as_str(), name = %request.name))]
    async fn propose_pending(
        &self,
        request: PendingRequest,
    ) -> Result<ProposalOutcome, AppError> {
        let key = normalize_name(&request.name);

        let confirmed_table = match request.kind {
            PendingKind::Party => "parties",
            PendingKind::Transport => "transports",
        };
        let confirmed: Option<i64> = sqlx::query_scalar(&format!(
            "SELECT 1 FROM {} WHERE name_norm = ?1",
            confirmed_table
        ))
        .bind(&key)
        .fetch_optional(&self.pool)
        .await?;
        if confirmed.is_some() {
            return Ok(ProposalOutcome::AlreadyExists);
        }

        let inserted = sqlx::query(
            "INSERT INTO pending_requests (kind, name, name_norm, gstin, place)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(request.kind.as_str())
        .bind(&request.name)
        .bind(&key)
        .bind(&request.gstin)
        .bind(&request.place)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(ProposalOutcome::Created),
            Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
                Ok(ProposalOutcome::AlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn pending_requests(&self) -> Result<Vec<PendingRequest>, AppError> {
        let rows = sqlx::query_as::<_, PendingRow>(
            "SELECT kind, name, gstin, place FROM pending_requests ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PendingRequest::from).collect())
    }

    #[instrument(skip(self))]
    async fn approve_pending(&self, kind: PendingKind, name: &str) -> Result<bool, AppError> {
        let key = normalize_name(name);
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, PendingRow>(
            "SELECT kind, name, gstin, place FROM pending_requests
             WHERE kind = ?1 AND name_norm = ?2",
        )
        .bind(kind.as_str())
        .bind(&key)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(false);
        };

        match kind {
            PendingKind::Party => {
                sqlx::query(
                    r#"
                    INSERT INTO parties (name, name_norm, gstin, place, fixed_place)
                    VALUES (?1, ?2, ?3, ?4, 0)
                    ON CONFLICT(name_norm) DO UPDATE SET
                        name = excluded.name,
                        gstin = excluded.gstin,
                        place = excluded.place
                    "#,
                )
                .bind(&row.name)
                .bind(&key)
                .bind(&row.gstin)
                .bind(&row.place)
                .execute(&mut *tx)
                .await?;
            }
            PendingKind::Transport => {
                sqlx::query(
                    r#"
                    INSERT INTO transports (name, name_norm, gstin)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(name_norm) DO UPDATE SET
                        name = excluded.name,
                        gstin = excluded.gstin
                    "#,
                )
                .bind(&row.name)
                .bind(&key)
                .bind(&row.gstin)
                .execute(&mut *tx)
                .await?;
            }
        }

        sqlx::query("DELETE FROM pending_requests WHERE kind = ?1 AND name_norm = ?2")
            .bind(kind.as_str())
            .bind(&key)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn reject_pending(&self, kind: PendingKind, name: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM pending_requests WHERE kind = ?1 AND name_norm = ?2",
        )
        .bind(kind.as_str())
        .bind(normalize_name(name))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
