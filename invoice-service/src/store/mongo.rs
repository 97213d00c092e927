//! MongoDB-backed reference store.
//!
//! The networked document-store deployment. Unique indexes on the
//! normalized-name keys are created at connect time; duplicate-key
//! write errors surface as [`ProposalOutcome::AlreadyExists`] rather
//! than failures.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::{ClientOptions, FindOptions, IndexOptions, UpdateOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use tracing::{info, instrument};

use crate::models::{
    BankDetail, City, Party, PendingKind, PendingRequest, ProposalOutcome, Transport,
};
use crate::store::{normalize_name, ReferenceStore};

#[derive(Debug, Serialize, Deserialize)]
struct PartyDoc {
    name: String,
    name_norm: String,
    #[serde(default)]
    gstin: String,
    #[serde(default)]
    place: String,
    #[serde(default)]
    fixed_place: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct TransportDoc {
    name: String,
    name_norm: String,
    #[serde(default)]
    gstin: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CityDoc {
    city: String,
    state: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct BankDetailDoc {
    bank_name: String,
    account_number: String,
    ifsc: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct PendingDoc {
    kind: String,
    name: String,
    name_norm: String,
    #[serde(default)]
    gstin: String,
    #[serde(default)]
    place: String,
}

impl From<PendingDoc> for PendingRequest {
    fn from(doc: PendingDoc) -> Self {
        PendingRequest {
            kind: PendingKind::parse(&doc.kind).unwrap_or(PendingKind::Party),
            name: doc.name,
            gstin: doc.gstin,
            place: doc.place,
        }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(write_err))
            if write_err.code == 11000
    )
}

#[derive(Clone)]
pub struct MongoStore {
    parties: Collection<PartyDoc>,
    transports: Collection<TransportDoc>,
    cities: Collection<CityDoc>,
    bank_details: Collection<BankDetailDoc>,
    pending: Collection<PendingDoc>,
}

impl MongoStore {
    /// Connect to the database and ensure the unique indexes exist.
    #[instrument(skip(url))]
    pub async fn connect(url: &str, db_name: &str) -> Result<Self, AppError> {
        let mut options = ClientOptions::parse(url).await?;
        options.app_name = Some("invoice-service".to_string());

        let client = Client::with_options(options)?;
        let db = client.database(db_name);

        let store = Self::with_database(&db);
        store.init_indexes().await?;
        Ok(store)
    }

    pub fn with_database(db: &Database) -> Self {
        Self {
            parties: db.collection("parties"),
            transports: db.collection("transports"),
            cities: db.collection("cities"),
            bank_details: db.collection("bank_details"),
            pending: db.collection("pending_requests"),
        }
    }

    async fn init_indexes(&self) -> Result<(), AppError> {
        let unique = |name: &str| {
            IndexOptions::builder()
                .unique(true)
                .name(name.to_string())
                .build()
        };

        self.parties
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "name_norm": 1 })
                    .options(unique("party_name_idx"))
                    .build(),
                None,
            )
            .await?;

        self.transports
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "name_norm": 1 })
                    .options(unique("transport_name_idx"))
                    .build(),
                None,
            )
            .await?;

        self.cities
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "city": 1, "state": 1 })
                    .options(unique("city_state_idx"))
                    .build(),
                None,
            )
            .await?;

        self.pending
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "kind": 1, "name_norm": 1 })
                    .options(unique("pending_key_idx"))
                    .build(),
                None,
            )
            .await?;

        info!("MongoDB reference-store indexes initialized");
        Ok(())
    }
}

#[async_trait]
impl ReferenceStore for MongoStore {
    #[instrument(skip(self, party), fields(name = %party.name))]
    async fn upsert_party(&self, party: Party) -> Result<(), AppError> {
        let key = normalize_name(&party.name);
        self.parties
            .update_one(
                doc! { "name_norm": &key },
                doc! { "$set": {
                    "name": party.name.trim(),
                    "name_norm": &key,
                    "gstin": &party.gstin,
                    "place": &party.place,
                    "fixed_place": party.fixed_place,
                }},
                UpdateOptions::builder().upsert(true).build(),
            )
            .await?;
        Ok(())
    }

    async fn get_party(&self, name: &str) -> Result<Option<Party>, AppError> {
        let doc = self
            .parties
            .find_one(doc! { "name_norm": normalize_name(name) }, None)
            .await?;
        Ok(doc.map(|d| Party {
            name: d.name,
            gstin: d.gstin,
            place: d.place,
            fixed_place: d.fixed_place,
        }))
    }

    async fn party_names(&self) -> Result<Vec<String>, AppError> {
        let cursor = self
            .parties
            .find(
                None,
                FindOptions::builder().sort(doc! { "name_norm": 1 }).build(),
            )
            .await?;
        let docs: Vec<PartyDoc> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(|d| d.name).collect())
    }

    async fn parties(&self) -> Result<Vec<Party>, AppError> {
        let cursor = self
            .parties
            .find(
                None,
                FindOptions::builder().sort(doc! { "name_norm": 1 }).build(),
            )
            .await?;
        let docs: Vec<PartyDoc> = cursor.try_collect().await?;
        Ok(docs
            .into_iter()
            .map(|d| Party {
                name: d.name,
                gstin: d.gstin,
                place: d.place,
                fixed_place: d.fixed_place,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn delete_party(&self, name: &str) -> Result<bool, AppError> {
        let result = self
            .parties
            .delete_one(doc! { "name_norm": normalize_name(name) }, None)
            .await?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self, transport), fields(name = %transport.name))]
    async fn upsert_transport(&self, transport: Transport) -> Result<(), AppError> {
        let key = normalize_name(&transport.name);
        self.transports
            .update_one(
                doc! { "name_norm": &key },
                doc! { "$set": {
                    "name": transport.name.trim(),
                    "name_norm": &key,
                    "gstin": &transport.gstin,
                }},
                UpdateOptions::builder().upsert(true).build(),
            )
            .await?;
        Ok(())
    }

    async fn get_transport(&self, name: &str) -> Result<Option<Transport>, AppError> {
        let doc = self
            .transports
            .find_one(doc! { "name_norm": normalize_name(name) }, None)
            .await?;
        Ok(doc.map(|d| Transport {
            name: d.name,
            gstin: d.gstin,
        }))
    }

    async fn transport_names(&self) -> Result<Vec<String>, AppError> {
        let cursor = self
            .transports
            .find(
                None,
                FindOptions::builder().sort(doc! { "name_norm": 1 }).build(),
            )
            .await?;
        let docs: Vec<TransportDoc> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(|d| d.name).collect())
    }

    async fn transports(&self) -> Result<Vec<Transport>, AppError> {
        let cursor = self
            .transports
            .find(
                None,
                FindOptions::builder().sort(doc! { "name_norm": 1 }).build(),
            )
            .await?;
        let docs: Vec<TransportDoc> = cursor.try_collect().await?;
        Ok(docs
            .into_iter()
            .map(|d| Transport {
                name: d.name,
                gstin: d.gstin,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn delete_transport(&self, name: &str) -> Result<bool, AppError> {
        let result = self
            .transports
            .delete_one(doc! { "name_norm": normalize_name(name) }, None)
            .await?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn add_city(&self, city: &str, state: &str) -> Result<bool, AppError> {
        let result = self
            .cities
            .update_one(
                doc! { "city": city.trim(), "state": state.trim() },
                doc! { "$setOnInsert": { "city": city.trim(), "state": state.trim() } },
                UpdateOptions::builder().upsert(true).build(),
            )
            .await?;
        Ok(result.upserted_id.is_some())
    }

    async fn cities(&self) -> Result<Vec<City>, AppError> {
        let cursor = self
            .cities
            .find(None, FindOptions::builder().sort(doc! { "_id": 1 }).build())
            .await?;
        let docs: Vec<CityDoc> = cursor.try_collect().await?;
        Ok(docs
            .into_iter()
            .map(|d| City {
                city: d.city,
                state: d.state,
            })
            .collect())
    }

    #[instrument(skip(self, detail), fields(bank = %detail.bank_name))]
    async fn add_bank_detail(&self, detail: BankDetail) -> Result<(), AppError> {
        self.bank_details
            .insert_one(
                BankDetailDoc {
                    bank_name: detail.bank_name,
                    account_number: detail.account_number,
                    ifsc: detail.ifsc,
                },
                None,
            )
            .await?;
        Ok(())
    }

    async fn bank_details(&self) -> Result<Vec<BankDetail>, AppError> {
        let cursor = self
            .bank_details
            .find(None, FindOptions::builder().sort(doc! { "_id": 1 }).build())
            .await?;
        let docs: Vec<BankDetailDoc> = cursor.try_collect().await?;
        Ok(docs
            .into_iter()
            .map(|d| BankDetail {
                bank_name: d.bank_name,
                account_number: d.account_number,
                ifsc: d.ifsc,
            })
            .collect())
    }

    #[instrument(skip(self, request), fields(kind = request.kind.as_str(), name = %request.name))]
    async fn propose_pending(
        &self,
        request: PendingRequest,
    ) -> Result<ProposalOutcome, AppError> {
        let key = normalize_name(&request.name);

        let confirmed = match request.kind {
            PendingKind::Party => self
                .parties
                .find_one(doc! { "name_norm": &key }, None)
                .await?
                .is_some(),
            PendingKind::Transport => self
                .transports
                .find_one(doc! { "name_norm": &key }, None)
                .await?
                .is_some(),
        };
        if confirmed {
            return Ok(ProposalOutcome::AlreadyExists);
        }

        let inserted = self
            .pending
            .insert_one(
                PendingDoc {
                    kind: request.kind.as_str().to_string(),
                    name: request.name.trim().to_string(),
                    name_norm: key,
                    gstin: request.gstin,
                    place: request.place,
                },
                None,
            )
            .await;

        match inserted {
            Ok(_) => Ok(ProposalOutcome::Created),
            Err(ref e) if is_duplicate_key(e) => Ok(ProposalOutcome::AlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    async fn pending_requests(&self) -> Result<Vec<PendingRequest>, AppError> {
        let cursor = self
            .pending
            .find(
                None,
                FindOptions::builder().sort(doc! { "_id": -1 }).build(),
            )
            .await?;
        let docs: Vec<PendingDoc> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(PendingRequest::from).collect())
    }

    #[instrument(skip(self))]
    async fn approve_pending(&self, kind: PendingKind, name: &str) -> Result<bool, AppError> {
        let key = normalize_name(name);

        // find_one_and_delete claims the entry; of two concurrent
        // approvals exactly one sees the document.
        let entry = self
            .pending
            .find_one_and_delete(doc! { "kind": kind.as_str(), "name_norm": &key }, None)
            .await?;

        let Some(entry) = entry else {
            return Ok(false);
        };

        match kind {
            PendingKind::Party => {
                self.upsert_party(Party::new(&entry.name, &entry.gstin, &entry.place, false))
                    .await?;
            }
            PendingKind::Transport => {
                self.upsert_transport(Transport::new(&entry.name, &entry.gstin))
                    .await?;
            }
        }
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn reject_pending(&self, kind: PendingKind, name: &str) -> Result<bool, AppError> {
        let result = self
            .pending
            .delete_one(
                doc! { "kind": kind.as_str(), "name_norm": normalize_name(name) },
                None,
            )
            .await?;
        Ok(result.deleted_count > 0)
    }
}
