//! Reference-data storage for invoice-service.
//!
//! One interface, three interchangeable backends: an in-memory map store
//! (tests, ephemeral deployments), a file-backed SQLite store, and a
//! MongoDB document store. Handlers and business logic hold an
//! `Arc<dyn ReferenceStore>` and never depend on which backend is active.

mod memory;
mod mongo;
mod sqlite;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use service_core::error::AppError;

use crate::models::{
    BankDetail, City, Party, PendingKind, PendingRequest, ProposalOutcome, Transport,
};

/// Comparison key for name-keyed records. The stored record keeps the
/// original casing; only lookups and uniqueness use this form.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Name-keyed upsert store for parties and transports, append-only lists
/// for cities and bank accounts, and the pending-approval queue.
///
/// Uniqueness per `(kind, normalized name)` is enforced by the backend
/// itself (unique index, `ON CONFLICT`, or a keyed map behind a write
/// lock), so concurrent upserts of one name converge to a single record.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// Insert or fully replace a party, keyed by normalized name.
    async fn upsert_party(&self, party: Party) -> Result<(), AppError>;

    /// Exact lookup by normalized name. Absence is a legitimate outcome.
    async fn get_party(&self, name: &str) -> Result<Option<Party>, AppError>;

    /// All party names in case-insensitive lexical order.
    async fn party_names(&self) -> Result<Vec<String>, AppError>;

    /// All party records, ordered like [`Self::party_names`].
    async fn parties(&self) -> Result<Vec<Party>, AppError>;

    /// Admin hard delete. Returns whether a record was removed.
    async fn delete_party(&self, name: &str) -> Result<bool, AppError>;

    async fn upsert_transport(&self, transport: Transport) -> Result<(), AppError>;
    async fn get_transport(&self, name: &str) -> Result<Option<Transport>, AppError>;
    async fn transport_names(&self) -> Result<Vec<String>, AppError>;
    async fn transports(&self) -> Result<Vec<Transport>, AppError>;
    async fn delete_transport(&self, name: &str) -> Result<bool, AppError>;

    /// Insert-if-absent on the `(city, state)` pair. Returns whether a
    /// new row was created.
    async fn add_city(&self, city: &str, state: &str) -> Result<bool, AppError>;
    async fn cities(&self) -> Result<Vec<City>, AppError>;

    async fn add_bank_detail(&self, detail: BankDetail) -> Result<(), AppError>;
    /// Bank accounts in insertion order.
    async fn bank_details(&self) -> Result<Vec<BankDetail>, AppError>;

    /// Propose a new party/transport for admin approval. A confirmed
    /// record or an existing pending entry with the same key yields
    /// [`ProposalOutcome::AlreadyExists`]; insertion races resolve the
    /// same way via the backend's unique key.
    async fn propose_pending(&self, request: PendingRequest)
        -> Result<ProposalOutcome, AppError>;

    /// All pending entries, most recently proposed first.
    async fn pending_requests(&self) -> Result<Vec<PendingRequest>, AppError>;

    /// Promote the pending entry's attributes into the confirmed table,
    /// then remove it. Returns `false` when the entry no longer exists
    /// (already approved/rejected concurrently).
    async fn approve_pending(&self, kind: PendingKind, name: &str) -> Result<bool, AppError>;

    /// Remove the pending entry. Absence is not an error; returns whether
    /// anything was removed.
    async fn reject_pending(&self, kind: PendingKind, name: &str) -> Result<bool, AppError>;
}
