//! In-memory reference store.
//!
//! Backs tests and ephemeral deployments. A single `RwLock` over the
//! whole data set gives the same per-key serialization the database
//! backends get from their unique indexes.

use std::collections::HashMap;

use async_trait::async_trait;
use service_core::error::AppError;
use tokio::sync::RwLock;

use crate::models::{
    BankDetail, City, Party, PendingKind, PendingRequest, ProposalOutcome, Transport,
};
use crate::store::{normalize_name, ReferenceStore};

#[derive(Default)]
struct Inner {
    parties: HashMap<String, Party>,
    transports: HashMap<String, Transport>,
    cities: Vec<City>,
    bank_details: Vec<BankDetail>,
    /// Insertion order; newest entries at the back.
    pending: Vec<PendingRequest>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = names.map(str::to_string).collect();
    names.sort_by_key(|n| n.to_uppercase());
    names
}

#[async_trait]
impl ReferenceStore for MemoryStore {
    async fn upsert_party(&self, party: Party) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        inner.parties.insert(normalize_name(&party.name), party);
        Ok(())
    }

    async fn get_party(&self, name: &str) -> Result<Option<Party>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.parties.get(&normalize_name(name)).cloned())
    }

    async fn party_names(&self) -> Result<Vec<String>, AppError> {
        let inner = self.inner.read().await;
        Ok(sorted_names(inner.parties.values().map(|p| p.name.as_str())))
    }

    async fn parties(&self) -> Result<Vec<Party>, AppError> {
        let inner = self.inner.read().await;
        let mut parties: Vec<Party> = inner.parties.values().cloned().collect();
        parties.sort_by_key(|p| p.name.to_uppercase());
        Ok(parties)
    }

    async fn delete_party(&self, name: &str) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        Ok(inner.parties.remove(&normalize_name(name)).is_some())
    }

    async fn upsert_transport(&self, transport: Transport) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        inner
            .transports
            .insert(normalize_name(&transport.name), transport);
        Ok(())
    }

    async fn get_transport(&self, name: &str) -> Result<Option<Transport>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.transports.get(&normalize_name(name)).cloned())
    }

    async fn transport_names(&self) -> Result<Vec<String>, AppError> {
        let inner = self.inner.read().await;
        Ok(sorted_names(
            inner.transports.values().map(|t| t.name.as_str()),
        ))
    }

    async fn transports(&self) -> Result<Vec<Transport>, AppError> {
        let inner = self.inner.read().await;
        let mut transports: Vec<Transport> = inner.transports.values().cloned().collect();
        transports.sort_by_key(|t| t.name.to_uppercase());
        Ok(transports)
    }

    async fn delete_transport(&self, name: &str) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        Ok(inner.transports.remove(&normalize_name(name)).is_some())
    }

    async fn add_city(&self, city: &str, state: &str) -> Result<bool, AppError> {
        let city = City::new(city, state);
        let mut inner = self.inner.write().await;
        if inner.cities.contains(&city) {
            return Ok(false);
        }
        inner.cities.push(city);
        Ok(true)
    }

    async fn cities(&self) -> Result<Vec<City>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.cities.clone())
    }

    async fn add_bank_detail(&self, detail: BankDetail) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        inner.bank_details.push(detail);
        Ok(())
    }

    async fn bank_details(&self) -> Result<Vec<BankDetail>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.bank_details.clone())
    }

    async fn propose_pending(
        &self,
        request: PendingRequest,
    ) -> Result<ProposalOutcome, AppError> {
        let key = normalize_name(&request.name);
        let mut inner = self.inner.write().await;

        let confirmed = match request.kind {
            PendingKind::Party => inner.parties.contains_key(&key),
            PendingKind::Transport => inner.transports.contains_key(&key),
        };
        let already_pending = inner
            .pending
            .iter()
            .any(|p| p.kind == request.kind && normalize_name(&p.name) == key);

        if confirmed || already_pending {
            return Ok(ProposalOutcome::AlreadyExists);
        }

        inner.pending.push(request);
        Ok(ProposalOutcome::Created)
    }

    async fn pending_requests(&self) -> Result<Vec<PendingRequest>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.pending.iter().rev().cloned().collect())
    }

    async fn approve_pending(&self, kind: PendingKind, name: &str) -> Result<bool, AppError> {
        let key = normalize_name(name);
        let mut inner = self.inner.write().await;

        let Some(position) = inner
            .pending
            .iter()
            .position(|p| p.kind == kind && normalize_name(&p.name) == key)
        else {
            return Ok(false);
        };

        let entry = inner.pending.remove(position);
        match kind {
            PendingKind::Party => {
                let party = Party::new(&entry.name, &entry.gstin, &entry.place, false);
                inner.parties.insert(normalize_name(&party.name), party);
            }
            PendingKind::Transport => {
                let transport = Transport::new(&entry.name, &entry.gstin);
                inner
                    .transports
                    .insert(normalize_name(&transport.name), transport);
            }
        }
        Ok(true)
    }

    async fn reject_pending(&self, kind: PendingKind, name: &str) -> Result<bool, AppError> {
        let key = normalize_name(name);
        let mut inner = self.inner.write().await;
        let before = inner.pending.len();
        inner
            .pending
            .retain(|p| !(p.kind == kind && normalize_name(&p.name) == key));
        Ok(inner.pending.len() < before)
    }
}
