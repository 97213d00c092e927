//! Test helper module for invoice-service integration tests.

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use invoice_service::config::{BusinessProfile, Config, ServerConfig, StoreBackend, StoreConfig};
use invoice_service::store::MemoryStore;
use invoice_service::Application;
use rust_decimal::Decimal;

/// Configuration pointing at a random local port and the in-memory store.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
            sqlite_url: "sqlite::memory:".to_string(),
            mongodb_url: "mongodb://localhost:27017".to_string(),
            mongodb_db: "bill_app_test".to_string(),
        },
        business: BusinessProfile {
            name: "ANANT CREATION".to_string(),
            address: "1048-49, Shree Mahalaxmi Market, Ring Road, Surat-395007".to_string(),
            gstin: "24AHJPR6707K1ZY".to_string(),
            phone: "9377178174".to_string(),
            hsn_code: "5407".to_string(),
            tax_rate: Decimal::from_str("0.05").unwrap(),
        },
    }
}

/// Test application wrapper running on a random port against the
/// in-memory store.
pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let store = Arc::new(MemoryStore::new());
        let app = Application::with_store(test_config(), store.clone())
            .await
            .expect("Failed to build test application");
        let port = app.port();

        tokio::spawn(app.run_until_stopped());

        Self {
            address: format!("http://127.0.0.1:{}", port),
            store,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}
