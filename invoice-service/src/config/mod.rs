use std::env;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use rust_decimal::Decimal;

/// Which reference-store backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Sqlite,
    Mongodb,
}

impl StoreBackend {
    fn parse(s: &str) -> Result<Self> {
        match s {
            "memory" => Ok(StoreBackend::Memory),
            "sqlite" => Ok(StoreBackend::Sqlite),
            "mongodb" | "mongo" => Ok(StoreBackend::Mongodb),
            other => bail!("unknown store backend '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub business: BusinessProfile,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub sqlite_url: String,
    pub mongodb_url: String,
    pub mongodb_db: String,
}

/// Identity stamped on every rendered invoice.
#[derive(Debug, Clone)]
pub struct BusinessProfile {
    pub name: String,
    pub address: String,
    pub gstin: String,
    pub phone: String,
    /// HSN/SAC commodity code printed per line item.
    pub hsn_code: String,
    /// IGST rate applied to the subtotal, e.g. 0.05.
    pub tax_rate: Decimal,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env_or("INVOICE_SERVICE_HOST", "0.0.0.0");
        let port = env_or("INVOICE_SERVICE_PORT", "3000")
            .parse()
            .context("INVOICE_SERVICE_PORT must be a port number")?;

        let backend = StoreBackend::parse(&env_or("INVOICE_STORE_BACKEND", "sqlite"))?;
        let sqlite_url = env_or("INVOICE_SQLITE_URL", "sqlite:data.db");
        let mongodb_url = env_or("INVOICE_MONGODB_URL", "mongodb://localhost:27017");
        let mongodb_db = env_or("INVOICE_MONGODB_DB", "bill_app");

        let tax_rate = Decimal::from_str(&env_or("INVOICE_TAX_RATE", "0.05"))
            .context("INVOICE_TAX_RATE must be a decimal fraction")?;

        Ok(Self {
            server: ServerConfig { host, port },
            store: StoreConfig {
                backend,
                sqlite_url,
                mongodb_url,
                mongodb_db,
            },
            business: BusinessProfile {
                name: env_or("BUSINESS_NAME", "ANANT CREATION"),
                address: env_or(
                    "BUSINESS_ADDRESS",
                    "1048-49, Shree Mahalaxmi Market, Ring Road, Surat-395007",
                ),
                gstin: env_or("BUSINESS_GSTIN", "24AHJPR6707K1ZY"),
                phone: env_or("BUSINESS_PHONE", "9377178174"),
                hsn_code: env_or("BUSINESS_HSN_CODE", "5407"),
                tax_rate,
            },
        })
    }
}
