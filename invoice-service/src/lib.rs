pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use config::{Config, StoreBackend};
use services::InvoiceService;
use store::{MemoryStore, MongoStore, ReferenceStore, SqliteStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReferenceStore>,
    pub invoices: Arc<InvoiceService>,
    pub config: Arc<Config>,
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application, connecting the store backend the
    /// configuration selects.
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let store: Arc<dyn ReferenceStore> = match config.store.backend {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::Sqlite => Arc::new(SqliteStore::connect(&config.store.sqlite_url).await?),
            StoreBackend::Mongodb => Arc::new(
                MongoStore::connect(&config.store.mongodb_url, &config.store.mongodb_db).await?,
            ),
        };
        Self::with_store(config, store).await
    }

    /// Build the application on an already-constructed store. Tests use
    /// this to run against the in-memory backend.
    pub async fn with_store(
        config: Config,
        store: Arc<dyn ReferenceStore>,
    ) -> anyhow::Result<Self> {
        let invoices = Arc::new(InvoiceService::new(
            store.clone(),
            config.business.tax_rate,
        ));

        let state = AppState {
            store,
            invoices,
            config: Arc::new(config.clone()),
        };

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/invoice/download", post(handlers::invoice::download))
            .route("/parties", get(handlers::reference::list_parties))
            .route("/parties/:name", get(handlers::reference::get_party))
            .route("/transports", get(handlers::reference::list_transports))
            .route("/transports/:name", get(handlers::reference::get_transport))
            .route("/cities", get(handlers::reference::list_cities))
            .route("/pending", post(handlers::pending::propose))
            .route("/admin/pending", get(handlers::pending::list_pending))
            .route(
                "/admin/pending/:kind/:name/approve",
                post(handlers::pending::approve),
            )
            .route(
                "/admin/pending/:kind/:name/reject",
                post(handlers::pending::reject),
            )
            .route(
                "/admin/tables/:table",
                get(handlers::admin::list_table).post(handlers::admin::insert_record),
            )
            .route(
                "/admin/tables/:table/:name",
                delete(handlers::admin::delete_record),
            )
            .layer(TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                },
            ))
            .with_state(state);

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        let listener = TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// The port the listener is bound to (useful with port 0 in tests).
    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!(port = self.port, "Listening");
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }
}
