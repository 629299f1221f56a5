//! HTTP/JSON surface of the attainment service.

pub mod catalog;
pub mod error;
pub mod headers;
pub mod mappings;
pub mod scores;

pub use error::{ApiError, ApiResult, ErrorResponse};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::adapters::sqlite::{
    SqliteCatalogRepository, SqliteMappingRepository, SqliteScoreRepository,
};
use crate::domain::models::{MappingMode, PriorityWeights, ServerConfig};
use crate::services::{
    CatalogService, PriorityWeightResolver, PropagationEngine, ScoreNormalizer, ScoreReader,
};

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether to enable CORS.
    pub enable_cors: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        ServerConfig::default().into()
    }
}

impl From<ServerConfig> for HttpConfig {
    fn from(c: ServerConfig) -> Self {
        Self {
            host: c.host,
            port: c.port,
            enable_cors: c.enable_cors,
        }
    }
}

/// Services shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub normalizer: Arc<ScoreNormalizer>,
    pub reader: Arc<ScoreReader>,
    pub engine: Arc<PropagationEngine>,
    pub catalog: Arc<CatalogService>,
}

impl AppState {
    /// Wire the SQLite repositories into the services.
    pub fn from_pool(pool: SqlitePool, weights: PriorityWeights, mode: MappingMode) -> Self {
        let catalog_repo = Arc::new(SqliteCatalogRepository::new(pool.clone()));
        let score_repo = Arc::new(SqliteScoreRepository::new(pool.clone()));
        let mapping_repo = Arc::new(SqliteMappingRepository::new(pool));

        Self {
            normalizer: Arc::new(ScoreNormalizer::new(catalog_repo.clone(), score_repo.clone())),
            reader: Arc::new(ScoreReader::new(score_repo.clone())),
            engine: Arc::new(PropagationEngine::new(
                catalog_repo.clone(),
                score_repo,
                mapping_repo.clone(),
                PriorityWeightResolver::new(weights),
                mode,
            )),
            catalog: Arc::new(CatalogService::new(catalog_repo, mapping_repo)),
        }
    }
}

/// Build the router.
pub fn build_router(state: AppState, enable_cors: bool) -> Router {
    let app = Router::new()
        // Scores
        .route("/api/ac_scores", get(scores::get_ac_scores).post(scores::submit_mark))
        .route("/api/lo_scores", get(scores::get_lo_scores))
        .route("/api/ro_scores", get(scores::get_ro_scores))
        // Mappings, which propagate on submit
        .route(
            "/api/lo_ac_mapping",
            get(mappings::get_lo_ac_mappings).post(mappings::map_criteria),
        )
        .route(
            "/api/ro_lo_mapping",
            get(mappings::get_ro_lo_mappings).post(mappings::map_learning_outcomes),
        )
        // Catalog
        .route("/api/students", get(catalog::list_students).post(catalog::create_student))
        .route(
            "/api/assessment_criterias",
            get(catalog::list_criteria).post(catalog::create_criterion),
        )
        .route(
            "/api/learning_outcomes",
            get(catalog::list_learning_outcomes).post(catalog::create_learning_outcome),
        )
        .route(
            "/api/report_outcomes",
            get(catalog::list_report_outcomes).post(catalog::create_report_outcome),
        )
        .route("/health", get(health_check))
        .with_state(state);

    if enable_cors {
        app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
            .layer(TraceLayer::new_for_http())
    } else {
        app.layer(TraceLayer::new_for_http())
    }
}

async fn health_check() -> &'static str {
    "OK"
}

/// Attainment HTTP server.
pub struct AttainmentHttpServer {
    config: HttpConfig,
    state: AppState,
}

impl AttainmentHttpServer {
    pub fn new(state: AppState, config: HttpConfig) -> Self {
        Self { config, state }
    }

    fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.config.host, self.config.port).parse()
    }

    /// Start the server.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Start the server with a shutdown signal.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = self.addr()?;
        let router = build_router(self.state, self.config.enable_cors);

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Attainment HTTP server listening on {}", listener.local_addr()?);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
