use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use engine::search::{DEFAULT_ALPHA, DEFAULT_TOP_K};
use engine::{EngineError, SearchEngine};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub mod loader;

pub use loader::PassageRecord;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default = "default_alpha")]
    pub alpha: f32,
}

fn default_k() -> usize {
    DEFAULT_TOP_K
}

fn default_alpha() -> f32 {
    DEFAULT_ALPHA
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results_count: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub rank: usize,
    pub id: String,
    pub query_id: u64,
    pub score: f32,
    pub passage: String,
    pub is_selected: bool,
}

/// Shared serving state. The engine slot is written exactly once at
/// startup (and wholesale-replaced on a future reload); request handlers
/// only ever clone the inner `Arc` out of it.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<RwLock<Option<Arc<SearchEngine>>>>,
}

impl AppState {
    pub fn new(engine: Option<Arc<SearchEngine>>) -> Self {
        Self {
            engine: Arc::new(RwLock::new(engine)),
        }
    }

    /// Replace the served engine with a freshly built one.
    pub fn install(&self, engine: Arc<SearchEngine>) {
        *self.engine.write() = Some(engine);
    }

    fn engine(&self) -> Result<Arc<SearchEngine>, EngineError> {
        self.engine.read().clone().ok_or(EngineError::NotReady)
    }

    fn document_count(&self) -> usize {
        self.engine
            .read()
            .as_ref()
            .map(|e| e.document_count())
            .unwrap_or(0)
    }
}

#[derive(Debug)]
pub enum ApiError {
    MissingQuery,
    Engine(EngineError),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError::Engine(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingQuery => (
                StatusCode::BAD_REQUEST,
                "query parameter \"q\" is required".to_string(),
            ),
            ApiError::Engine(err @ EngineError::NotReady) => {
                (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            }
            ApiError::Engine(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub fn build_app(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/search", get(search_handler))
        .with_state(state)
        .layer(cors)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    // A missing or blank query is a client error at the HTTP boundary.
    // The engine itself treats an empty query as an empty result set.
    if params.q.trim().is_empty() {
        return Err(ApiError::MissingQuery);
    }
    let engine = state.engine()?;
    let results = engine.search(&params.q, params.k, params.alpha);

    let hits: Vec<SearchHit> = results
        .into_iter()
        .filter_map(|r| {
            let rank = r.rank;
            let score = r.score;
            match serde_json::from_value::<PassageRecord>(r.metadata) {
                Ok(meta) => Some(SearchHit {
                    rank,
                    id: meta.id,
                    query_id: meta.query_id,
                    score,
                    passage: meta.passage,
                    is_selected: meta.is_selected,
                }),
                Err(err) => {
                    tracing::warn!(doc_id = r.doc_id, %err, "dropping hit with unreadable metadata");
                    None
                }
            }
        })
        .collect();

    Ok(Json(SearchResponse {
        query: params.q,
        results_count: hits.len(),
        results: hits,
    }))
}

pub async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "document_count": state.document_count(),
    }))
}
