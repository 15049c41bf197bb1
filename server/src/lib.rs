use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use evalcore::batch::BatchOrchestrator;
use evalcore::cache::{CacheStats, EvaluationCache};
use evalcore::judge::{JudgeBackend, RelevanceJudge};
use evalcore::search::SearchClient;
use evalcore::{BatchResult, EvalError};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    #[serde(default)]
    pub csv_content: String,
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<BatchOrchestrator>,
    pub cache: Arc<EvaluationCache>,
}

impl AppState {
    /// Wire both collaborators to one process-wide cache.
    pub fn new(search: Arc<dyn SearchClient>, judge: Arc<dyn JudgeBackend>, judge_timeout: Duration) -> Self {
        let cache = Arc::new(EvaluationCache::new());
        let judge = RelevanceJudge::new(judge, cache.clone()).with_timeout(judge_timeout);
        Self { orchestrator: Arc::new(BatchOrchestrator::new(search, judge)), cache }
    }
}

type ApiError = (StatusCode, Json<Value>);

pub fn build_app(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/evaluate", post(evaluate_handler))
        .route("/cache/stats", get(cache_stats))
        .route("/cache/clear", post(cache_clear))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn evaluate_handler(State(state): State<AppState>, Json(req): Json<EvaluateRequest>) -> Result<Json<BatchResult>, ApiError> {
    match state.orchestrator.run_csv(&req.csv_content).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            tracing::warn!(error = %e, "evaluation request rejected");
            Err(bad_request(&e))
        }
    }
}

async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

async fn cache_clear(State(state): State<AppState>) -> Json<Value> {
    let cleared = state.cache.clear();
    Json(json!({ "cleared": cleared }))
}

fn bad_request(e: &EvalError) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
}
