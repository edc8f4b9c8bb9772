use anyhow::Result;
use axum::{extract::{Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use engine::{build_index, load_catalog, recommend, sample_entries, Facets, FilterCriteria, IndexHandle, RankedHotel, Recommendation};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct RecommendParams {
    pub package_type: String,
    pub start_city: String,
    pub destination: String,
    #[serde(default = "default_max_price")]
    pub max_price: f64,
    pub limit: Option<usize>,
}
fn default_max_price() -> f64 { 10_000.0 }

#[derive(Serialize)]
pub struct RecommendResponse {
    pub matched: bool,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<RankedHotel>,
}

#[derive(Deserialize)]
pub struct FeedbackBody {
    pub feedback: String,
}

pub struct ServerConfig {
    pub catalog: PathBuf,
    pub feedback_log: PathBuf,
    pub admin_token: Option<String>,
    /// Row cap for the indexed sample; 0 indexes every row.
    pub sample: usize,
    pub seed: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: PathBuf,
    pub sample: usize,
    pub seed: u64,
    pub feedback_log: PathBuf,
    pub admin_token: Option<String>,
    /// Swapped whole on reload; readers clone the inner Arc and never see a partial build.
    pub index: Arc<RwLock<Arc<IndexHandle>>>,
    feedback_guard: Arc<Mutex<()>>,
}

impl AppState {
    fn current(&self) -> Arc<IndexHandle> { self.index.read().clone() }
}

fn load_index(catalog: &Path, sample: usize, seed: u64) -> Result<IndexHandle> {
    let entries = sample_entries(load_catalog(catalog)?, sample, seed);
    Ok(build_index(entries)?)
}

pub fn build_app(config: ServerConfig) -> Result<Router> {
    // Build the index at startup
    let index = load_index(&config.catalog, config.sample, config.seed)?;
    let app_state = AppState {
        catalog: config.catalog,
        sample: config.sample,
        seed: config.seed,
        feedback_log: config.feedback_log,
        admin_token: config.admin_token,
        index: Arc::new(RwLock::new(Arc::new(index))),
        feedback_guard: Arc::new(Mutex::new(())),
    };

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

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/recommend", get(recommend_handler))
        .route("/facets", get(facets_handler))
        .route("/feedback", post(feedback_handler))
        .route("/admin/reload", post(reload_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn recommend_handler(State(state): State<AppState>, Query(params): Query<RecommendParams>) -> Json<RecommendResponse> {
    let start = std::time::Instant::now();
    let criteria = FilterCriteria {
        package_type: params.package_type,
        start_city: params.start_city,
        destination: params.destination,
        max_price: params.max_price,
    };
    let index = state.current();
    let (matched, total_hits, results) = match recommend(&index, &criteria, params.limit) {
        Recommendation::Ranked(r) => (true, r.matched, r.hotels),
        Recommendation::NoMatch => (false, 0, vec![]),
    };
    let elapsed = start.elapsed();
    Json(RecommendResponse { matched, took_s: elapsed.as_secs_f64(), total_hits, results })
}

pub async fn facets_handler(State(state): State<AppState>) -> Json<Facets> {
    Json(state.current().facets())
}

async fn feedback_handler(State(state): State<AppState>, Json(body): Json<FeedbackBody>) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let feedback = body.feedback.trim().replace('\n', " ");
    if feedback.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Feedback cannot be empty!".into()));
    }
    let guard = state.feedback_guard.clone();
    let path = state.feedback_log.clone();
    let written = tokio::task::spawn_blocking(move || {
        let _lock = guard.lock();
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut f| writeln!(f, "{feedback}"))
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    match written {
        Ok(()) => {
            tracing::info!("user feedback logged");
            Ok(Json(serde_json::json!({ "status": "Thank you for your feedback!" })))
        }
        Err(e) => {
            tracing::error!(error = %e, "error logging user feedback");
            Err((StatusCode::INTERNAL_SERVER_ERROR, "could not record feedback".into()))
        }
    }
}

// --- Admin endpoints ---
async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let (catalog, sample, seed) = (state.catalog.clone(), state.sample, state.seed);
    let built = tokio::task::spawn_blocking(move || load_index(&catalog, sample, seed))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    match built {
        Ok(index) => {
            let entries = index.entries().len();
            *state.index.write() = Arc::new(index);
            tracing::info!(entries, "index reloaded");
            Ok(Json(serde_json::json!({ "entries": entries })))
        }
        Err(e) => {
            tracing::error!(error = %e, "reload failed; keeping previous index");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
