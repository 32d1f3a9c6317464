use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer, Result as ActixResult};
use actix_cors::Cors;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use thumbprint_core::{
    build_observations, ensure_identity, estimate_uniqueness, generate_id,
    generate_synthetic_identities, record_from_json, try_compute_thumbmark, RecognitionMeta,
    SafeFingerprint, StoredFingerprint, TraitValue,
};
use thumbprint_similarity::{ExplainedMatch, Matcher};
use thumbprint_storage::{StorageManager, DEFAULT_LIST_LIMIT};
use tracing::{debug, info, warn};

/// Tunables for the REST layer
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Results returned by `/api/guess` when the request has no `topK`
    pub default_top_k: usize,
    /// Upper bound for `/api/synthetic?count=`
    pub max_synthetic: usize,
    /// Maximum JSON body size in bytes
    pub json_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            default_top_k: 10,
            max_synthetic: 1000,
            json_limit: 8 * 1024 * 1024,
        }
    }
}

/// Shared handler state
pub struct AppState {
    pub storage: Arc<StorageManager>,
    pub matcher: Matcher,
    pub config: ApiConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObservationRequest {
    current: StoredFingerprint,
    #[serde(default)]
    previous: Option<StoredFingerprint>,
    #[serde(default)]
    recognition: Option<RecognitionMeta>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UniquenessRequest {
    traits: SafeFingerprint,
    #[serde(default)]
    font_count: usize,
}

#[derive(Deserialize)]
struct SyntheticQuery {
    count: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FingerprintListing {
    id: String,
    thumbmark: String,
    created_at: DateTime<Utc>,
    last_seen: DateTime<Utc>,
    visit_count: u64,
    data: thumbprint_core::TraitRecord,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(
        storage: Arc<StorageManager>,
        matcher: Matcher,
        config: ApiConfig,
        port: u16,
    ) -> std::io::Result<()> {
        let json_limit = config.json_limit;
        let state = web::Data::new(AppState { storage, matcher, config });

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(state.clone())
                .configure(routes(json_limit))
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

/// Register all routes, with JSON bodies capped at `json_limit` bytes
pub fn routes(json_limit: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(json_config(json_limit))
            .route("/api/guess", web::post().to(guess))
            .route("/api/collect", web::post().to(collect))
            .route("/api/collect", web::delete().to(forget))
            .route("/api/fingerprints", web::get().to(list_fingerprints))
            .route("/api/observations", web::post().to(observations))
            .route("/api/uniqueness", web::post().to(uniqueness))
            .route("/api/synthetic", web::get().to(synthetic));
    }
}

fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let message = err.to_string();
            actix_web::error::InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(json!({ "error": message })),
            )
            .into()
        })
}

fn bad_request(message: &str) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::BadRequest().json(json!({ "error": message })))
}

/// First `x-forwarded-for` hop, else the peer address
fn client_ip(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
}

async fn guess(
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> ActixResult<HttpResponse> {
    let mut body = body.into_inner();

    let query = body.get_mut("query").map(Value::take).and_then(record_from_json);
    let users = match body.get_mut("users").map(Value::take) {
        Some(Value::Array(users)) => Some(users),
        _ => None,
    };
    let (Some(query), Some(users)) = (query, users) else {
        return bad_request("Request must include `query` and a `users` array in the body.");
    };

    // fractional values truncate, out-of-range values saturate
    let top_k = match body.get("topK").and_then(Value::as_f64) {
        Some(k) => k.max(0.0) as usize,
        None => state.config.default_top_k,
    };

    let pool: Vec<_> = users
        .into_iter()
        .map(|u| ensure_identity(TraitValue::from(u), "user"))
        .collect();

    let results = state.matcher.best_matches(&query, &pool, top_k);
    debug!(candidates = pool.len(), returned = results.len(), "Ranked guess");

    Ok(HttpResponse::Ok().json(json!({
        "results": ExplainedMatch::from_match_list(results, true)
    })))
}

async fn collect(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> ActixResult<HttpResponse> {
    let mut body = body.into_inner();
    let Some(mut record) = body.get_mut("fingerprint").map(Value::take).and_then(record_from_json) else {
        return bad_request("Request must include `fingerprint` object in the body.");
    };

    let has_id = matches!(record.get("id"), Some(TraitValue::String(s)) if !s.is_empty());
    if !has_id {
        record.insert("id".to_string(), TraitValue::String(generate_id("visitor")));
    }

    let thumbmark = match record.get("thumbmark") {
        Some(TraitValue::String(s)) if !s.is_empty() => s.clone(),
        _ => match try_compute_thumbmark(&record) {
            Ok(t) => t,
            Err(e) => {
                warn!("Rejecting fingerprint: {}", e);
                return bad_request("Unable to compute thumbmark.");
            }
        },
    };
    record.insert("thumbmark".to_string(), TraitValue::String(thumbmark));

    let recognition = state
        .storage
        .registry()
        .record_visit(record.clone(), client_ip(&req), Utc::now());
    info!(
        thumbmark = %recognition.thumbmark,
        seen_before = recognition.seen_before,
        visits = recognition.visit_count,
        "Collected fingerprint"
    );

    Ok(HttpResponse::Ok().json(json!({
        "fingerprint": record,
        "recognition": recognition,
    })))
}

async fn forget(
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> ActixResult<HttpResponse> {
    let Some(thumbmark) = body.get("thumbmark").and_then(Value::as_str).filter(|s| !s.is_empty()) else {
        return bad_request("Request must include `thumbmark` string.");
    };

    let removed = state.storage.registry().remove(thumbmark);
    info!(thumbmark = %thumbmark, removed, "Forget fingerprint");

    Ok(HttpResponse::Ok().json(json!({ "success": true, "removed": removed })))
}

async fn list_fingerprints(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let fingerprints: Vec<FingerprintListing> = state
        .storage
        .registry()
        .list(DEFAULT_LIST_LIMIT)
        .into_iter()
        .map(|e| FingerprintListing {
            id: e.id,
            thumbmark: e.thumbmark,
            created_at: e.created_at,
            last_seen: e.last_seen,
            visit_count: e.visit_count,
            data: e.data,
        })
        .collect();

    Ok(HttpResponse::Ok().json(json!({ "fingerprints": fingerprints })))
}

async fn observations(body: web::Json<ObservationRequest>) -> ActixResult<HttpResponse> {
    let notes = build_observations(
        &body.current,
        body.previous.as_ref(),
        body.recognition.as_ref(),
    );
    Ok(HttpResponse::Ok().json(json!({ "observations": notes })))
}

async fn uniqueness(body: web::Json<UniquenessRequest>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(estimate_uniqueness(&body.traits, body.font_count)))
}

async fn synthetic(
    state: web::Data<AppState>,
    query: web::Query<SyntheticQuery>,
) -> ActixResult<HttpResponse> {
    let count = query.count.unwrap_or(100).min(state.config.max_synthetic);
    let users = generate_synthetic_identities(count, &mut rand::rng());
    Ok(HttpResponse::Ok().json(json!({ "users": users })))
}
