//! The prediction service: three routes over one immutable pipeline.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::model::DoPipeline;

// The serving side pins its own lag count and output range rather than
// reading the trainer's metadata file. A retrained artifact with a different
// lag count is reported at startup, not adopted.
pub const MODEL_LAGS: usize = 6;
pub const Y_MIN: f64 = 0.0;
pub const Y_MAX: f64 = 20.0;

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DoPipeline>,
}

// ---------- Request/Response types ----------

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// Observed values, oldest to newest.
    pub series: Vec<f64>,
    /// Optional override of the lag window length.
    pub lags: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub yhat: f64,
    pub clipped: bool,
    pub lags: usize,
}

#[derive(Debug, Serialize)]
pub struct MetaResponse {
    pub lags: usize,
    pub y_min: f64,
    pub y_max: f64,
}

// ---------- Routes ----------

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/meta", get(meta))
        .route("/predict_do", post(predict_do))
        .with_state(state)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

pub async fn meta() -> Json<MetaResponse> {
    Json(MetaResponse {
        lags: MODEL_LAGS,
        y_min: Y_MIN,
        y_max: Y_MAX,
    })
}

pub async fn predict_do(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, (StatusCode, Json<serde_json::Value>)> {
    let lags = req.lags.unwrap_or(MODEL_LAGS);
    if req.series.len() < lags {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("need at least {} values", lags) })),
        ));
    }

    // Take the newest `lags` values and flip them into the pipeline's
    // lag-1-first layout.
    let mut window: Vec<f64> = req.series[req.series.len() - lags..].to_vec();
    window.reverse();

    let raw = state.pipeline.predict(&window).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
    })?;

    let yhat = raw.clamp(Y_MIN, Y_MAX);
    Ok(Json(PredictResponse {
        yhat,
        clipped: yhat != raw,
        lags,
    }))
}
