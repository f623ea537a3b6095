// End-to-end check of the trainer/predictor contract: train on a synthetic
// sensor log, persist the pipeline, reload it, and confirm the loaded
// artifact reproduces the trainer's own held-out predictions before driving
// the HTTP handlers with it.

use std::fs;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;

use do_forecast::data::smart_read_csv;
use do_forecast::features::{make_supervised, time_split};
use do_forecast::model::{mean_absolute_error, DoPipeline};
use do_forecast::persist::{load_pipeline, save_pipeline, TargetMeta, META_FILE};
use do_forecast::service::{self, AppState, PredictRequest};

const LAGS: usize = 6;

// do_mg_L[t] = 0.5 * do_mg_L[t-1] + 4.0 + wiggle, hovering around 8 mg/L.
fn synthetic_do_series(n: usize) -> Vec<f64> {
    let mut values = Vec::with_capacity(n);
    let mut prev = 8.0;
    for t in 0..n {
        let next = 0.5 * prev + 4.0 + 0.2 * (t as f64 * 0.9).sin();
        values.push(next);
        prev = next;
    }
    values
}

fn write_sensor_csv(path: &std::path::Path, values: &[f64]) {
    let base = NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    let mut csv = String::from("timestamp,do_mg_L,voltage,ph,temperature\n");
    for (i, value) in values.iter().enumerate() {
        let ts = base + chrono::Duration::hours(i as i64);
        csv.push_str(&format!(
            "{},{:.6},3.3,7.1,24.5\n",
            ts.format("%Y-%m-%d %H:%M:%S"),
            value
        ));
    }
    fs::write(path, csv).unwrap();
}

#[test]
fn saved_artifact_reproduces_in_process_predictions() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("data.csv");
    write_sensor_csv(&csv_path, &synthetic_do_series(300));

    let table = smart_read_csv(&csv_path, "do_mg_L").unwrap();
    assert_eq!(table.len(), 300);

    let (x, y) = make_supervised(&table, LAGS);
    let (x_train, x_test, y_train, y_test) = time_split(x, y, 0.8);

    let pipeline = DoPipeline::fit(&x_train, &y_train, LAGS).unwrap();
    let in_process = pipeline.predict_batch(&x_test).unwrap();

    let mae = mean_absolute_error(&in_process, y_test.as_slice().unwrap());
    assert!(mae.is_finite());
    assert!(mae < 1.0, "MAE {} too large for a near-linear signal", mae);

    let models_dir = dir.path().join("models");
    let model_path = save_pipeline(&models_dir, "do_mg_L", &pipeline, mae).unwrap();

    let loaded = load_pipeline(&model_path).unwrap();
    let reloaded = loaded.predict_batch(&x_test).unwrap();

    assert_eq!(in_process.len(), reloaded.len());
    for (a, b) in in_process.iter().zip(&reloaded) {
        assert!((a - b).abs() < 1e-9, "prediction drifted after reload: {} vs {}", a, b);
    }

    let raw = fs::read_to_string(models_dir.join(META_FILE)).unwrap();
    let meta: std::collections::BTreeMap<String, TargetMeta> =
        serde_json::from_str(&raw).unwrap();
    assert_eq!(meta["do_mg_L"].lags, LAGS);
    assert!((meta["do_mg_L"].mae - mae).abs() < 1e-12);
}

#[tokio::test]
async fn loaded_artifact_serves_stable_clamped_predictions() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("data.csv");
    let values = synthetic_do_series(300);
    write_sensor_csv(&csv_path, &values);

    let table = smart_read_csv(&csv_path, "do_mg_L").unwrap();
    let (x, y) = make_supervised(&table, LAGS);
    let (x_train, _, y_train, _) = time_split(x, y, 0.8);
    let pipeline = DoPipeline::fit(&x_train, &y_train, LAGS).unwrap();

    let models_dir = dir.path().join("models");
    let model_path = save_pipeline(&models_dir, "do_mg_L", &pipeline, 0.0).unwrap();
    let state = AppState {
        pipeline: Arc::new(load_pipeline(&model_path).unwrap()),
    };

    // The handler sees the series oldest to newest, exactly as a client
    // would send its recent readings.
    let series: Vec<f64> = values[values.len() - 20..].to_vec();

    let Json(first) = service::predict_do(
        State(state.clone()),
        Json(PredictRequest {
            series: series.clone(),
            lags: None,
        }),
    )
    .await
    .unwrap();

    let Json(second) = service::predict_do(
        State(state.clone()),
        Json(PredictRequest {
            series: series.clone(),
            lags: None,
        }),
    )
    .await
    .unwrap();

    assert_eq!(first.yhat.to_bits(), second.yhat.to_bits());
    assert_eq!(first.lags, LAGS);
    assert!(first.yhat >= service::Y_MIN && first.yhat <= service::Y_MAX);

    // The handler result must equal predicting the reversed tail directly.
    let mut window: Vec<f64> = series[series.len() - LAGS..].to_vec();
    window.reverse();
    let direct = state.pipeline.predict(&window).unwrap();
    let clamped = direct.clamp(service::Y_MIN, service::Y_MAX);
    assert!((first.yhat - clamped).abs() < 1e-12);
    assert_eq!(first.clipped, direct != clamped);

    // Too few values is a synchronous client error naming the minimum.
    let err = service::predict_do(
        State(state),
        Json(PredictRequest {
            series: vec![8.0; LAGS - 1],
            lags: None,
        }),
    )
    .await
    .unwrap_err();
    let (status, Json(body)) = err;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], format!("need at least {} values", LAGS));
}
