use std::env;
use std::path::PathBuf;

/// Settings for the offline training run, read from the environment.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub csv_path: PathBuf,
    pub target: String,
    pub lags: usize,
    pub train_ratio: f64,
    pub models_dir: PathBuf,
}

impl TrainConfig {
    pub fn from_env() -> Self {
        Self {
            csv_path: env::var("CSV_PATH")
                .unwrap_or_else(|_| "data.csv".to_string())
                .into(),
            target: env::var("TARGET").unwrap_or_else(|_| "do_mg_L".to_string()),
            lags: env::var("LAGS").ok().and_then(|s| s.parse().ok()).unwrap_or(6),
            train_ratio: env::var("TRAIN_RATIO")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.8),
            models_dir: env::var("MODELS_DIR")
                .unwrap_or_else(|_| "models".to_string())
                .into(),
        }
    }
}

/// Settings for the prediction service.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub model_path: PathBuf,
    pub port: u16,
}

impl ServeConfig {
    pub fn from_env() -> Self {
        Self {
            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| "models/do_mg_L.bin".to_string())
                .into(),
            port: env::var("PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(5001),
        }
    }
}
