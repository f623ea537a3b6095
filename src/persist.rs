//! Artifact persistence: binary pipeline plus a human-readable metadata file.
//!
//! Writes are unconditional overwrites. There is no versioning and no atomic
//! replace; the trainer is the only writer and it runs offline.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::DoPipeline;

pub const META_FILE: &str = "meta.json";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("pipeline serialization error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("metadata serialization error: {0}")]
    Meta(#[from] serde_json::Error),
}

/// Informational record written beside the artifact, keyed by target column.
/// The serving side does not read it.
#[derive(Debug, Serialize, Deserialize)]
pub struct TargetMeta {
    #[serde(rename = "MAE")]
    pub mae: f64,
    pub lags: usize,
}

/// Persist the fitted pipeline and its metadata, creating the directory if
/// needed. Returns the path of the binary artifact.
pub fn save_pipeline(
    dir: &Path,
    target: &str,
    pipeline: &DoPipeline,
    mae: f64,
) -> Result<PathBuf, PersistError> {
    fs::create_dir_all(dir).map_err(|e| PersistError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let model_path = dir.join(format!("{target}.bin"));
    let bytes = bincode::serialize(pipeline)?;
    fs::write(&model_path, bytes).map_err(|e| PersistError::Io {
        path: model_path.clone(),
        source: e,
    })?;

    let mut meta = BTreeMap::new();
    meta.insert(
        target.to_string(),
        TargetMeta {
            mae,
            lags: pipeline.lags,
        },
    );
    let meta_path = dir.join(META_FILE);
    let json = serde_json::to_string_pretty(&meta)?;
    fs::write(&meta_path, json).map_err(|e| PersistError::Io {
        path: meta_path,
        source: e,
    })?;

    Ok(model_path)
}

/// Load a pipeline artifact from disk. Any failure here is fatal to the
/// serving process; there is no fallback model.
pub fn load_pipeline(path: &Path) -> Result<DoPipeline, PersistError> {
    let bytes = fs::read(path).map_err(|e| PersistError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(bincode::deserialize(&bytes)?)
}
