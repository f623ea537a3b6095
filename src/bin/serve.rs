use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};

use do_forecast::config::ServeConfig;
use do_forecast::persist;
use do_forecast::service::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = ServeConfig::from_env();
    let pipeline = persist::load_pipeline(&cfg.model_path)
        .with_context(|| format!("failed to load pipeline from {}", cfg.model_path.display()))?;

    if pipeline.lags != service::MODEL_LAGS {
        tracing::warn!(
            artifact_lags = pipeline.lags,
            serving_lags = service::MODEL_LAGS,
            "artifact lag count differs from serving constant"
        );
    }

    // Warmup to make sure the artifact actually predicts
    let _ = pipeline.predict(&vec![0.0; pipeline.lags])?;
    tracing::info!("warmup forward ok");

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };
    let app = service::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
