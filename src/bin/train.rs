use anyhow::{Context, Result};

use do_forecast::config::TrainConfig;
use do_forecast::data;
use do_forecast::features::{make_supervised, time_split};
use do_forecast::model::{self, DoPipeline};
use do_forecast::persist;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = TrainConfig::from_env();
    tracing::info!(
        csv = %cfg.csv_path.display(),
        target = %cfg.target,
        lags = cfg.lags,
        "starting training run"
    );

    let table = data::smart_read_csv(&cfg.csv_path, &cfg.target)
        .with_context(|| format!("failed to load {}", cfg.csv_path.display()))?;
    tracing::info!(rows = table.len(), "cleaned sensor log");

    let (x, y) = make_supervised(&table, cfg.lags);
    let (x_train, x_test, y_train, y_test) = time_split(x, y, cfg.train_ratio);

    let pipeline = DoPipeline::fit(&x_train, &y_train, cfg.lags)?;
    let predictions = pipeline.predict_batch(&x_test)?;
    let mae = model::mean_absolute_error(&predictions, y_test.as_slice().unwrap_or(&[]));

    tracing::info!(
        mae,
        n_train = x_train.nrows(),
        n_test = x_test.nrows(),
        lags = cfg.lags,
        "training complete"
    );

    let model_path = persist::save_pipeline(&cfg.models_dir, &cfg.target, &pipeline, mae)?;
    tracing::info!(path = %model_path.display(), "pipeline saved");
    Ok(())
}
