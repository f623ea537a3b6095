// do_forecast - dissolved-oxygen forecasting from lagged sensor readings.
// Two binaries share this library: `train` fits and persists the pipeline,
// `serve` loads it once and answers predictions over HTTP.

pub mod config;
pub mod data;
pub mod features;
pub mod model;
pub mod persist;
pub mod service;

pub use data::SensorTable;
pub use model::DoPipeline;
