//! Forecast collaborator and forecast/signal reconciliation

pub mod forecaster;
pub mod reconciler;

pub use forecaster::{forecast_inputs, Forecaster, ForecastInputs, RemoteForecaster};
pub use reconciler::{analyze_forecast, reconcile, ForecastVeto, FLAT_SPREAD};
