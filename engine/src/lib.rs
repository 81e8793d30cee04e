// Engine library root: moving-average setup detection plus the data sources,
// refresh loop and gRPC service that surround it.

pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod models;
pub mod scanner;
pub mod services;
pub mod strategy;

pub use error::EngineError;
pub use models::{CandleSeries, SignalReport};
pub use strategy::{compute_indicators, detect_setups, SetupDetector, StrategyParams};
