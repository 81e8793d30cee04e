// Engine-side models. Raw candles and setups come from `shared::models`.
pub mod candle;
pub mod report;

pub use candle::CandleSeries;
pub use report::SignalReport;
