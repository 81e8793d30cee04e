// Technical indicators module
pub mod sma;

pub use sma::Sma;

use serde_json::Value;
use shared::models::{Candle, Indicator};

// Common trait for all indicators
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Value; // Parameters used for this indicator instance
    fn calculate(&self, data: &[Candle]) -> Vec<Option<f64>>; // None until enough data has been seen

    /// Runs the calculation and packages it with its name and parameters.
    fn indicator(&self, data: &[Candle]) -> Indicator {
        Indicator {
            name: self.name().to_string(),
            parameters: self.parameters(),
            values: self.calculate(data),
        }
    }
}
