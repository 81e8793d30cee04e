// Simple Moving Average (SMA) indicator implementation
use super::IndicatorCalculator;
use crate::error::EngineError;
use serde_json::Value;
use shared::models::Candle;

pub struct Sma {
    name: String,
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, EngineError> {
        if period == 0 {
            return Err(EngineError::ConfigError("SMA period must be greater than 0".to_string()));
        }
        Ok(Self {
            name: format!("SMA({})", period),
            period,
        })
    }
}

impl IndicatorCalculator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, data: &[Candle]) -> Vec<Option<f64>> {
        if data.len() < self.period {
            return vec![None; data.len()];
        }

        let mut results = vec![None; self.period - 1]; // No SMA until the first window fills

        // Each window is summed on its own rather than slid, so identical windows
        // always yield bit-identical means and a flat series never reads as trending.
        let closes: Vec<f64> = data.iter().map(|c| c.close).collect();
        results.extend(
            closes
                .windows(self.period)
                .map(|window| Some(window.iter().sum::<f64>() / self.period as f64)),
        );
        results
    }
}
