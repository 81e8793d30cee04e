use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Tunables of the dual moving-average setup strategy.
///
/// The defaults are the reference policy: SMA(20) and SMA(50), a fixed
/// absolute proximity band of 20 price units, and a 2:1 reward-to-risk target.
/// The proximity band is not scaled by price or volatility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    pub fast_period: usize,
    pub slow_period: usize,
    /// Close must be strictly closer than this to either average.
    pub proximity: f64,
    pub reward_risk: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            fast_period: 20,
            slow_period: 50,
            proximity: 20.0,
            reward_risk: 2.0,
        }
    }
}

impl StrategyParams {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.fast_period == 0 {
            return Err(EngineError::ConfigError("fast_period must be greater than 0".to_string()));
        }
        if self.slow_period <= self.fast_period {
            return Err(EngineError::ConfigError(format!(
                "slow_period ({}) must be greater than fast_period ({})",
                self.slow_period, self.fast_period
            )));
        }
        if !self.proximity.is_finite() || self.proximity <= 0.0 {
            return Err(EngineError::ConfigError(format!("proximity must be positive, got {}", self.proximity)));
        }
        if !self.reward_risk.is_finite() || self.reward_risk <= 0.0 {
            return Err(EngineError::ConfigError(format!("reward_risk must be positive, got {}", self.reward_risk)));
        }
        Ok(())
    }

    /// First index the scan evaluates; both averages are defined there and one sample earlier.
    pub fn first_scan_index(&self) -> usize {
        self.slow_period
    }

    pub fn min_series_len(&self) -> usize {
        self.slow_period + 1
    }
}
