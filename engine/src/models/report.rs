use chrono::{DateTime, Utc};
use shared::models::{Candle, Indicator, TimeFrame, TradeSetup};
use shared::utils::{latest, setups_summary};
use uuid::Uuid;

/// Everything one refresh cycle produced, ready for charting and tabular display.
#[derive(Debug, Clone)]
pub struct SignalReport {
    pub cycle_id: Uuid,
    pub symbol: String,
    pub interval: TimeFrame,
    pub generated_at: DateTime<Utc>,
    pub candles: Vec<Candle>,
    pub fast_ma: Indicator,
    pub slow_ma: Indicator,
    /// All setups for the window, ascending by time.
    pub setups: Vec<TradeSetup>,
}

impl SignalReport {
    pub fn latest_setups(&self, n: usize) -> &[TradeSetup] {
        latest(&self.setups, n)
    }

    pub fn summary(&self) -> String {
        setups_summary(&self.setups)
    }
}
