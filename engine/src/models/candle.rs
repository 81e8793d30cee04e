// Validated candle series. The raw `Candle` lives in `shared::models`; the engine only
// ever analyses a `CandleSeries`, so every invariant below holds inside the strategy code.
use crate::error::EngineError;
use shared::models::Candle;
use std::ops::Deref;

/// An immutable, time-ordered run of candles for one instrument and interval.
///
/// Construction checks that timestamps strictly increase and that every candle
/// satisfies `low <= open, close <= high` with finite prices. Offending input is
/// rejected, never clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(candles: Vec<Candle>) -> Result<Self, EngineError> {
        for (index, candle) in candles.iter().enumerate() {
            validate_candle(index, candle)?;
            if index > 0 && candle.timestamp <= candles[index - 1].timestamp {
                return Err(EngineError::UnorderedSeries { index });
            }
        }
        Ok(Self { candles })
    }

    pub fn into_inner(self) -> Vec<Candle> {
        self.candles
    }
}

impl Deref for CandleSeries {
    type Target = [Candle];

    fn deref(&self) -> &Self::Target {
        &self.candles
    }
}

fn validate_candle(index: usize, candle: &Candle) -> Result<(), EngineError> {
    let malformed = |reason: String| EngineError::MalformedCandle {
        index,
        timestamp: candle.timestamp,
        reason,
    };

    let prices = [candle.open, candle.high, candle.low, candle.close];
    if prices.iter().any(|p| !p.is_finite()) {
        return Err(malformed(format!(
            "non-finite price (open {}, high {}, low {}, close {})",
            candle.open, candle.high, candle.low, candle.close
        )));
    }
    if candle.low > candle.high {
        return Err(malformed(format!("low {} is above high {}", candle.low, candle.high)));
    }
    for (name, value) in [("open", candle.open), ("close", candle.close)] {
        if value < candle.low || value > candle.high {
            return Err(malformed(format!(
                "{} {} outside range [{}, {}]",
                name, value, candle.low, candle.high
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn candle_at(minute: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minute),
            open,
            high,
            low,
            close,
        }
    }

    #[test]
    fn test_valid_series_is_accepted() {
        let series = CandleSeries::new(vec![
            candle_at(0, 10.0, 11.0, 9.0, 10.5),
            candle_at(15, 10.5, 10.5, 10.5, 10.5),
        ])
        .unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.iter().all(|c| c.close == 10.5));
    }

    #[test]
    fn test_empty_series_is_accepted() {
        assert!(CandleSeries::new(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_close_above_high_is_rejected() {
        let result = CandleSeries::new(vec![
            candle_at(0, 10.0, 11.0, 9.0, 10.5),
            candle_at(15, 10.0, 11.0, 9.0, 12.0),
        ]);
        match result {
            Err(EngineError::MalformedCandle { index, reason, .. }) => {
                assert_eq!(index, 1);
                assert!(reason.contains("close 12"));
            }
            other => panic!("expected MalformedCandle, got {:?}", other),
        }
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let result = CandleSeries::new(vec![candle_at(0, 10.0, 9.0, 11.0, 10.0)]);
        assert!(matches!(result, Err(EngineError::MalformedCandle { index: 0, .. })));
    }

    #[test]
    fn test_nan_price_is_rejected() {
        let result = CandleSeries::new(vec![candle_at(0, 10.0, 11.0, 9.0, f64::NAN)]);
        assert!(matches!(result, Err(EngineError::MalformedCandle { .. })));
    }

    #[test]
    fn test_duplicate_timestamp_is_rejected() {
        let result = CandleSeries::new(vec![
            candle_at(0, 10.0, 11.0, 9.0, 10.5),
            candle_at(0, 10.0, 11.0, 9.0, 10.5),
        ]);
        assert!(matches!(result, Err(EngineError::UnorderedSeries { index: 1 })));
    }
}
