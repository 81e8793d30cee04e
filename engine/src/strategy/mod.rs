// Dual moving-average setup detection. A setup fires on a candle when both
// averages moved the same way since the previous candle, the candle's body agrees
// with that move and the close sits near one of the averages. Buy and Sell are
// mutually exclusive, so there is at most one setup per candle.

pub mod params;
pub mod pattern;
pub mod risk;
pub mod trend;

pub use params::StrategyParams;

use crate::error::EngineError;
use crate::indicators::{IndicatorCalculator, Sma};
use crate::models::CandleSeries;
use pattern::{near_average, CandleBias};
use shared::models::{Direction, Indicator, TradeSetup};
use trend::Trend;

/// Stateless detector; every call recomputes from the series it is given.
#[derive(Debug, Clone, Default)]
pub struct SetupDetector {
    params: StrategyParams,
}

impl SetupDetector {
    pub fn new(params: StrategyParams) -> Result<Self, EngineError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &StrategyParams {
        &self.params
    }

    fn ensure_len(&self, actual: usize) -> Result<(), EngineError> {
        let required = self.params.min_series_len();
        if actual < required {
            return Err(EngineError::InsufficientData { required, actual });
        }
        Ok(())
    }

    /// Fast and slow SMAs over the closes, packaged for charting.
    pub fn indicators(&self, series: &CandleSeries) -> Result<(Indicator, Indicator), EngineError> {
        self.ensure_len(series.len())?;
        let fast = Sma::new(self.params.fast_period)?;
        let slow = Sma::new(self.params.slow_period)?;
        Ok((fast.indicator(series), slow.indicator(series)))
    }

    pub fn compute_indicators(&self, series: &CandleSeries) -> Result<(Vec<Option<f64>>, Vec<Option<f64>>), EngineError> {
        let (fast, slow) = self.indicators(series)?;
        Ok((fast.values, slow.values))
    }

    /// Scans every candle from `slow_period` onwards and returns the qualifying
    /// setups in ascending time order.
    pub fn detect_setups(
        &self,
        series: &CandleSeries,
        fast_ma: &[Option<f64>],
        slow_ma: &[Option<f64>],
    ) -> Result<Vec<TradeSetup>, EngineError> {
        self.ensure_len(series.len())?;
        if fast_ma.len() != series.len() || slow_ma.len() != series.len() {
            return Err(EngineError::IndicatorLengthMismatch {
                series: series.len(),
                fast: fast_ma.len(),
                slow: slow_ma.len(),
            });
        }

        let mut setups = Vec::new();
        for i in self.params.first_scan_index()..series.len() {
            let row = &series[i];
            let trend = trend::classify(fast_ma[i - 1], fast_ma[i], slow_ma[i - 1], slow_ma[i]);
            let direction = match (trend, CandleBias::from(row)) {
                (Trend::Rising, CandleBias::Bullish) => Direction::Buy,
                (Trend::Falling, CandleBias::Bearish) => Direction::Sell,
                _ => continue,
            };
            if !near_average(row.close, fast_ma[i], slow_ma[i], self.params.proximity) {
                continue;
            }

            let setup = risk::build_setup(direction, row, self.params.reward_risk);
            tracing::debug!(
                index = i,
                direction = %setup.direction,
                entry = setup.entry,
                stop_loss = setup.stop_loss,
                target = setup.target,
                "Setup detected"
            );
            setups.push(setup);
        }
        Ok(setups)
    }
}

/// SMA(20) and SMA(50) of the closes.
pub fn compute_indicators(series: &CandleSeries) -> Result<(Vec<Option<f64>>, Vec<Option<f64>>), EngineError> {
    SetupDetector::default().compute_indicators(series)
}

/// Setups under the reference policy (20/50 SMAs, 20-unit band, 2:1 target).
pub fn detect_setups(
    series: &CandleSeries,
    ma20: &[Option<f64>],
    ma50: &[Option<f64>],
) -> Result<Vec<TradeSetup>, EngineError> {
    SetupDetector::default().detect_setups(series, ma20, ma50)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use shared::models::Candle;

    fn ts(i: usize) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::minutes(15 * i as i64)
    }

    fn bullish(i: usize, close: f64) -> Candle {
        Candle { timestamp: ts(i), open: close - 0.5, high: close + 0.5, low: close - 1.0, close }
    }

    fn bearish(i: usize, close: f64) -> Candle {
        Candle { timestamp: ts(i), open: close + 0.5, high: close + 1.0, low: close - 0.5, close }
    }

    fn doji(i: usize, close: f64) -> Candle {
        Candle { timestamp: ts(i), open: close, high: close + 1.0, low: close - 1.0, close }
    }

    fn series_of(candles: Vec<Candle>) -> CandleSeries {
        CandleSeries::new(candles).unwrap()
    }

    fn run(series: &CandleSeries) -> Vec<TradeSetup> {
        let (ma20, ma50) = compute_indicators(series).unwrap();
        detect_setups(series, &ma20, &ma50).unwrap()
    }

    fn flat_then(last: Candle, flat_close: f64) -> CandleSeries {
        let mut candles: Vec<Candle> = (0..50).map(|i| doji(i, flat_close)).collect();
        candles.push(last);
        series_of(candles)
    }

    #[test]
    fn test_short_series_is_insufficient() {
        let series = series_of((0..50).map(|i| bullish(i, 100.0 + i as f64)).collect());
        assert!(matches!(
            compute_indicators(&series),
            Err(EngineError::InsufficientData { required: 51, actual: 50 })
        ));
        let padding = vec![Some(1.0); 50];
        assert!(matches!(
            detect_setups(&series, &padding, &padding),
            Err(EngineError::InsufficientData { required: 51, actual: 50 })
        ));
    }

    #[test]
    fn test_indicator_shape() {
        let series = series_of((0..60).map(|i| bullish(i, 100.0 + i as f64)).collect());
        let (ma20, ma50) = compute_indicators(&series).unwrap();
        assert_eq!(ma20.len(), 60);
        assert_eq!(ma50.len(), 60);
        assert!(ma20[..19].iter().all(Option::is_none));
        assert!(ma20[19..].iter().all(Option::is_some));
        assert!(ma50[..49].iter().all(Option::is_none));
        assert_eq!(ma50[49], Some(124.5));
        assert_eq!(ma20[59], Some(149.5));
    }

    #[test]
    fn test_flat_series_yields_nothing() {
        let series = series_of((0..60).map(|i| doji(i, 100.0)).collect());
        assert!(run(&series).is_empty());

        // Coloured candles on a flat close still have no trend.
        let candles = (0..60)
            .map(|i| Candle { timestamp: ts(i), open: 99.0, high: 101.0, low: 98.0, close: 100.0 })
            .collect();
        assert!(run(&series_of(candles)).is_empty());
    }

    #[test]
    fn test_rising_series_yields_buys_at_every_scanned_index() {
        let series = series_of((0..60).map(|i| bullish(i, (i + 1) as f64)).collect());
        let setups = run(&series);

        assert_eq!(setups.len(), 10);
        for (setup, i) in setups.iter().zip(50..60) {
            let close = (i + 1) as f64;
            assert_eq!(setup.direction, Direction::Buy);
            assert_eq!(setup.time, ts(i));
            assert_eq!(setup.entry, close);
            assert_eq!(setup.stop_loss, close - 1.0);
            assert_eq!(setup.target, close + 2.0 * (close - (close - 1.0)));
        }
    }

    #[test]
    fn test_falling_series_yields_sells() {
        let series = series_of((0..60).map(|i| bearish(i, 200.0 - i as f64)).collect());
        let setups = run(&series);

        assert_eq!(setups.len(), 10);
        for (setup, i) in setups.iter().zip(50..60) {
            let close = 200.0 - i as f64;
            assert_eq!(setup.direction, Direction::Sell);
            assert_eq!(setup.entry, close);
            assert_eq!(setup.stop_loss, close + 1.0);
            assert_eq!(setup.target, close - 2.0);
        }
    }

    #[test]
    fn test_wrong_candle_colour_is_ignored() {
        let rising_bearish = series_of((0..60).map(|i| bearish(i, (i + 1) as f64)).collect());
        assert!(run(&rising_bearish).is_empty());

        let rising_doji = series_of((0..60).map(|i| doji(i, (i + 1) as f64)).collect());
        assert!(run(&rising_doji).is_empty());
    }

    #[test]
    fn test_close_far_from_both_averages_is_ignored() {
        // MA20 trails by 47.5 and MA50 by 122.5 on a steep climb.
        let steep = series_of((0..60).map(|i| bullish(i, 100.0 + 5.0 * i as f64)).collect());
        assert!(run(&steep).is_empty());

        // Trend and colour agree at index 50, but the close is ~28.5 above MA20 and ~29.4 above MA50.
        let spike = flat_then(Candle { timestamp: ts(50), open: 128.0, high: 131.0, low: 127.0, close: 130.0 }, 100.0);
        let (ma20, ma50) = compute_indicators(&spike).unwrap();
        assert_eq!(trend::classify(ma20[49], ma20[50], ma50[49], ma50[50]), Trend::Rising);
        assert!(detect_setups(&spike, &ma20, &ma50).unwrap().is_empty());
    }

    #[test]
    fn test_minimum_length_evaluates_only_the_last_candle() {
        let breakout = flat_then(Candle { timestamp: ts(50), open: 105.0, high: 111.0, low: 104.0, close: 110.0 }, 100.0);
        let setups = run(&breakout);
        assert_eq!(setups.len(), 1);
        assert_eq!(setups[0].direction, Direction::Buy);
        assert_eq!(setups[0].time, ts(50));
        assert_eq!(setups[0].entry, 110.0);
        assert_eq!(setups[0].stop_loss, 104.0);
        assert_eq!(setups[0].target, 122.0);

        let quiet = series_of((0..51).map(|i| doji(i, 100.0)).collect());
        assert!(run(&quiet).is_empty());
    }

    #[test]
    fn test_mixed_trend_is_ignored() {
        // At index 50 the fast SMA gains (150 replaces 100) while the slow SMA loses (150 replaces 200).
        let mut candles = vec![doji(0, 200.0)];
        candles.extend((1..=30).map(|i| doji(i, 100.0)));
        candles.extend((31..50).map(|i| doji(i, 140.0)));
        candles.push(bullish(50, 150.0));
        let series = series_of(candles);

        let (ma20, ma50) = compute_indicators(&series).unwrap();
        assert!(ma20[50] > ma20[49]);
        assert!(ma50[50] < ma50[49]);
        assert!(detect_setups(&series, &ma20, &ma50).unwrap().is_empty());
    }

    #[test]
    fn test_undefined_indicator_samples_never_trigger() {
        let series = series_of((0..60).map(|i| bullish(i, (i + 1) as f64)).collect());
        let (ma20, mut ma50) = compute_indicators(&series).unwrap();
        ma50[55] = None;
        let setups = detect_setups(&series, &ma20, &ma50).unwrap();
        // Index 55 loses its own sample and index 56 its predecessor.
        assert_eq!(setups.len(), 8);
        assert!(setups.iter().all(|s| s.time != ts(55) && s.time != ts(56)));
    }

    #[test]
    fn test_mismatched_indicator_lengths_rejected() {
        let series = series_of((0..60).map(|i| bullish(i, (i + 1) as f64)).collect());
        let (ma20, ma50) = compute_indicators(&series).unwrap();
        let result = detect_setups(&series, &ma20[1..], &ma50);
        assert!(matches!(
            result,
            Err(EngineError::IndicatorLengthMismatch { series: 60, fast: 59, slow: 60 })
        ));
    }

    #[test]
    fn test_setup_invariants_on_a_wandering_series() {
        let candles: Vec<Candle> = (0..300)
            .map(|i| {
                let x = i as f64;
                let close = 1000.0 + 40.0 * (x / 23.0).sin() + 6.0 * (x / 3.0).cos();
                let open = close + 3.0 * (x * 1.7).sin();
                Candle {
                    timestamp: ts(i),
                    open,
                    high: open.max(close) + 2.0,
                    low: open.min(close) - 2.0,
                    close,
                }
            })
            .collect();
        let series = series_of(candles);
        let (ma20, ma50) = compute_indicators(&series).unwrap();
        let setups = detect_setups(&series, &ma20, &ma50).unwrap();
        assert!(!setups.is_empty());

        for pair in setups.windows(2) {
            assert!(pair[0].time < pair[1].time);
        }
        for setup in &setups {
            let i = series.iter().position(|c| c.timestamp == setup.time).unwrap();
            assert!(i >= 50);
            let trend = trend::classify(ma20[i - 1], ma20[i], ma50[i - 1], ma50[i]);
            assert_ne!(trend, Trend::Undecided);
            assert!(near_average(setup.entry, ma20[i], ma50[i], 20.0));
            assert!((setup.reward() - 2.0 * setup.risk()).abs() < 1e-9);
            match setup.direction {
                Direction::Buy => assert!(setup.target > setup.entry && setup.entry > setup.stop_loss),
                Direction::Sell => assert!(setup.target < setup.entry && setup.entry < setup.stop_loss),
            }
        }
    }

    #[test]
    fn test_custom_params_shift_the_scan_window() {
        let params = StrategyParams { fast_period: 5, slow_period: 10, proximity: 50.0, reward_risk: 3.0 };
        let detector = SetupDetector::new(params).unwrap();
        let series = series_of((0..12).map(|i| bullish(i, (i + 1) as f64)).collect());
        let (fast, slow) = detector.compute_indicators(&series).unwrap();
        let setups = detector.detect_setups(&series, &fast, &slow).unwrap();
        assert_eq!(setups.len(), 2);
        assert_eq!(setups[0].time, ts(10));
        assert_eq!(setups[0].target, 11.0 + 3.0);
    }

    #[test]
    fn test_invalid_params_rejected_by_detector() {
        let params = StrategyParams { slow_period: 10, fast_period: 10, ..Default::default() };
        assert!(matches!(SetupDetector::new(params), Err(EngineError::ConfigError(_))));
    }
}
