use shared::models::Candle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleBias {
    Bullish,
    Bearish,
    /// close == open
    Neutral,
}

impl From<&Candle> for CandleBias {
    fn from(candle: &Candle) -> Self {
        if candle.is_bullish() {
            CandleBias::Bullish
        } else if candle.is_bearish() {
            CandleBias::Bearish
        } else {
            CandleBias::Neutral
        }
    }
}

/// True when `close` lies strictly within `threshold` of either average.
/// An undefined average never counts as near.
pub fn near_average(close: f64, fast: Option<f64>, slow: Option<f64>, threshold: f64) -> bool {
    [fast, slow]
        .into_iter()
        .flatten()
        .any(|average| (close - average).abs() < threshold)
}
