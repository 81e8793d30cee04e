// Binance spot kline REST source
use async_trait::async_trait;
use chrono::DateTime;
use serde_json::Value;
use shared::models::{Candle, TimeFrame};
use tracing::debug;

use super::source::CandleSource;
use crate::error::EngineError;

pub const BINANCE_API_URL: &str = "https://api.binance.com";

/// Binance caps a single klines request at 1000 rows.
const MAX_LIMIT: usize = 1000;

pub struct BinanceKlineSource {
    client: reqwest::Client,
    base_url: String,
}

impl BinanceKlineSource {
    pub fn new() -> Self {
        Self::with_base_url(BINANCE_API_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn klines_url(&self, symbol: &str, interval: TimeFrame, limit: usize) -> String {
        format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url.trim_end_matches('/'),
            symbol,
            interval.as_str(),
            limit.min(MAX_LIMIT)
        )
    }
}

impl Default for BinanceKlineSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CandleSource for BinanceKlineSource {
    async fn fetch(&self, symbol: &str, interval: TimeFrame, limit: usize) -> Result<Vec<Candle>, EngineError> {
        let url = self.klines_url(symbol, interval, limit);
        debug!("Fetching K-lines: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| EngineError::DataSourceError(format!("K-line request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(EngineError::DataSourceError(format!("K-line API error: {}", response.status())));
        }

        let rows: Vec<Vec<Value>> = response
            .json()
            .await
            .map_err(|e| EngineError::DataSourceError(format!("K-line parse error: {}", e)))?;

        let candles = rows
            .iter()
            .enumerate()
            .map(|(i, row)| parse_kline_row(row).map_err(|e| EngineError::DataSourceError(format!("K-line row {}: {}", i, e))))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Fetched {} K-lines for {}", candles.len(), symbol);
        Ok(candles)
    }

    fn describe(&self) -> String {
        format!("binance klines ({})", self.base_url)
    }
}

/// `[open_time_ms, "open", "high", "low", "close", "volume", close_time_ms, ...]`
pub(crate) fn parse_kline_row(row: &[Value]) -> Result<Candle, String> {
    if row.len() < 5 {
        return Err(format!("expected at least 5 fields, got {}", row.len()));
    }

    let open_time = row[0].as_i64().ok_or_else(|| format!("open time is not an integer: {}", row[0]))?;
    let timestamp = DateTime::from_timestamp_millis(open_time).ok_or_else(|| format!("open time {} out of range", open_time))?;

    let price = |idx: usize, name: &str| -> Result<f64, String> {
        match &row[idx] {
            Value::String(s) => s.parse::<f64>().map_err(|e| format!("{} '{}': {}", name, s, e)),
            Value::Number(n) => n.as_f64().ok_or_else(|| format!("{} {} is not representable", name, n)),
            other => Err(format!("{} has unexpected type: {}", name, other)),
        }
    };

    Ok(Candle {
        timestamp,
        open: price(1, "open")?,
        high: price(2, "high")?,
        low: price(3, "low")?,
        close: price(4, "close")?,
    })
}
