// Market data sources. Every failure here stays a source error; the strategy code never does I/O.
use async_trait::async_trait;
use shared::models::{Candle, TimeFrame};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::csv_parser::KlineCsvParser;
use super::market_data::MarketDataStore;
use crate::error::EngineError;

#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Up to `limit` most recent candles, oldest first.
    async fn fetch(&self, symbol: &str, interval: TimeFrame, limit: usize) -> Result<Vec<Candle>, EngineError>;

    fn describe(&self) -> String;
}

/// Reads candles from a `time,open,high,low,close` CSV file on every fetch.
/// The file is assumed to hold a single instrument at a single interval.
pub struct CsvCandleSource {
    path: PathBuf,
}

impl CsvCandleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CandleSource for CsvCandleSource {
    async fn fetch(&self, symbol: &str, interval: TimeFrame, limit: usize) -> Result<Vec<Candle>, EngineError> {
        let path = self.path.clone();
        let mut candles = tokio::task::spawn_blocking(move || KlineCsvParser::load_candles_from_csv(path))
            .await
            .map_err(|e| EngineError::DataSourceError(format!("CSV loader task failed: {}", e)))??;

        let skip = candles.len().saturating_sub(limit);
        candles.drain(..skip);
        tracing::debug!(%symbol, %interval, count = candles.len(), path = %self.path.display(), "Loaded candles from CSV");
        Ok(candles)
    }

    fn describe(&self) -> String {
        format!("csv file {}", self.path.display())
    }
}

/// Serves repeated fetches inside the TTL window from the last snapshot.
/// The TTL must stay below the refresh period, or a tick can be handed the
/// previous tick's snapshot.
pub struct CachedSource<S> {
    inner: S,
    store: RwLock<MarketDataStore>,
}

impl<S: CandleSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            store: RwLock::new(MarketDataStore::new(ttl)),
        }
    }
}

#[async_trait]
impl<S: CandleSource> CandleSource for CachedSource<S> {
    async fn fetch(&self, symbol: &str, interval: TimeFrame, limit: usize) -> Result<Vec<Candle>, EngineError> {
        let now = Instant::now();
        if let Some(candles) = self.store.read().await.get_fresh(symbol, interval, limit, now) {
            tracing::debug!(%symbol, %interval, "Serving cached candle snapshot");
            return Ok(candles);
        }

        let candles = self.inner.fetch(symbol, interval, limit).await?;
        let mut store = self.store.write().await;
        store.evict_expired(now);
        store.put(symbol, interval, limit, candles.clone(), now);
        Ok(candles)
    }

    fn describe(&self) -> String {
        format!("cached {}", self.inner.describe())
    }
}
