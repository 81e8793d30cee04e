// Snapshot cache for fetched candle windows, one entry per symbol and timeframe.
use shared::models::{Candle, TimeFrame};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Snapshot {
    fetched_at: Instant,
    limit: usize,
    candles: Vec<Candle>,
}

/// Holds the last fetched window per (symbol, timeframe). Entries older than the
/// TTL are treated as missing, so a refresh inside the window sees the same snapshot.
/// Ages are measured on the monotonic clock the refresh loop ticks on.
pub struct MarketDataStore {
    ttl: Duration,
    data: HashMap<(String, TimeFrame), Snapshot>,
}

impl MarketDataStore {
    pub fn new(ttl: Duration) -> Self {
        MarketDataStore {
            ttl,
            data: HashMap::new(),
        }
    }

    pub fn put(&mut self, symbol: &str, timeframe: TimeFrame, limit: usize, candles: Vec<Candle>, now: Instant) {
        self.data.insert(
            (symbol.to_string(), timeframe),
            Snapshot { fetched_at: now, limit, candles },
        );
    }

    /// A fresh snapshot fetched with the same lookback, if any.
    pub fn get_fresh(&self, symbol: &str, timeframe: TimeFrame, limit: usize, now: Instant) -> Option<Vec<Candle>> {
        self.data
            .get(&(symbol.to_string(), timeframe))
            .filter(|snapshot| snapshot.limit == limit && now.saturating_duration_since(snapshot.fetched_at) < self.ttl)
            .map(|snapshot| snapshot.candles.clone())
    }

    pub fn evict_expired(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.data.retain(|_, snapshot| now.saturating_duration_since(snapshot.fetched_at) < ttl);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for MarketDataStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(840))
    }
}
