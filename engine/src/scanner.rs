// Refresh loop: pull a candle window, run the detector, publish the result.
// Nothing computed in one cycle feeds the next. The last good report stays
// published while the data source is failing.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use shared::models::{Candle, TimeFrame};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::data::CandleSource;
use crate::error::EngineError;
use crate::models::{CandleSeries, SignalReport};
use crate::strategy::SetupDetector;

#[derive(Debug, Clone)]
pub enum ScanStatus {
    /// No cycle has completed yet.
    Pending,
    Ready(Arc<SignalReport>),
    NotEnoughData { required: usize, actual: usize },
    Failed(String),
}

/// Validates `candles` and runs both engine passes over them.
pub fn analyze(
    detector: &SetupDetector,
    cycle_id: Uuid,
    symbol: &str,
    interval: TimeFrame,
    candles: Vec<Candle>,
) -> Result<SignalReport, EngineError> {
    let series = CandleSeries::new(candles)?;
    let (fast_ma, slow_ma) = detector.indicators(&series)?;
    let setups = detector.detect_setups(&series, &fast_ma.values, &slow_ma.values)?;

    Ok(SignalReport {
        cycle_id,
        symbol: symbol.to_string(),
        interval,
        generated_at: Utc::now(),
        candles: series.into_inner(),
        fast_ma,
        slow_ma,
        setups,
    })
}

pub struct Scanner {
    source: Arc<dyn CandleSource>,
    detector: SetupDetector,
    symbol: String,
    interval: TimeFrame,
    lookback: usize,
    status_tx: watch::Sender<ScanStatus>,
}

impl Scanner {
    pub fn new(
        source: Arc<dyn CandleSource>,
        detector: SetupDetector,
        symbol: impl Into<String>,
        interval: TimeFrame,
        lookback: usize,
    ) -> Self {
        let (status_tx, _) = watch::channel(ScanStatus::Pending);
        Self {
            source,
            detector,
            symbol: symbol.into(),
            interval,
            lookback,
            status_tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanStatus> {
        self.status_tx.subscribe()
    }

    pub fn status(&self) -> ScanStatus {
        self.status_tx.borrow().clone()
    }

    /// Runs one fetch-and-analyse cycle and publishes its outcome.
    pub async fn run_cycle(&self) -> ScanStatus {
        let cycle_id = Uuid::new_v4();
        let span = tracing::info_span!("scan_cycle", %cycle_id, symbol = %self.symbol, interval = %self.interval);
        let status = self.cycle(cycle_id).instrument(span).await;

        match &status {
            Some(status) => {
                self.status_tx.send_replace(status.clone());
                status.clone()
            }
            None => self.status(),
        }
    }

    /// `None` means keep whatever was published before.
    async fn cycle(&self, cycle_id: Uuid) -> Option<ScanStatus> {
        let candles = match self.source.fetch(&self.symbol, self.interval, self.lookback).await {
            Ok(candles) => candles,
            Err(e) => {
                let keep_previous = matches!(*self.status_tx.borrow(), ScanStatus::Ready(_));
                warn!(error = %e, source = %self.source.describe(), keep_previous, "Candle fetch failed");
                return if keep_previous { None } else { Some(ScanStatus::Failed(e.to_string())) };
            }
        };

        let status = match analyze(&self.detector, cycle_id, &self.symbol, self.interval, candles) {
            Ok(report) => {
                info!(
                    candles = report.candles.len(),
                    setups = report.setups.len(),
                    summary = %report.summary(),
                    "Scan complete"
                );
                ScanStatus::Ready(Arc::new(report))
            }
            Err(EngineError::InsufficientData { required, actual }) => {
                warn!(required, actual, "Not enough candles to analyse yet");
                ScanStatus::NotEnoughData { required, actual }
            }
            Err(e) => {
                error!(error = %e, "Candle series rejected");
                ScanStatus::Failed(e.to_string())
            }
        };
        Some(status)
    }

    /// Runs cycles forever, the first one immediately.
    pub async fn run(self: Arc<Self>, every: Duration) {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let params = self.detector.params();
        info!(
            every_secs = every.as_secs(),
            fast = params.fast_period,
            slow = params.slow_period,
            source = %self.source.describe(),
            "Scanner started"
        );
        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }
}
