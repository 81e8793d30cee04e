// Conversions between engine models and the generated protobuf types
use std::sync::Arc;

use shared::models::{Candle as DomainCandle, Indicator, TradeSetup as DomainSetup};
use tonic::Status;

use crate::models::SignalReport;
use crate::scanner::ScanStatus;
use crate::services::{IndicatorPoint, ProtoCandle, ProtoTradeSetup, ReportResponse};

pub fn to_proto_candle(candle: &DomainCandle) -> ProtoCandle {
    ProtoCandle {
        timestamp: candle.timestamp.timestamp_millis(),
        open: candle.open,
        high: candle.high,
        low: candle.low,
        close: candle.close,
    }
}

pub fn to_proto_setup(setup: &DomainSetup) -> ProtoTradeSetup {
    ProtoTradeSetup {
        direction: setup.direction.to_string(),
        time: setup.time.timestamp_millis(),
        entry: setup.entry,
        stop_loss: setup.stop_loss,
        target: setup.target,
    }
}

pub fn indicator_points(candles: &[DomainCandle], indicator: &Indicator) -> Vec<IndicatorPoint> {
    candles
        .iter()
        .zip(&indicator.values)
        .map(|(candle, value)| IndicatorPoint {
            timestamp: candle.timestamp.timestamp_millis(),
            value: *value,
        })
        .collect()
}

/// 0 selects the server default.
pub fn resolve_latest(requested: u32, default: usize) -> usize {
    if requested == 0 {
        default
    } else {
        requested as usize
    }
}

pub fn to_report_response(report: &SignalReport, latest_setups: usize) -> ReportResponse {
    ReportResponse {
        cycle_id: report.cycle_id.to_string(),
        symbol: report.symbol.clone(),
        interval: report.interval.as_str().to_string(),
        generated_at: report.generated_at.timestamp_millis(),
        candles: report.candles.iter().map(to_proto_candle).collect(),
        fast_ma: indicator_points(&report.candles, &report.fast_ma),
        slow_ma: indicator_points(&report.candles, &report.slow_ma),
        setups: report.latest_setups(latest_setups).iter().map(to_proto_setup).collect(),
        total_setups: report.setups.len() as u32,
        status_message: report.summary(),
    }
}

pub fn ready_report(status: &ScanStatus) -> Result<Arc<SignalReport>, Status> {
    match status {
        ScanStatus::Ready(report) => Ok(report.clone()),
        ScanStatus::Pending => Err(Status::unavailable("No scan has completed yet")),
        ScanStatus::NotEnoughData { required, actual } => Err(Status::failed_precondition(format!(
            "Not enough data yet: need at least {} candles, got {}",
            required, actual
        ))),
        ScanStatus::Failed(msg) => Err(Status::unavailable(format!("Latest scan failed: {}", msg))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_indicator_points_keep_undefined_samples_unset() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let candles: Vec<DomainCandle> = (0..3)
            .map(|i| DomainCandle {
                timestamp: t0 + chrono::Duration::minutes(i),
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
            })
            .collect();
        let indicator = Indicator {
            name: "SMA(2)".to_string(),
            parameters: json!({ "period": 2 }),
            values: vec![None, Some(1.0), Some(1.0)],
        };
        let points = indicator_points(&candles, &indicator);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].value, None);
        assert_eq!(points[1].value, Some(1.0));
        assert_eq!(points[2].timestamp, (t0 + chrono::Duration::minutes(2)).timestamp_millis());
    }

    #[test]
    fn test_resolve_latest() {
        assert_eq!(resolve_latest(0, 5), 5);
        assert_eq!(resolve_latest(12, 5), 12);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ready_report(&ScanStatus::Pending).unwrap_err().code(), tonic::Code::Unavailable);
        let not_enough = ScanStatus::NotEnoughData { required: 51, actual: 7 };
        assert_eq!(ready_report(&not_enough).unwrap_err().code(), tonic::Code::FailedPrecondition);
        let failed = ready_report(&ScanStatus::Failed("boom".to_string())).unwrap_err();
        assert_eq!(failed.code(), tonic::Code::Unavailable);
        assert!(failed.message().contains("boom"));
    }
}
