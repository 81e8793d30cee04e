// engine/src/services/signal_service/mod.rs
// The SignalEngine gRPC service. Each RPC is dispatched to a handler in a sibling module.

use super::{AnalyzeCsvRequest, ReportRequest, ReportResponse, SignalEngine};
use crate::scanner::ScanStatus;
use crate::strategy::SetupDetector;
use shared::models::TimeFrame;
use std::path::PathBuf;
use tokio::sync::watch;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};

pub mod analyze_csv;
pub mod get_latest_report;
pub mod helpers;
pub mod watch_reports;

pub struct MySignalEngine {
    status_rx: watch::Receiver<ScanStatus>,
    detector: SetupDetector,
    interval: TimeFrame,
    default_latest: usize,
    data_dir: PathBuf,
}

impl MySignalEngine {
    pub fn new(
        status_rx: watch::Receiver<ScanStatus>,
        detector: SetupDetector,
        interval: TimeFrame,
        default_latest: usize,
        data_dir: PathBuf,
    ) -> Self {
        MySignalEngine {
            status_rx,
            detector,
            interval,
            default_latest,
            data_dir,
        }
    }
}

#[tonic::async_trait]
impl SignalEngine for MySignalEngine {
    async fn get_latest_report(&self, request: Request<ReportRequest>) -> Result<Response<ReportResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(latest_setups = req_payload.latest_setups, "Received GetLatestReport request");
        get_latest_report::handle_get_latest_report(req_payload, &self.status_rx, self.default_latest).await
    }

    async fn analyze_csv(&self, request: Request<AnalyzeCsvRequest>) -> Result<Response<ReportResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            path = %req_payload.file_path,
            symbol = %req_payload.symbol,
            "Received AnalyzeCsv request"
        );
        analyze_csv::handle_analyze_csv(
            req_payload,
            self.detector.clone(),
            self.interval,
            self.default_latest,
            self.data_dir.clone(),
        )
        .await
    }

    type WatchReportsStream = ReceiverStream<Result<ReportResponse, Status>>;
    async fn watch_reports(&self, request: Request<ReportRequest>) -> Result<Response<Self::WatchReportsStream>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(latest_setups = req_payload.latest_setups, "Received WatchReports request");
        watch_reports::handle_watch_reports(req_payload, self.status_rx.clone(), self.default_latest).await
    }
}
