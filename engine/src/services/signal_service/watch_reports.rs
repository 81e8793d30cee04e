// Handler for the WatchReports RPC
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Response, Status};

use super::helpers::{resolve_latest, to_report_response};
use crate::scanner::ScanStatus;
use crate::services::{ReportRequest, ReportResponse};

pub async fn handle_watch_reports(
    req_payload: ReportRequest,
    mut status_rx: watch::Receiver<ScanStatus>,
    default_latest: usize,
) -> Result<Response<ReceiverStream<Result<ReportResponse, Status>>>, Status> {
    let latest = resolve_latest(req_payload.latest_setups, default_latest);
    let (tx, rx) = mpsc::channel(4);

    tokio::spawn(async move {
        // The current report goes out first, then one message per newly published report.
        let mut current = status_rx.borrow_and_update().clone();
        loop {
            if let ScanStatus::Ready(report) = &current {
                let response = to_report_response(report, latest);
                if tx.send(Ok(response)).await.is_err() {
                    tracing::debug!("Report watcher disconnected");
                    return;
                }
            }
            if status_rx.changed().await.is_err() {
                tracing::info!("Scanner stopped, closing report stream");
                return;
            }
            current = status_rx.borrow_and_update().clone();
        }
    });

    Ok(Response::new(ReceiverStream::new(rx)))
}
