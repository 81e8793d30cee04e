// Handler for the GetLatestReport RPC
use tokio::sync::watch;
use tonic::{Response, Status};

use super::helpers::{ready_report, resolve_latest, to_report_response};
use crate::scanner::ScanStatus;
use crate::services::{ReportRequest, ReportResponse};

pub async fn handle_get_latest_report(
    req_payload: ReportRequest,
    status_rx: &watch::Receiver<ScanStatus>,
    default_latest: usize,
) -> Result<Response<ReportResponse>, Status> {
    let status = status_rx.borrow().clone();
    let report = ready_report(&status).map_err(|status| {
        tracing::warn!(code = ?status.code(), message = %status.message(), "No report to serve");
        status
    })?;

    let latest = resolve_latest(req_payload.latest_setups, default_latest);
    tracing::debug!(cycle_id = %report.cycle_id, latest, "Serving latest report");
    Ok(Response::new(to_report_response(&report, latest)))
}
