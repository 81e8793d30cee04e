// Handler for the AnalyzeCsv RPC
use std::path::{Component, Path, PathBuf};

use shared::models::TimeFrame;
use tonic::{Response, Status};
use uuid::Uuid;

use super::helpers::{resolve_latest, to_report_response};
use crate::data::csv_parser::KlineCsvParser;
use crate::error::EngineError;
use crate::scanner::analyze;
use crate::services::{AnalyzeCsvRequest, ReportResponse};
use crate::strategy::SetupDetector;

/// Resolves a client-supplied path inside `data_dir`. Absolute paths, `..` and
/// symlinks leading out of the directory are refused.
pub fn resolve_csv_path(data_dir: &Path, requested: &str) -> Result<PathBuf, EngineError> {
    let relative = Path::new(requested);
    if !relative.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir)) {
        return Err(EngineError::PathNotAllowed(requested.to_string()));
    }

    let root = data_dir.canonicalize()?;
    let resolved = root.join(relative).canonicalize()?;
    if !resolved.starts_with(&root) {
        return Err(EngineError::PathNotAllowed(requested.to_string()));
    }
    Ok(resolved)
}

pub async fn handle_analyze_csv(
    req_payload: AnalyzeCsvRequest,
    detector: SetupDetector,
    interval: TimeFrame,
    default_latest: usize,
    data_dir: PathBuf,
) -> Result<Response<ReportResponse>, Status> {
    if req_payload.file_path.trim().is_empty() {
        return Err(Status::invalid_argument("file_path is required"));
    }

    let file_path = req_payload.file_path.clone();
    let symbol = req_payload.symbol.clone();
    let report = tokio::task::spawn_blocking(move || {
        let path = resolve_csv_path(&data_dir, &file_path)?;
        let candles = KlineCsvParser::load_candles_from_csv(&path)?;
        analyze(&detector, Uuid::new_v4(), &symbol, interval, candles)
    })
    .await
    .map_err(|e| EngineError::AnyhowError(anyhow::anyhow!("CSV analysis task failed: {}", e)))??;

    tracing::info!(
        path = %req_payload.file_path,
        symbol = %report.symbol,
        candles = report.candles.len(),
        setups = report.setups.len(),
        "Analyzed CSV file"
    );

    let latest = resolve_latest(req_payload.latest_setups, default_latest);
    Ok(Response::new(to_report_response(&report, latest)))
}
