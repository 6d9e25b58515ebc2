//! Downloadable result artifacts.

pub mod html;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use crate::error::AppError;
use crate::oracle::analysis::Analysis;
use crate::quiz::{ChartValues, Classification, TypeProfile};

/// Everything an export needs, already computed.
#[derive(Debug, Clone)]
pub struct Report {
    pub classification: Classification,
    pub profile: TypeProfile,
    pub chart: ChartValues,
    pub analysis: Analysis,
    pub advice: String,
    pub issued_at: DateTime<Local>,
}

impl Report {
    pub fn new(classification: Classification, chart: ChartValues, analysis: Analysis, advice: String) -> Self {
        Self {
            classification,
            profile: TypeProfile::for_classification(classification),
            chart,
            analysis,
            advice,
            issued_at: Local::now(),
        }
    }
}

/// Render `report` as HTML and write it to `dir/file_name`, creating `dir`
/// when needed.  Returns the written path.
pub async fn write_html(report: &Report, dir: &Path, file_name: &str) -> Result<PathBuf, AppError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::Export(format!("cannot create {}: {e}", dir.display())))?;
    let path = dir.join(file_name);
    let html = html::render(report);
    tokio::fs::write(&path, html.as_bytes())
        .await
        .map_err(|e| AppError::Export(format!("cannot write {}: {e}", path.display())))?;
    info!(path = %path.display(), bytes = html.len(), "result exported");
    Ok(path)
}
