use crate::errors::AppError;
use crate::models::Record;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

/// The record file holds either a bare array or `{ "records": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordFile {
    Bare(Vec<Record>),
    Wrapped { records: Vec<Record> },
}

pub fn parse_records(bytes: &[u8]) -> Result<Vec<Record>, serde_json::Error> {
    Ok(match serde_json::from_slice(bytes)? {
        RecordFile::Bare(records) => records,
        RecordFile::Wrapped { records } => records,
    })
}

/// Reads the record file. Failures surface as "data unavailable".
pub async fn read_records(path: &Path) -> Result<Vec<Record>, AppError> {
    let bytes = fs::read(path).await.map_err(|err| {
        AppError::unavailable(format!("failed to read {}: {err}", path.display()))
    })?;
    parse_records(&bytes).map_err(|err| {
        AppError::unavailable(format!("failed to parse {}: {err}", path.display()))
    })
}

/// Startup load: a missing or unreadable file gives an empty dataset.
pub async fn load_records(path: &Path) -> Vec<Record> {
    match fs::read(path).await {
        Ok(bytes) => match parse_records(&bytes) {
            Ok(records) => {
                info!("loaded {} records from {}", records.len(), path.display());
                records
            }
            Err(err) => {
                error!("failed to parse records file: {err}");
                Vec::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!("no records file at {}, starting empty", path.display());
            Vec::new()
        }
        Err(err) => {
            error!("failed to read records file: {err}");
            Vec::new()
        }
    }
}
