// src/dataset/mod.rs

pub mod ingest;
pub mod normalize;
pub mod record;

pub use ingest::{ingest, read_table, Table};
pub use normalize::{normalize, shift_date, DateFormat, DateFormatError};
pub use record::Record;

use once_cell::sync::Lazy;
use regex::Regex;
use std::{fmt, path::PathBuf};
use tracing::info;

use crate::error::ApiError;

static DATASET_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("dataset id pattern should parse"));

/// A path-safe dataset name: an AS number or the name of an aggregate file.
/// Separators, dots and anything outside `[A-Za-z0-9_-]` are refused, so a
/// resolved path can never leave the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        if DATASET_ID.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ApiError::InvalidIdentifier(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a dataset lives and whether it was there when asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub path: PathBuf,
    pub exists: bool,
}

/// Read-only view over the directory of per-dataset CSV files.
#[derive(Debug, Clone)]
pub struct Datasets {
    dir: PathBuf,
}

impl Datasets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `{dir}/{id}.csv`
    pub fn path_for(&self, id: &DatasetId) -> PathBuf {
        self.dir.join(format!("{}.csv", id.as_str()))
    }

    /// Compose the path and check for the file. Only for reporting; loading
    /// never relies on this check.
    pub fn resolve(&self, id: &DatasetId) -> Resolved {
        let path = self.path_for(id);
        let exists = path.is_file();
        Resolved { path, exists }
    }

    /// Read and normalize one dataset. The file is opened exactly once and a
    /// missing file surfaces as `NotFound` from that open.
    pub async fn load(&self, id: &DatasetId, format: DateFormat) -> Result<Vec<Record>, ApiError> {
        let path = self.path_for(id);
        let records = ingest::run_blocking(path, move |p| ingest(p, format)).await?;
        info!(dataset = %id, rows = records.len(), ?format, "served dataset");
        Ok(records)
    }
}
