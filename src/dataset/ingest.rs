// src/dataset/ingest.rs

use csv::{ReaderBuilder, StringRecord};
use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use super::normalize::{normalize, DateFormat};
use super::record::Record;
use crate::error::ApiError;

/// A fully parsed CSV file: its header plus every data row in file order.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
}

impl Table {
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }
}

/// Turn a csv error into the request-level taxonomy.
fn classify_csv_error(path: &Path, err: csv::Error) -> ApiError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => ApiError::Io {
            path: path.display().to_string(),
            source,
        },
        _ => ApiError::Parse {
            path: path.display().to_string(),
            line,
            message,
        },
    }
}

/// Iterate `(line, record)` pairs from a header-keyed CSV stream.
/// The header row is consumed here and never yielded as data.
fn rows<'p, R: Read + 'p>(
    reader: R,
    path: &'p Path,
) -> Result<(Vec<String>, impl Iterator<Item = Result<(u64, Record), ApiError>> + 'p), ApiError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(BufReader::new(reader));

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| classify_csv_error(path, e))?
        .iter()
        .map(str::to_string)
        .collect();
    let keys = headers.clone();

    let iter = rdr.into_records().map(move |res: Result<StringRecord, csv::Error>| {
        let rec = res.map_err(|e| classify_csv_error(path, e))?;
        let line = rec.position().map(|p| p.line()).unwrap_or(0);
        Ok((line, Record::from_row(keys.iter().map(String::as_str), rec.iter())))
    });

    Ok((headers, iter))
}

fn open(path: &Path) -> Result<File, ApiError> {
    File::open(path).map_err(|e| ApiError::from_io(path, e))
}

/// Parse a CSV stream without touching any values.
pub fn read_table_from<R: Read>(reader: R, path: &Path) -> Result<Table, ApiError> {
    let (headers, iter) = rows(reader, path)?;
    let rows = iter
        .map(|row| row.map(|(_, rec)| rec))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Table { headers, rows })
}

/// Open `path` once and parse it.
pub fn read_table(path: &Path) -> Result<Table, ApiError> {
    read_table_from(open(path)?, path)
}

/// Parse and normalize a CSV stream. The first bad row aborts everything,
/// so callers never see a partially normalized sequence.
pub fn ingest_from<R: Read>(
    reader: R,
    path: &Path,
    format: DateFormat,
) -> Result<Vec<Record>, ApiError> {
    let (_, iter) = rows(reader, path)?;
    iter.map(|row| {
        let (line, rec) = row?;
        normalize(rec, format).map_err(|e| {
            warn!(path = %path.display(), line, value = %e.0, "bad date");
            ApiError::DateFormat { value: e.0, line }
        })
    })
    .collect()
}

/// Open `path` once, then parse and normalize every row.
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.display()))]
pub fn ingest(path: &Path, format: DateFormat) -> Result<Vec<Record>, ApiError> {
    let records = ingest_from(open(path)?, path, format)?;
    debug!(rows = records.len(), "ingested");
    Ok(records)
}

/// Run `job` on the blocking pool; file reads and CSV decoding stay off the reactor.
pub async fn run_blocking<T, F>(path: PathBuf, job: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Path) -> Result<T, ApiError> + Send + 'static,
{
    let display = path.display().to_string();
    tokio::task::spawn_blocking(move || job(&path))
        .await
        .map_err(|e| ApiError::Io {
            path: display,
            source: io::Error::new(io::ErrorKind::Other, e),
        })?
}
