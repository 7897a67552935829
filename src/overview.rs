// src/overview.rs

use serde::Deserialize;
use std::{cmp::Ordering, path::PathBuf};
use tracing::debug;

use crate::{
    dataset::{ingest, Record, Table},
    error::ApiError,
    paging::{paginate, Page, PageRequest},
};

pub const OVERVIEW_NOT_FOUND: &str = "overview file not found";
const REGION_COLUMN: &str = "region";
const DEFAULT_PER_PAGE: usize = 10;
const MAX_PER_PAGE: usize = 500;

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query string of `GET /api/overview`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverviewQuery {
    /// Case-insensitive substring matched against every field.
    pub q: Option<String>,
    /// RIR name, e.g. `RIPE NCC`.
    pub region: Option<String>,
    pub sort: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// Numbers sort before text; numbers compare numerically, text lexically.
fn compare_values(a: &str, b: &str) -> Ordering {
    let num = |v: &str| v.trim().parse::<f64>().ok().filter(|x| !x.is_nan());
    match (num(a), num(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Filter, sort and paginate the overview table. Input order is kept for ties.
pub fn query_table(table: Table, query: &OverviewQuery) -> Result<Page<Record>, ApiError> {
    let req = PageRequest::new(query.page, query.per_page, DEFAULT_PER_PAGE, MAX_PER_PAGE)?;

    if let Some(col) = &query.sort {
        if !table.has_column(col) {
            return Err(ApiError::InvalidQuery(format!("unknown sort column {col:?}")));
        }
    }
    if query.region.is_some() && !table.has_column(REGION_COLUMN) {
        return Err(ApiError::InvalidQuery(
            "overview has no region column".into(),
        ));
    }

    let needle = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let region = query.region.as_deref().map(str::trim);

    let mut rows: Vec<Record> = table
        .rows
        .into_iter()
        .filter(|row| match region {
            Some(r) => row
                .get(REGION_COLUMN)
                .is_some_and(|v| v.trim().eq_ignore_ascii_case(r)),
            None => true,
        })
        .filter(|row| match &needle {
            Some(n) => row.values().any(|v| v.to_lowercase().contains(n.as_str())),
            None => true,
        })
        .collect();

    if let Some(col) = &query.sort {
        rows.sort_by(|a, b| {
            let ord = compare_values(a.get(col).unwrap_or(""), b.get(col).unwrap_or(""));
            match query.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
    }

    debug!(matched = rows.len(), page = req.page, "overview query");
    Ok(paginate(rows, req))
}

/// Load the overview CSV from disk and answer `query` against it.
pub async fn load_and_query(path: PathBuf, query: OverviewQuery) -> Result<Page<Record>, ApiError> {
    let table = ingest::run_blocking(path, ingest::read_table)
        .await
        .map_err(|e| match e {
            ApiError::NotFound(_) => ApiError::NotFound(OVERVIEW_NOT_FOUND),
            other => other,
        })?;
    query_table(table, &query)
}
