// src/sync_list.rs

use serde::Deserialize;
use std::{io, path::Path};
use tokio::fs;

use crate::{
    error::ApiError,
    paging::{paginate, Page, PageRequest},
};

pub const SYNC_LIST_NOT_FOUND: &str = "AS list not found";
/// 15 rows of 15 buttons, as the dashboard grid shows them.
const DEFAULT_PER_PAGE: usize = 15 * 15;
const MAX_PER_PAGE: usize = 1000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncListQuery {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// Split the newline-separated AS list, trimming and dropping blank lines.
pub fn parse_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn load_page(path: &Path, query: &SyncListQuery) -> Result<Page<String>, ApiError> {
    let req = PageRequest::new(query.page, query.per_page, DEFAULT_PER_PAGE, MAX_PER_PAGE)?;
    let text = fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            ApiError::NotFound(SYNC_LIST_NOT_FOUND)
        } else {
            ApiError::from_io(path, e)
        }
    })?;
    Ok(paginate(parse_list(&text), req))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_list_drops_blanks() {
        let list = parse_list("13335\n\n  3320 \r\n4837\n\n");
        assert_eq!(list, vec!["13335", "3320", "4837"]);
    }

    #[tokio::test]
    async fn test_default_page_is_a_full_grid() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("sync_ases.txt");
        let body: String = (1..=300).map(|n| format!("{n}\n")).collect();
        std::fs::write(&path, body).unwrap();

        let page = load_page(&path, &SyncListQuery::default()).await.unwrap();
        assert_eq!(page.total, 300);
        assert_eq!(page.per_page, 225);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.first().map(String::as_str), Some("1"));

        let second = SyncListQuery {
            page: Some(2),
            per_page: None,
        };
        let page = load_page(&path, &second).await.unwrap();
        assert_eq!(page.items.len(), 75);
        assert_eq!(page.items.first().map(String::as_str), Some("226"));
    }

    #[tokio::test]
    async fn test_missing_list() {
        let tmp = tempdir().unwrap();
        let res = load_page(&tmp.path().join("nope.txt"), &SyncListQuery::default()).await;
        assert!(matches!(res, Err(ApiError::NotFound(SYNC_LIST_NOT_FOUND))));
    }
}
