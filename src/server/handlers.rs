// src/server/handlers.rs

use std::convert::Infallible;
use tracing::{error, warn};
use warp::{http::StatusCode, reject::Rejection, reply::Reply};

use super::AppState;
use crate::{
    dataset::{DatasetId, DateFormat},
    error::{ApiError, ErrorBody},
    overview::{self, OverviewQuery},
    sync_list::{self, SyncListQuery},
};

pub async fn health_check() -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "service": "rovista"
    })))
}

/// Shared body of both dataset routes; only the date rendering differs.
async fn serve_dataset(
    state: &AppState,
    raw_id: &str,
    format: DateFormat,
) -> Result<warp::reply::Json, Rejection> {
    let id = DatasetId::parse(raw_id).map_err(|e| {
        warn!(id = %raw_id, "rejected dataset identifier");
        warp::reject::custom(e)
    })?;

    match state.datasets.load(&id, format).await {
        Ok(records) => Ok(warp::reply::json(&records)),
        Err(e) => {
            if let ApiError::NotFound(_) = e {
                let path = state.datasets.path_for(&id);
                warn!(dataset = %id, path = %path.display(), "dataset not found");
            } else {
                error!(
                    dataset = %id,
                    path = e.path().unwrap_or("-"),
                    error = %e,
                    "failed to load dataset"
                );
            }
            Err(warp::reject::custom(e))
        }
    }
}

/// `GET /parse-csv/{id}`: dates as `YYYY-MM-DD`.
pub async fn parse_csv(raw_id: String, state: AppState) -> Result<impl Reply, Rejection> {
    serve_dataset(&state, &raw_id, DateFormat::DateOnly).await
}

/// `GET /api/asndata/{id}`: dates as full ISO-8601 instants.
pub async fn asn_data(raw_id: String, state: AppState) -> Result<impl Reply, Rejection> {
    serve_dataset(&state, &raw_id, DateFormat::IsoInstant).await
}

pub async fn overview(query: OverviewQuery, state: AppState) -> Result<impl Reply, Rejection> {
    let page = overview::load_and_query(state.overview_file.clone(), query)
        .await
        .map_err(|e| {
            warn!(error = %e, "overview query failed");
            warp::reject::custom(e)
        })?;
    Ok(warp::reply::json(&page))
}

pub async fn sync_ases(query: SyncListQuery, state: AppState) -> Result<impl Reply, Rejection> {
    let page = sync_list::load_page(&state.sync_list_file, &query)
        .await
        .map_err(|e| {
            warn!(error = %e, "AS list failed");
            warp::reject::custom(e)
        })?;
    Ok(warp::reply::json(&page))
}

fn error_reply(status: StatusCode, error: String, kind: &'static str) -> warp::reply::Response {
    warp::reply::with_status(warp::reply::json(&ErrorBody { error, kind }), status).into_response()
}

/// Turn every rejection into the JSON error envelope.
pub async fn handle_rejection(err: Rejection) -> Result<warp::reply::Response, Infallible> {
    if let Some(api) = err.find::<ApiError>() {
        let body = api.body();
        return Ok(error_reply(api.status(), body.error, body.kind));
    }
    if let Some(e) = err.find::<warp::filters::cors::CorsForbidden>() {
        warn!(error = %e, "CORS request refused");
        return Ok(error_reply(StatusCode::FORBIDDEN, e.to_string(), "cors_forbidden"));
    }
    if err.is_not_found() {
        return Ok(error_reply(
            StatusCode::NOT_FOUND,
            "route not found".into(),
            "route_not_found",
        ));
    }
    if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        return Ok(error_reply(
            StatusCode::BAD_REQUEST,
            e.to_string(),
            "invalid_query",
        ));
    }
    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(error_reply(
            StatusCode::METHOD_NOT_ALLOWED,
            "method not allowed".into(),
            "method_not_allowed",
        ));
    }

    error!(?err, "unhandled rejection");
    Ok(error_reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal error".into(),
        "internal",
    ))
}
