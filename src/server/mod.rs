// src/server/mod.rs

pub mod handlers;

use anyhow::Result;
use std::{convert::Infallible, path::PathBuf};
use tracing::info;
use warp::{reply::Reply, Filter};

use crate::{
    config::Config,
    dataset::Datasets,
    overview::OverviewQuery,
    sync_list::SyncListQuery,
};

/// Everything a handler needs. Read-only, cloned per request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub datasets: Datasets,
    pub overview_file: PathBuf,
    pub sync_list_file: PathBuf,
}

impl AppState {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            datasets: Datasets::new(&cfg.data_dir),
            overview_file: cfg.overview_file.clone(),
            sync_list_file: cfg.sync_list_file.clone(),
        }
    }
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn log_request(info: warp::log::Info<'_>) {
    info!(
        method = %info.method(),
        path = info.path(),
        status = info.status().as_u16(),
        elapsed = ?info.elapsed(),
        "request"
    );
}

/// Full route tree: dataset routes, overview, AS list, health; CORS for `cors_origin`.
///
/// Route errors are recovered inside the CORS wrapper so allowed origins can read
/// them. The outer recovery catches what CORS itself rejects.
pub fn routes(
    state: AppState,
    cors_origin: &str,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let cors = warp::cors()
        .allow_origin(cors_origin)
        .allow_methods(vec!["GET", "OPTIONS"])
        .allow_header("content-type");

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(handlers::health_check);

    let parse_csv = warp::path!("parse-csv" / String)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::parse_csv);

    let asn_data = warp::path!("api" / "asndata" / String)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::asn_data);

    let overview = warp::path!("api" / "overview")
        .and(warp::get())
        .and(warp::query::<OverviewQuery>())
        .and(with_state(state.clone()))
        .and_then(handlers::overview);

    let sync_ases = warp::path!("api" / "sync-ases")
        .and(warp::get())
        .and(warp::query::<SyncListQuery>())
        .and(with_state(state))
        .and_then(handlers::sync_ases);

    health
        .or(parse_csv)
        .or(asn_data)
        .or(overview)
        .or(sync_ases)
        .recover(handlers::handle_rejection)
        .with(cors)
        .recover(handlers::handle_rejection)
        .with(warp::log::custom(log_request))
}

/// Bind and serve until Ctrl-C.
pub async fn run(cfg: Config) -> Result<()> {
    let state = AppState::from_config(&cfg);
    let routes = routes(state, &cfg.cors_origin);

    let (addr, server) =
        warp::serve(routes).try_bind_with_graceful_shutdown(cfg.socket_addr(), async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
        })?;

    info!("Server listening on http://{}", addr);
    info!("Data directory: {}", cfg.data_dir.display());
    info!("CORS origin: {}", cfg.cors_origin);
    server.await;
    info!("server stopped");
    Ok(())
}
