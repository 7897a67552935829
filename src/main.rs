use anyhow::Result;
use rovista::{config::Config, server};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) config ───────────────────────────────────────────────────
    let cfg = Config::load()?;

    // ─── 2) init logging (RUST_LOG wins over LOG_LEVEL) ──────────────
    let env = match EnvFilter::try_from_default_env() {
        Ok(env) => env,
        Err(_) => cfg.log_filter()?,
    };
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 3) serve ────────────────────────────────────────────────────
    server::run(cfg).await?;

    info!("all done");
    Ok(())
}
