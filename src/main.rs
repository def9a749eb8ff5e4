mod app;
mod config;
mod db;
mod state;
mod users;

use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "loyalty_users=debug,axum=info,tower_http=info";

/// `RUST_LOG` picks the filter; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.with_target(false).json().init(),
        _ => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    let (app_state, pool) = state::AppState::init().await?;
    let addr = app_state.config.bind_addr();
    tracing::info!(
        app = %app_state.config.app_name,
        environment = %app_state.config.environment,
        "starting"
    );

    let app = app::build_app(app_state);
    let served = app::serve(app, &addr).await;

    db::close(pool).await;
    served
}
