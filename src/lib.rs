pub mod api;
pub mod config;
pub mod content;
pub mod error;
pub mod state;
pub mod storage;
pub mod view;

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use config::Config;
use error::Result;
use state::AppState;
use storage::Store;

/// 日志过滤器使用的环境变量
pub const LOG_ENV: &str = "POSTDESK_LOG";

pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_env_filter(EnvFilter::from_env(LOG_ENV))
        .init();

    let config =
        Config::from_env().inspect_err(|e| tracing::error!(%e, "invalid configuration"))?;

    let store = Store::connect(&config.store)
        .await
        .inspect_err(|e| tracing::error!(%e, url = %config.store.url, "failed to connect store"))?;

    tracing::info!(
        backend = store.backend(),
        reader = %config.reader,
        "store connected"
    );

    let app = AppState::new(store, config.site, config.reader);

    api::run_server(app, &config.addr).await
}
