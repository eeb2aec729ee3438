pub mod api;
pub mod cms;
pub mod config;
pub mod content;
pub mod error;
pub mod pages;
pub mod pagination;
pub mod posts;
pub mod state;
pub mod views;

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use cms::PrismicClient;
use config::Config;
use error::Result;
use pages::PageStore;
use state::AppState;

pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_env_filter(EnvFilter::from_env("SPACETRAVELING_LOG"))
        .init();

    let config = Config::from_env()?;
    tracing::info!(endpoint = %config.cms.endpoint, "using cms");

    let app = AppState::new(
        PrismicClient::new(&config.cms)?,
        PageStore::new(config.revalidate),
    );

    pages::prerender(app.cms(), app.pages()).await;

    api::run_server(app, config.bind).await
}
