pub mod algorithms;
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{RecommendError, Result};
pub use models::*;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub data_source: Arc<dyn services::data_source::DataSource>,
    pub recommendation_service: Arc<services::recommendation::RecommendationService>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let data_source = services::data_source::from_config(&config).await?;

        let recommendation_service = Arc::new(
            services::recommendation::RecommendationService::new(
                data_source.clone(),
                config.clone(),
            )
            .await?,
        );

        Ok(Self {
            config,
            data_source,
            recommendation_service,
        })
    }
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
