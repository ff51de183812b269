pub mod csv;
pub mod postgres;

pub use self::csv::CsvDataSource;
pub use self::postgres::PostgresDataSource;

use crate::config::{Config, SourceKind};
use crate::error::{RecommendError, Result};
use crate::models::*;
use std::sync::Arc;
use tracing::info;

/// Supplies the three raw tables. Any load failure is fatal for the pipeline run.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    async fn load_books(&self) -> Result<Vec<RawBook>>;
    async fn load_users(&self) -> Result<Vec<RawUser>>;
    async fn load_ratings(&self) -> Result<Vec<RawRating>>;

    async fn load_all(&self) -> Result<RawDataset> {
        let books = self.load_books().await?;
        let users = self.load_users().await?;
        let ratings = self.load_ratings().await?;

        info!(
            books = books.len(),
            users = users.len(),
            ratings = ratings.len(),
            "Loaded raw dataset"
        );

        Ok(RawDataset {
            books,
            users,
            ratings,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryDataSource {
    dataset: RawDataset,
}

impl InMemoryDataSource {
    pub fn new(dataset: RawDataset) -> Self {
        Self { dataset }
    }
}

#[async_trait::async_trait]
impl DataSource for InMemoryDataSource {
    async fn load_books(&self) -> Result<Vec<RawBook>> {
        Ok(self.dataset.books.clone())
    }

    async fn load_users(&self) -> Result<Vec<RawUser>> {
        Ok(self.dataset.users.clone())
    }

    async fn load_ratings(&self) -> Result<Vec<RawRating>> {
        Ok(self.dataset.ratings.clone())
    }
}

pub async fn from_config(config: &Config) -> Result<Arc<dyn DataSource>> {
    let source: Arc<dyn DataSource> = match config.data.source {
        SourceKind::Csv => Arc::new(CsvDataSource::new(
            config.data.csv.clone(),
            config.schema.clone(),
        )),
        SourceKind::Postgres => Arc::new(
            PostgresDataSource::connect(config.data.postgres.clone(), config.schema.clone())
                .await?,
        ),
    };
    Ok(source)
}

pub(crate) fn missing_column(table: &str, column: &str) -> RecommendError {
    RecommendError::DataUnavailable(format!("{table}: missing column '{column}'"))
}
