use crate::algorithms::{Pipeline, PipelineOutput, RecommenderModel};
use crate::config::Config;
use crate::error::{RecommendError, Result};
use crate::models::*;
use crate::services::data_source::DataSource;
use crate::utils::metrics::CleaningReport;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Serves queries against the current model. A rebuild produces a new model and swaps
/// the `Arc`; readers holding the previous snapshot are unaffected.
pub struct RecommendationService {
    data_source: Arc<dyn DataSource>,
    pipeline: Pipeline,
    config: Arc<Config>,
    model: RwLock<Arc<RecommenderModel>>,
    last_report: RwLock<CleaningReport>,
}

impl RecommendationService {
    pub async fn new(data_source: Arc<dyn DataSource>, config: Arc<Config>) -> Result<Self> {
        let pipeline = Pipeline::from_config(&config);
        let output = build(data_source.as_ref(), &pipeline).await?;

        Ok(Self {
            data_source,
            pipeline,
            config,
            model: RwLock::new(Arc::new(output.model)),
            last_report: RwLock::new(output.cleaning),
        })
    }

    pub fn from_model(
        data_source: Arc<dyn DataSource>,
        config: Arc<Config>,
        model: RecommenderModel,
    ) -> Self {
        Self {
            data_source,
            pipeline: Pipeline::from_config(&config),
            config,
            model: RwLock::new(Arc::new(model)),
            last_report: RwLock::new(CleaningReport::default()),
        }
    }

    /// Reruns the full pipeline and swaps the model in. On failure the current model stays.
    pub async fn rebuild(&self) -> Result<()> {
        match build(self.data_source.as_ref(), &self.pipeline).await {
            Ok(output) => {
                *self.model.write() = Arc::new(output.model);
                *self.last_report.write() = output.cleaning;
                Ok(())
            }
            Err(e) => {
                error!("Rebuild failed, keeping current model: {}", e);
                Err(e)
            }
        }
    }

    pub fn model(&self) -> Arc<RecommenderModel> {
        self.model.read().clone()
    }

    pub fn cleaning_report(&self) -> CleaningReport {
        self.last_report.read().clone()
    }

    pub fn resolve_count(&self, count: Option<usize>) -> Result<usize> {
        let count = count.unwrap_or(self.config.recommendation.default_count);
        if count > self.config.recommendation.max_count {
            return Err(RecommendError::InvalidRequest(format!(
                "count {} exceeds maximum of {}",
                count, self.config.recommendation.max_count
            )));
        }
        Ok(count)
    }

    pub fn recommend_by_title(&self, title: &str, count: Option<usize>) -> Result<Vec<String>> {
        let count = self.resolve_count(count)?;
        self.model().recommend_by_title(title, count)
    }

    pub fn recommend_with_metadata(
        &self,
        book_id: &str,
        count: Option<usize>,
    ) -> Result<RecommendationResponse> {
        let count = self.resolve_count(count)?;
        let recommendations = self.model().recommend_with_metadata(book_id, count)?;
        Ok(RecommendationResponse {
            book_id: book_id.to_string(),
            recommendations,
        })
    }

    pub fn resolve_identifier_for_title(&self, title: &str) -> Result<BookId> {
        self.model().resolve_identifier_for_title(title)
    }

    pub fn book_info(&self, book_id: &str) -> Result<BookInfo> {
        let model = self.model();
        if !model.similarity().contains(book_id) {
            return Err(RecommendError::UnknownItem(book_id.to_string()));
        }
        model.book_info(book_id)
    }

    pub fn selectable_titles(&self) -> Vec<String> {
        self.model().selectable_titles().to_vec()
    }
}

async fn build(data_source: &dyn DataSource, pipeline: &Pipeline) -> Result<PipelineOutput> {
    let start_time = Instant::now();
    let raw = data_source.load_all().await?;

    let pipeline = pipeline.clone();
    let output = tokio::task::spawn_blocking(move || pipeline.run(&raw))
        .await
        .map_err(|e| RecommendError::DataUnavailable(format!("pipeline task failed: {e}")))??;

    info!(
        books = output.model.similarity().len(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Recommendation model ready"
    );
    Ok(output)
}
