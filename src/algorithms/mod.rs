pub mod cleaner;
pub mod recommender;
pub mod similarity;
pub mod support;

pub use cleaner::DatasetCleaner;
pub use recommender::{RecommenderModel, DEFAULT_RECOMMENDATIONS};
pub use similarity::{RatingPivot, SimilarityMatrix};
pub use support::SupportFilter;

use crate::config::Config;
use crate::error::Result;
use crate::models::*;
use crate::utils::metrics::{CleaningReport, SupportSummary};
use std::time::Instant;
use tracing::info;

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub model: RecommenderModel,
    pub dataset: CleanDataset,
    pub cleaning: CleaningReport,
    pub support: SupportSummary,
}

/// raw records -> cleaned records -> filtered ratings -> similarity matrix -> model.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    cleaner: DatasetCleaner,
    filter: SupportFilter,
}

impl Pipeline {
    pub fn new(cleaner: DatasetCleaner, filter: SupportFilter) -> Self {
        Self { cleaner, filter }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(DatasetCleaner::new(), SupportFilter::from(&config.filter))
    }

    pub fn run(&self, raw: &RawDataset) -> Result<PipelineOutput> {
        let start_time = Instant::now();

        let (dataset, cleaning) = self.cleaner.clean(raw)?;
        let (filtered, support) = self.filter.apply(&dataset.ratings)?;
        let similarity = SimilarityMatrix::from_ratings(&filtered)?;
        let model = RecommenderModel::new(similarity, &dataset.books);

        info!(
            books = model.similarity().len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Pipeline finished"
        );

        Ok(PipelineOutput {
            model,
            dataset,
            cleaning,
            support,
        })
    }
}
