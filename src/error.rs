use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecommendError>;

#[derive(Error, Debug)]
pub enum RecommendError {
    /// The raw source could not be reached or parsed. Fatal for the pipeline run.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// Support filtering left too few books or users to build a similarity matrix.
    #[error("insufficient data: {books} books and {users} users survived support filtering (need at least 2 of each)")]
    InsufficientData { books: usize, users: usize },

    #[error("unknown item: {0}")]
    UnknownItem(String),

    #[error("missing metadata for book {0}")]
    MissingMetadata(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl RecommendError {
    /// Query-time errors leave the serving process healthy; everything else ends the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownItem(_) | Self::MissingMetadata(_) | Self::InvalidRequest(_)
        )
    }
}

impl From<csv::Error> for RecommendError {
    fn from(err: csv::Error) -> Self {
        Self::DataUnavailable(err.to_string())
    }
}

impl From<sqlx::Error> for RecommendError {
    fn from(err: sqlx::Error) -> Self {
        Self::DataUnavailable(err.to_string())
    }
}
