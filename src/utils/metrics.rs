use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Missing or invalid values per field of one table, plus row counts around the cleaning step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableReport {
    pub rows_in: usize,
    pub rows_out: usize,
    pub missing: BTreeMap<String, usize>,
}

impl TableReport {
    pub fn new(rows_in: usize) -> Self {
        Self {
            rows_in,
            ..Default::default()
        }
    }

    /// Registers a field so it shows up in the report even with zero misses.
    pub fn track(&mut self, field: &str) {
        self.missing.entry(field.to_string()).or_insert(0);
    }

    pub fn record_missing(&mut self, field: &str) {
        *self.missing.entry(field.to_string()).or_insert(0) += 1;
    }

    pub fn missing_count(&self, field: &str) -> usize {
        self.missing.get(field).copied().unwrap_or(0)
    }

    pub fn dropped(&self) -> usize {
        self.rows_in.saturating_sub(self.rows_out)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub books: TableReport,
    pub users: TableReport,
    pub ratings: TableReport,
    pub duplicate_books: usize,
    pub orphan_ratings: usize,
    pub out_of_range_ratings: usize,
}

impl CleaningReport {
    pub fn log(&self) {
        info!(
            rows_in = self.books.rows_in,
            rows_out = self.books.rows_out,
            duplicates = self.duplicate_books,
            missing = ?self.books.missing,
            "Cleaned books"
        );
        info!(
            rows = self.users.rows_out,
            missing = ?self.users.missing,
            "Cleaned users"
        );
        info!(
            rows_in = self.ratings.rows_in,
            rows_out = self.ratings.rows_out,
            orphans = self.orphan_ratings,
            out_of_range = self.out_of_range_ratings,
            missing = ?self.ratings.missing,
            "Cleaned ratings"
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportSummary {
    pub ratings_in: usize,
    pub ratings_after_user_pass: usize,
    pub ratings_out: usize,
    pub users_kept: usize,
    pub books_kept: usize,
}

impl SupportSummary {
    pub fn log(&self) {
        info!(
            ratings_in = self.ratings_in,
            after_user_pass = self.ratings_after_user_pass,
            ratings_out = self.ratings_out,
            users = self.users_kept,
            books = self.books_kept,
            "Support filter applied"
        );
    }
}
