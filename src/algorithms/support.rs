use crate::config::FilterConfig;
use crate::error::{RecommendError, Result};
use crate::models::Rating;
use crate::utils::metrics::SupportSummary;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Minimum-activity filter over cleaned ratings.
///
/// Runs one user pass followed by one book pass over the user-filtered set. It is not
/// iterated to a fixed point, so a kept user may end up with fewer than
/// `min_user_ratings` surviving ratings after the book pass.
#[derive(Debug, Clone, Copy)]
pub struct SupportFilter {
    pub min_user_ratings: usize,
    pub min_book_ratings: usize,
}

impl Default for SupportFilter {
    fn default() -> Self {
        Self::new(50, 50)
    }
}

impl From<&FilterConfig> for SupportFilter {
    fn from(config: &FilterConfig) -> Self {
        Self::new(config.min_user_ratings, config.min_book_ratings)
    }
}

impl SupportFilter {
    pub fn new(min_user_ratings: usize, min_book_ratings: usize) -> Self {
        Self {
            min_user_ratings,
            min_book_ratings,
        }
    }

    pub fn apply(&self, ratings: &[Rating]) -> Result<(Vec<Rating>, SupportSummary)> {
        let user_counts = count_by(ratings, |r| &r.user_id);
        let after_users: Vec<&Rating> = ratings
            .iter()
            .filter(|r| user_counts[&r.user_id] >= self.min_user_ratings)
            .collect();

        let book_counts = count_by(after_users.iter().copied(), |r| &r.book_id);
        let filtered: Vec<Rating> = after_users
            .iter()
            .filter(|r| book_counts[&r.book_id] >= self.min_book_ratings)
            .map(|r| (*r).clone())
            .collect();

        let users: HashSet<&str> = filtered.iter().map(|r| r.user_id.as_str()).collect();
        let books: HashSet<&str> = filtered.iter().map(|r| r.book_id.as_str()).collect();

        let summary = SupportSummary {
            ratings_in: ratings.len(),
            ratings_after_user_pass: after_users.len(),
            ratings_out: filtered.len(),
            users_kept: users.len(),
            books_kept: books.len(),
        };
        summary.log();

        if books.len() < 2 || users.len() < 2 {
            return Err(RecommendError::InsufficientData {
                books: books.len(),
                users: users.len(),
            });
        }

        Ok((filtered, summary))
    }
}

fn count_by<'a, I, K, F>(ratings: I, key: F) -> HashMap<&'a K, usize>
where
    I: IntoIterator<Item = &'a Rating>,
    K: Eq + Hash + ?Sized + 'a,
    F: Fn(&'a Rating) -> &'a K,
{
    let mut counts = HashMap::new();
    for rating in ratings {
        *counts.entry(key(rating)).or_insert(0) += 1;
    }
    counts
}
