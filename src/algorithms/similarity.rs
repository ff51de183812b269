use crate::error::{RecommendError, Result};
use crate::models::{BookId, Rating};
use crate::utils::mean;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};

/// Book-by-user rating matrix. Rows and columns are in lexical identifier order; a pair
/// without a rating holds 0.
#[derive(Debug, Clone)]
pub struct RatingPivot {
    pub book_ids: Vec<BookId>,
    pub user_ids: Vec<String>,
    pub values: Array2<f64>,
}

impl RatingPivot {
    /// Duplicate (book, user) ratings are averaged.
    pub fn from_ratings(ratings: &[Rating]) -> Self {
        let book_ids: Vec<BookId> = ratings
            .iter()
            .map(|r| r.book_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let user_ids: Vec<String> = ratings
            .iter()
            .map(|r| r.user_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let book_index = index_of(&book_ids);
        let user_index = index_of(&user_ids);

        let mut cells: HashMap<(usize, usize), Vec<f64>> = HashMap::new();
        for rating in ratings {
            let key = (book_index[&rating.book_id], user_index[&rating.user_id]);
            cells.entry(key).or_default().push(rating.value);
        }

        let mut values = Array2::<f64>::zeros((book_ids.len(), user_ids.len()));
        for ((row, col), cell) in cells {
            values[[row, col]] = mean(&cell).unwrap_or(0.0);
        }

        Self {
            book_ids,
            user_ids,
            values,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }
}

/// Symmetric cosine similarity between the rating vectors of every pair of books.
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    book_ids: Vec<BookId>,
    index: HashMap<BookId, usize>,
    values: Array2<f64>,
}

impl SimilarityMatrix {
    pub fn from_ratings(ratings: &[Rating]) -> Result<Self> {
        let pivot = RatingPivot::from_ratings(ratings);
        Self::from_pivot(pivot)
    }

    pub fn from_pivot(pivot: RatingPivot) -> Result<Self> {
        let (books, users) = pivot.shape();
        if books < 2 || users < 2 {
            return Err(RecommendError::InsufficientData { books, users });
        }

        let norms: Array1<f64> = pivot
            .values
            .axis_iter(Axis(0))
            .map(|row| row.dot(&row).sqrt())
            .collect();

        let rows = &pivot.values;
        let upper: Vec<Vec<f64>> = (0..books)
            .into_par_iter()
            .map(|i| {
                ((i + 1)..books)
                    .map(|j| cosine(rows.row(i), rows.row(j), norms[i], norms[j]))
                    .collect()
            })
            .collect();

        let mut values = Array2::<f64>::zeros((books, books));
        for (i, row) in upper.into_iter().enumerate() {
            values[[i, i]] = if norms[i] > 0.0 { 1.0 } else { 0.0 };
            for (offset, sim) in row.into_iter().enumerate() {
                let j = i + 1 + offset;
                values[[i, j]] = sim;
                values[[j, i]] = sim;
            }
        }

        let index = index_of(&pivot.book_ids);
        tracing::info!(books, users, "Built item similarity matrix");

        Ok(Self {
            book_ids: pivot.book_ids,
            index,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.book_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.book_ids.is_empty()
    }

    pub fn book_ids(&self) -> &[BookId] {
        &self.book_ids
    }

    pub fn contains(&self, book_id: &str) -> bool {
        self.index.contains_key(book_id)
    }

    pub fn index_of(&self, book_id: &str) -> Option<usize> {
        self.index.get(book_id).copied()
    }

    pub fn row(&self, book_id: &str) -> Option<ArrayView1<'_, f64>> {
        self.index_of(book_id).map(|i| self.values.row(i))
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        Some(self.values[[i, j]])
    }
}

fn cosine(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>, norm_a: f64, norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (a.dot(&b) / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

fn index_of(ids: &[String]) -> HashMap<String, usize> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| (id.clone(), i))
        .collect()
}
