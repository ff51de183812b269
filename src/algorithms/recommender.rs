use crate::algorithms::similarity::SimilarityMatrix;
use crate::error::{RecommendError, Result};
use crate::models::*;
use crate::utils::top_k_indices;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_RECOMMENDATIONS: usize = 5;

/// Similarity matrix plus the cleaned books it was built from. Read-only after construction.
#[derive(Debug, Clone)]
pub struct RecommenderModel {
    similarity: SimilarityMatrix,
    books: HashMap<BookId, Book>,
    title_index: HashMap<String, BookId>,
    selectable_titles: Vec<String>,
}

impl RecommenderModel {
    pub fn new(similarity: SimilarityMatrix, books: &[Book]) -> Self {
        let mut title_index = HashMap::new();
        let mut selectable_titles = Vec::new();
        let mut seen_titles = HashSet::new();

        // Later rows win when several recommendable books share a title.
        for book in books.iter().filter(|b| similarity.contains(&b.book_id)) {
            title_index.insert(book.title.clone(), book.book_id.clone());
            if seen_titles.insert(book.title.as_str()) {
                selectable_titles.push(book.title.clone());
            }
        }

        let books = books
            .iter()
            .map(|b| (b.book_id.clone(), b.clone()))
            .collect();

        Self {
            similarity,
            books,
            title_index,
            selectable_titles,
        }
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    /// Up to `count` other books, most similar first. Ties keep identifier order.
    pub fn recommend(&self, book_id: &str, count: usize) -> Result<Vec<(BookId, f64)>> {
        let query = self
            .similarity
            .index_of(book_id)
            .ok_or_else(|| RecommendError::UnknownItem(book_id.to_string()))?;
        let row = self
            .similarity
            .row(book_id)
            .ok_or_else(|| RecommendError::UnknownItem(book_id.to_string()))?;

        let scores = row.to_vec();
        let ids = self.similarity.book_ids();
        let ranked = top_k_indices(&scores, count.saturating_add(1))
            .into_iter()
            .filter(|&i| i != query)
            .take(count)
            .map(|i| (ids[i].clone(), scores[i]))
            .collect();

        Ok(ranked)
    }

    pub fn recommend_with_metadata(
        &self,
        book_id: &str,
        count: usize,
    ) -> Result<Vec<RecommendationItem>> {
        self.recommend(book_id, count)?
            .into_iter()
            .map(|(id, score)| {
                let info = self.book_info(&id)?;
                Ok(RecommendationItem {
                    book_id: id,
                    title: info.title,
                    image_url: info.image_url,
                    score,
                })
            })
            .collect()
    }

    pub fn recommend_by_title(&self, title: &str, count: usize) -> Result<Vec<String>> {
        let book_id = self.resolve_identifier_for_title(title)?;
        self.recommend_with_metadata(&book_id, count)
            .map(|items| items.into_iter().map(|item| item.title).collect())
    }

    pub fn resolve_identifier_for_title(&self, title: &str) -> Result<BookId> {
        self.title_index
            .get(title)
            .cloned()
            .ok_or_else(|| RecommendError::UnknownItem(title.to_string()))
    }

    pub fn book_info(&self, book_id: &str) -> Result<BookInfo> {
        self.books
            .get(book_id)
            .map(Book::info)
            .ok_or_else(|| RecommendError::MissingMetadata(book_id.to_string()))
    }

    pub fn selectable_titles(&self) -> &[String] {
        &self.selectable_titles
    }

    pub fn random_item<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&BookId> {
        self.similarity.book_ids().choose(rng)
    }
}
