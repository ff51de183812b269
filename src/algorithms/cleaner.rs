use crate::error::{RecommendError, Result};
use crate::models::*;
use crate::utils::metrics::{CleaningReport, TableReport};
use crate::utils::validation::{
    current_year, is_complete_book, non_blank, validate_age, validate_publication_year_at,
    validate_rating_value,
};
use std::collections::HashSet;

const BOOK_FIELDS: [&str; 8] = [
    "book_id",
    "title",
    "author",
    "year",
    "publisher",
    "image_url_small",
    "image_url_medium",
    "image_url_large",
];
const USER_FIELDS: [&str; 2] = ["user_id", "age"];
const RATING_FIELDS: [&str; 3] = ["user_id", "book_id", "rating"];

#[derive(Debug, Clone)]
pub struct DatasetCleaner {
    current_year: i32,
}

impl Default for DatasetCleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetCleaner {
    pub fn new() -> Self {
        Self {
            current_year: current_year(),
        }
    }

    pub fn with_current_year(current_year: i32) -> Self {
        Self { current_year }
    }

    pub fn clean(&self, raw: &RawDataset) -> Result<(CleanDataset, CleaningReport)> {
        if raw.books.is_empty() {
            return Err(RecommendError::DataUnavailable(
                "books table is empty".to_string(),
            ));
        }

        let mut report = CleaningReport::default();
        let books = self.clean_books(&raw.books, &mut report);
        let users = self.clean_users(&raw.users, &mut report.users);
        let ratings = self.clean_ratings(&raw.ratings, &books, &mut report);

        report.log();

        Ok((
            CleanDataset {
                books,
                users,
                ratings,
            },
            report,
        ))
    }

    fn clean_books(&self, raw_books: &[RawBook], report: &mut CleaningReport) -> Vec<Book> {
        let table = &mut report.books;
        *table = TableReport::new(raw_books.len());
        BOOK_FIELDS.iter().for_each(|field| table.track(field));

        let mut seen: HashSet<&str> = HashSet::new();
        let mut books = Vec::with_capacity(raw_books.len());

        for raw in raw_books {
            let year = validate_publication_year_at(raw.year.as_deref(), self.current_year);
            let book_id = non_blank(raw.book_id.as_deref());

            let fields = [
                book_id,
                non_blank(raw.title.as_deref()),
                non_blank(raw.author.as_deref()),
                year.map(|_| ""),
                non_blank(raw.publisher.as_deref()),
                non_blank(raw.image_url_small.as_deref()),
                non_blank(raw.image_url_medium.as_deref()),
                non_blank(raw.image_url_large.as_deref()),
            ];
            for (field, value) in BOOK_FIELDS.iter().zip(fields) {
                if value.is_none() {
                    table.record_missing(field);
                }
            }

            let (Some(book_id), Some(year)) = (book_id, year) else {
                continue;
            };
            if !is_complete_book(raw, Some(year)) {
                continue;
            }
            if !seen.insert(book_id) {
                report.duplicate_books += 1;
                continue;
            }

            books.push(Book {
                book_id: book_id.to_string(),
                title: trimmed(&raw.title),
                author: trimmed(&raw.author),
                year,
                publisher: trimmed(&raw.publisher),
                image_url_small: optional(&raw.image_url_small),
                image_url_medium: optional(&raw.image_url_medium),
                image_url_large: optional(&raw.image_url_large),
            });
        }

        table.rows_out = books.len();
        books
    }

    fn clean_users(&self, raw_users: &[RawUser], table: &mut TableReport) -> Vec<User> {
        *table = TableReport::new(raw_users.len());
        USER_FIELDS.iter().for_each(|field| table.track(field));

        let mut users = Vec::with_capacity(raw_users.len());
        for raw in raw_users {
            let age = validate_age(raw.age.as_deref());
            if age.is_none() {
                table.record_missing("age");
            }
            // Rows without a key cannot be referenced; a bad age alone never drops a user.
            let Some(user_id) = non_blank(raw.user_id.as_deref()) else {
                table.record_missing("user_id");
                continue;
            };
            users.push(User {
                user_id: user_id.to_string(),
                age,
            });
        }

        table.rows_out = users.len();
        users
    }

    fn clean_ratings(
        &self,
        raw_ratings: &[RawRating],
        books: &[Book],
        report: &mut CleaningReport,
    ) -> Vec<Rating> {
        let known_books: HashSet<&str> = books.iter().map(|b| b.book_id.as_str()).collect();
        let table = &mut report.ratings;
        *table = TableReport::new(raw_ratings.len());
        RATING_FIELDS.iter().for_each(|field| table.track(field));

        let mut ratings = Vec::with_capacity(raw_ratings.len());
        for raw in raw_ratings {
            let book_id = non_blank(raw.book_id.as_deref()).filter(|id| known_books.contains(id));
            let Some(book_id) = book_id else {
                table.record_missing("book_id");
                report.orphan_ratings += 1;
                continue;
            };

            let Some(value) = validate_rating_value(raw.rating.as_deref()) else {
                table.record_missing("rating");
                report.out_of_range_ratings += 1;
                continue;
            };

            let Some(user_id) = non_blank(raw.user_id.as_deref()) else {
                table.record_missing("user_id");
                continue;
            };

            ratings.push(Rating::new(user_id, book_id, value));
        }

        table.rows_out = ratings.len();
        ratings
    }
}

fn trimmed(value: &Option<String>) -> String {
    non_blank(value.as_deref()).unwrap_or_default().to_string()
}

fn optional(value: &Option<String>) -> Option<String> {
    non_blank(value.as_deref()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_dataset() -> RawDataset {
        RawDataset {
            books: vec![
                RawBook::new("B1", "T1", "A1", "1995", "P1").with_image("http://img/b1.jpg"),
                RawBook::new("B2", "T2", "A2", "1999", "P2"),
                RawBook::new("B3", "T3", "A3", "2999", "P3"),
                RawBook::new("B4", "T4", "A4", "Gallimard", "P4"),
                RawBook::new("B5", "", "A5", "2001", "P5"),
                RawBook::new("B1", "Dup", "A1", "1995", "P1"),
            ],
            users: vec![
                RawUser::new("1", Some("34")),
                RawUser::new("2", Some("230")),
                RawUser::new("3", None),
                RawUser::new("4", Some("2")),
            ],
            ratings: vec![
                RawRating::new("1", "B1", "8"),
                RawRating::new("2", "B2", "0"),
                RawRating::new("1", "B3", "5"),
                RawRating::new("1", "UNKNOWN", "7"),
                RawRating::new("3", "B2", "11"),
                RawRating::new("3", "B1", "-2"),
            ],
        }
    }

    #[test]
    fn test_clean_books() {
        let cleaner = DatasetCleaner::with_current_year(2024);
        let (clean, report) = cleaner.clean(&raw_dataset()).unwrap();

        let ids: Vec<&str> = clean.books.iter().map(|b| b.book_id.as_str()).collect();
        assert_eq!(ids, vec!["B1", "B2"]);
        assert_eq!(clean.books[0].title, "T1");
        assert_eq!(clean.books[0].image_url_large.as_deref(), Some("http://img/b1.jpg"));
        for book in &clean.books {
            assert!((1800..=2024).contains(&book.year));
            assert!(!book.title.is_empty());
            assert!(!book.author.is_empty());
            assert!(!book.publisher.is_empty());
        }

        assert_eq!(report.books.rows_in, 6);
        assert_eq!(report.books.rows_out, 2);
        assert_eq!(report.books.missing_count("year"), 2);
        assert_eq!(report.books.missing_count("title"), 1);
        assert_eq!(report.duplicate_books, 1);
    }

    #[test]
    fn test_clean_users_never_dropped_for_age() {
        let cleaner = DatasetCleaner::with_current_year(2024);
        let (clean, report) = cleaner.clean(&raw_dataset()).unwrap();

        assert_eq!(clean.users.len(), 4);
        let ages: Vec<Option<u8>> = clean.users.iter().map(|u| u.age).collect();
        assert_eq!(ages, vec![Some(34), None, None, None]);
        assert_eq!(report.users.missing_count("age"), 3);
    }

    #[test]
    fn test_clean_ratings() {
        let cleaner = DatasetCleaner::with_current_year(2024);
        let (clean, report) = cleaner.clean(&raw_dataset()).unwrap();

        assert_eq!(
            clean.ratings,
            vec![Rating::new("1", "B1", 8.0), Rating::new("2", "B2", 0.0)]
        );
        assert_eq!(report.orphan_ratings, 2);
        assert_eq!(report.out_of_range_ratings, 2);
        assert_eq!(report.ratings.missing_count("book_id"), 2);
        assert_eq!(report.ratings.missing_count("rating"), 2);
        assert_eq!(report.ratings.missing_count("user_id"), 0);
        assert_eq!(report.ratings.rows_out, 2);
    }

    #[test]
    fn test_empty_books_is_data_unavailable() {
        let cleaner = DatasetCleaner::new();
        let err = cleaner.clean(&RawDataset::default()).unwrap_err();
        assert!(matches!(err, RecommendError::DataUnavailable(_)));
    }
}
