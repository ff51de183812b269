use serde::{Deserialize, Serialize};

pub type BookId = String;
pub type UserId = String;

/// A books row as loaded from the source. Every field is optional text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBook {
    pub book_id: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<String>,
    pub publisher: Option<String>,
    pub image_url_small: Option<String>,
    pub image_url_medium: Option<String>,
    pub image_url_large: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawUser {
    pub user_id: Option<String>,
    pub age: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRating {
    pub user_id: Option<String>,
    pub book_id: Option<String>,
    pub rating: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    pub books: Vec<RawBook>,
    pub users: Vec<RawUser>,
    pub ratings: Vec<RawRating>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub publisher: String,
    pub image_url_small: Option<String>,
    pub image_url_medium: Option<String>,
    pub image_url_large: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub age: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub book_id: BookId,
    pub value: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CleanDataset {
    pub books: Vec<Book>,
    pub users: Vec<User>,
    pub ratings: Vec<Rating>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookInfo {
    pub book_id: BookId,
    pub title: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub book_id: BookId,
    pub title: String,
    pub image_url: Option<String>,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub book_id: BookId,
    pub recommendations: Vec<RecommendationItem>,
}

impl RawBook {
    pub fn new(book_id: &str, title: &str, author: &str, year: &str, publisher: &str) -> Self {
        Self {
            book_id: Some(book_id.to_string()),
            title: Some(title.to_string()),
            author: Some(author.to_string()),
            year: Some(year.to_string()),
            publisher: Some(publisher.to_string()),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, url: &str) -> Self {
        self.image_url_large = Some(url.to_string());
        self
    }
}

impl RawUser {
    pub fn new(user_id: &str, age: Option<&str>) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            age: age.map(str::to_string),
        }
    }
}

impl RawRating {
    pub fn new(user_id: &str, book_id: &str, rating: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            book_id: Some(book_id.to_string()),
            rating: Some(rating.to_string()),
        }
    }
}

impl Rating {
    pub fn new(user_id: impl Into<UserId>, book_id: impl Into<BookId>, value: f64) -> Self {
        Self {
            user_id: user_id.into(),
            book_id: book_id.into(),
            value,
        }
    }
}

impl Book {
    pub fn info(&self) -> BookInfo {
        BookInfo {
            book_id: self.book_id.clone(),
            title: self.title.clone(),
            image_url: self.image_url_large.clone(),
        }
    }
}
