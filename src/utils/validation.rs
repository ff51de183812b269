use crate::models::RawBook;
use chrono::Datelike;

pub const MIN_PUBLICATION_YEAR: i32 = 1800;
pub const MIN_AGE: f64 = 5.0;
pub const MAX_AGE: f64 = 100.0;
pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 10.0;

pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Coerces a field to a finite number. Anything unparseable is absent.
pub fn coerce_numeric(value: Option<&str>) -> Option<f64> {
    non_blank(value)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

pub fn validate_publication_year(value: Option<&str>) -> Option<i32> {
    validate_publication_year_at(value, current_year())
}

pub fn validate_publication_year_at(value: Option<&str>, current_year: i32) -> Option<i32> {
    let year = coerce_numeric(value)?;
    if year.fract() != 0.0 {
        return None;
    }
    if year < MIN_PUBLICATION_YEAR as f64 || year > current_year as f64 {
        return None;
    }
    Some(year as i32)
}

pub fn validate_age(value: Option<&str>) -> Option<u8> {
    let age = coerce_numeric(value)?;
    if (MIN_AGE..=MAX_AGE).contains(&age) {
        Some(age.round() as u8)
    } else {
        None
    }
}

pub fn validate_rating_value(value: Option<&str>) -> Option<f64> {
    coerce_numeric(value).filter(|v| is_valid_rating(*v))
}

pub fn is_valid_rating(value: f64) -> bool {
    value.is_finite() && (MIN_RATING..=MAX_RATING).contains(&value)
}

pub fn is_complete_book(book: &RawBook, year: Option<i32>) -> bool {
    year.is_some()
        && non_blank(book.title.as_deref()).is_some()
        && non_blank(book.author.as_deref()).is_some()
        && non_blank(book.publisher.as_deref()).is_some()
}
