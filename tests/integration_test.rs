use bookrec::algorithms::*;
use bookrec::services::data_source::{CsvDataSource, DataSource, InMemoryDataSource};
use bookrec::services::recommendation::RecommendationService;
use bookrec::*;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::sync::Arc;

/// Twelve books, sixty readers. Readers `u0..u29` like the "a" shelf, `u30..u59` the
/// "b" shelf, and everyone rates `shared`.
fn synthetic_dataset() -> RawDataset {
    let mut books = Vec::new();
    for shelf in ["a", "b"] {
        for i in 0..5 {
            let id = format!("{shelf}{i}");
            books.push(
                RawBook::new(&id, &format!("Book {id}"), "Author", "1990", "Publisher")
                    .with_image(&format!("http://img/{id}.jpg")),
            );
        }
    }
    books.push(RawBook::new("shared", "Everyone's Book", "Author", "2000", "Publisher"));
    books.push(RawBook::new("rare", "Rare Book", "Author", "2000", "Publisher"));
    books.push(RawBook::new("future", "Future Book", "Author", "3000", "Publisher"));

    let mut users = Vec::new();
    let mut ratings = Vec::new();
    for u in 0..60 {
        let user = format!("u{u}");
        users.push(RawUser::new(&user, Some(if u % 2 == 0 { "33" } else { "250" })));
        let shelf = if u < 30 { "a" } else { "b" };
        for i in 0..5 {
            let value = ((u + i) % 10 + 1).to_string();
            ratings.push(RawRating::new(&user, &format!("{shelf}{i}"), &value));
        }
        ratings.push(RawRating::new(&user, "shared", "5"));
        ratings.push(RawRating::new(&user, "future", "9"));
        ratings.push(RawRating::new(&user, "ghost", "9"));
    }
    ratings.push(RawRating::new("u0", "rare", "10"));

    RawDataset {
        books,
        users,
        ratings,
    }
}

fn pipeline() -> Pipeline {
    Pipeline::new(DatasetCleaner::new(), SupportFilter::new(5, 20))
}

#[test]
fn test_cleaned_tables_hold_invariants() {
    let raw = synthetic_dataset();
    let (clean, report) = DatasetCleaner::new().clean(&raw).unwrap();
    let year = utils::validation::current_year();

    for book in &clean.books {
        assert!((1800..=year).contains(&book.year));
        assert!(!book.title.is_empty() && !book.author.is_empty() && !book.publisher.is_empty());
    }
    assert_eq!(clean.users.len(), raw.users.len());
    for user in &clean.users {
        assert!(user.age.map_or(true, |age| (5..=100).contains(&age)));
    }

    let book_ids: HashSet<&str> = clean.books.iter().map(|b| b.book_id.as_str()).collect();
    for rating in &clean.ratings {
        assert!(book_ids.contains(rating.book_id.as_str()));
        assert!((0.0..=10.0).contains(&rating.value));
    }
    assert_eq!(report.orphan_ratings, 120);
    assert_eq!(report.ratings.missing_count("book_id"), 120);
}

#[test]
fn test_support_filter_property() {
    let (clean, _) = DatasetCleaner::new().clean(&synthetic_dataset()).unwrap();
    let filter = SupportFilter::new(5, 20);
    let (filtered, _) = filter.apply(&clean.ratings).unwrap();

    let mut user_counts: HashMap<&str, usize> = HashMap::new();
    for r in &clean.ratings {
        *user_counts.entry(r.user_id.as_str()).or_default() += 1;
    }
    let intermediate: Vec<&Rating> = clean
        .ratings
        .iter()
        .filter(|r| user_counts[r.user_id.as_str()] >= 5)
        .collect();
    let mut book_counts: HashMap<&str, usize> = HashMap::new();
    for r in &intermediate {
        *book_counts.entry(r.book_id.as_str()).or_default() += 1;
    }

    for r in &filtered {
        assert!(user_counts[r.user_id.as_str()] >= 5);
        assert!(book_counts[r.book_id.as_str()] >= 20);
    }
    assert!(filtered.iter().all(|r| r.book_id != "rare" && r.book_id != "ghost"));
}

#[test]
fn test_similarity_and_recommendations() {
    let output = pipeline().run(&synthetic_dataset()).unwrap();
    let model = &output.model;
    let matrix = model.similarity();

    assert_eq!(matrix.len(), 11);
    for a in matrix.book_ids() {
        assert_eq!(matrix.get(a, a), Some(1.0));
        for b in matrix.book_ids() {
            assert_eq!(matrix.get(a, b), matrix.get(b, a));
        }
    }
    // Shelves share no readers.
    assert_eq!(matrix.get("a0", "b0"), Some(0.0));

    let recs = model.recommend("a0", 4).unwrap();
    assert_eq!(recs.len(), 4);
    assert!(recs.iter().all(|(id, _)| id.starts_with('a') && id != "a0"));
    for pair in recs.windows(2) {
        assert!(pair[0].1 >= pair[1].1);
    }

    let all = model.recommend("a0", 100).unwrap();
    assert_eq!(all.len(), 10);
}

#[test]
fn test_unknown_and_dropped_items() {
    let output = pipeline().run(&synthetic_dataset()).unwrap();
    let model = &output.model;

    for id in ["ghost", "rare", "future", "never-seen"] {
        assert!(matches!(
            model.recommend(id, 5),
            Err(RecommendError::UnknownItem(_))
        ));
    }
    assert!(matches!(
        model.resolve_identifier_for_title("Rare Book"),
        Err(RecommendError::UnknownItem(_))
    ));
}

#[test]
fn test_identical_vectors_scenario() {
    let mut ratings = Vec::new();
    for user in ["1", "2", "3"] {
        ratings.push(RawRating::new(user, "B1", "6"));
        ratings.push(RawRating::new(user, "B2", "6"));
    }
    let raw = RawDataset {
        books: vec![
            RawBook::new("B1", "T1", "A1", "1995", "P1"),
            RawBook::new("B2", "T2", "A2", "1999", "P2"),
        ],
        users: vec![],
        ratings,
    };

    let output = Pipeline::new(DatasetCleaner::new(), SupportFilter::new(1, 1))
        .run(&raw)
        .unwrap();
    let sim = output.model.similarity().get("B1", "B2").unwrap();
    assert!((sim - 1.0).abs() < 1e-9);

    let recs = output.model.recommend("B1", 1).unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].0, "B2");
    assert_eq!(output.model.recommend_by_title("T1", 1).unwrap(), vec!["T2"]);
}

#[tokio::test]
async fn test_csv_source_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let raw = synthetic_dataset();

    let mut books =
        String::from("ISBN;Book-Title;Book-Author;Year-Of-Publication;Publisher;Image-URL-L\n");
    for b in &raw.books {
        books.push_str(&format!(
            "{};{};{};{};{};{}\n",
            b.book_id.as_deref().unwrap_or_default(),
            b.title.as_deref().unwrap_or_default(),
            b.author.as_deref().unwrap_or_default(),
            b.year.as_deref().unwrap_or_default(),
            b.publisher.as_deref().unwrap_or_default(),
            b.image_url_large.as_deref().unwrap_or_default(),
        ));
    }
    let mut users = String::from("User-ID;Location;Age\n");
    for u in &raw.users {
        users.push_str(&format!(
            "{};somewhere;{}\n",
            u.user_id.as_deref().unwrap_or_default(),
            u.age.as_deref().unwrap_or_default()
        ));
    }
    let mut ratings = String::from("User-ID;ISBN;Book-Rating\n");
    for r in &raw.ratings {
        ratings.push_str(&format!(
            "{};{};{}\n",
            r.user_id.as_deref().unwrap_or_default(),
            r.book_id.as_deref().unwrap_or_default(),
            r.rating.as_deref().unwrap_or_default()
        ));
    }
    fs::write(dir.path().join("Books.csv"), books).unwrap();
    fs::write(dir.path().join("Users.csv"), users).unwrap();
    fs::write(dir.path().join("Ratings.csv"), ratings).unwrap();

    let mut config = Config::default();
    config.data.csv.books_path = dir.path().join("Books.csv");
    config.data.csv.users_path = dir.path().join("Users.csv");
    config.data.csv.ratings_path = dir.path().join("Ratings.csv");
    config.data.csv.delimiter = ";".to_string();
    config.filter.min_user_ratings = 5;
    config.filter.min_book_ratings = 20;

    let source = Arc::new(CsvDataSource::new(config.data.csv.clone(), config.schema.clone()));
    let loaded = source.load_all().await.unwrap();
    assert_eq!(loaded.books.len(), raw.books.len());
    assert_eq!(loaded.ratings.len(), raw.ratings.len());

    let service = RecommendationService::new(source, Arc::new(config))
        .await
        .unwrap();
    let response = service.recommend_with_metadata("b2", Some(3)).unwrap();
    assert_eq!(response.recommendations.len(), 3);
    for item in &response.recommendations {
        assert!(item.book_id.starts_with('b'));
        let expected = format!("http://img/{}.jpg", item.book_id);
        assert_eq!(item.image_url.as_deref(), Some(expected.as_str()));
    }
    assert_eq!(service.resolve_identifier_for_title("Book b2").unwrap(), "b2");
}

#[tokio::test]
async fn test_service_survives_query_errors() {
    let source = Arc::new(InMemoryDataSource::new(synthetic_dataset()));
    let mut config = Config::default();
    config.filter.min_user_ratings = 5;
    config.filter.min_book_ratings = 20;
    let service = RecommendationService::new(source, Arc::new(config))
        .await
        .unwrap();

    assert!(matches!(
        service.recommend_with_metadata("ghost", None),
        Err(RecommendError::UnknownItem(_))
    ));
    assert!(matches!(
        service.recommend_by_title("No Such Title", None),
        Err(RecommendError::UnknownItem(_))
    ));
    let response = service.recommend_with_metadata("a1", None).unwrap();
    assert_eq!(response.recommendations.len(), 5);
}

#[tokio::test]
async fn test_insufficient_data_halts_build() {
    let source = Arc::new(InMemoryDataSource::new(synthetic_dataset()));
    let result = RecommendationService::new(source, Arc::new(Config::default())).await;
    assert!(matches!(
        result,
        Err(RecommendError::InsufficientData { .. })
    ));
}
