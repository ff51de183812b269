use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub schema: SchemaConfig,
    pub filter: FilterConfig,
    pub recommendation: RecommendationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    // tokio panics on a zero-sized worker pool.
    pub fn worker_threads(&self) -> usize {
        self.workers.max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Csv,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub source: SourceKind,
    pub csv: CsvConfig,
    pub postgres: PostgresConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvConfig {
    pub books_path: PathBuf,
    pub users_path: PathBuf,
    pub ratings_path: PathBuf,
    pub delimiter: String,
}

impl CsvConfig {
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.bytes().next().unwrap_or(b',')
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    pub books_table: String,
    pub users_table: String,
    pub ratings_table: String,
}

/// Column names of the three source tables. Shared by the CSV and Postgres sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub year: String,
    pub publisher: String,
    pub image_small: String,
    pub image_medium: String,
    pub image_large: String,
    pub user_id: String,
    pub age: String,
    pub rating_user_id: String,
    pub rating_book_id: String,
    pub rating_value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub min_user_ratings: usize,
    pub min_book_ratings: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    pub default_count: usize,
    pub max_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                workers: num_cpus::get(),
            },
            data: DataConfig {
                source: SourceKind::Csv,
                csv: CsvConfig {
                    books_path: PathBuf::from("Data/Books.csv"),
                    users_path: PathBuf::from("Data/Users.csv"),
                    ratings_path: PathBuf::from("Data/Ratings.csv"),
                    delimiter: ",".to_string(),
                },
                postgres: PostgresConfig {
                    url: "postgresql://localhost:5432/postgres".to_string(),
                    max_connections: 5,
                    books_table: "books".to_string(),
                    users_table: "users".to_string(),
                    ratings_table: "ratings".to_string(),
                },
            },
            schema: SchemaConfig::default(),
            filter: FilterConfig {
                min_user_ratings: 50,
                min_book_ratings: 50,
            },
            recommendation: RecommendationConfig {
                default_count: 5,
                max_count: 100,
            },
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            book_id: "ISBN".to_string(),
            title: "Book-Title".to_string(),
            author: "Book-Author".to_string(),
            year: "Year-Of-Publication".to_string(),
            publisher: "Publisher".to_string(),
            image_small: "Image-URL-S".to_string(),
            image_medium: "Image-URL-M".to_string(),
            image_large: "Image-URL-L".to_string(),
            user_id: "User-ID".to_string(),
            age: "Age".to_string(),
            rating_user_id: "User-ID".to_string(),
            rating_book_id: "ISBN".to_string(),
            rating_value: "Book-Rating".to_string(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let defaults = config::Config::try_from(&Config::default())?;
        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("BOOKREC").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
