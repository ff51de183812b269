use super::DataSource;
use crate::config::{PostgresConfig, SchemaConfig};
use crate::error::Result;
use crate::models::*;
use futures::TryStreamExt;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::info;

/// Reads the three tables from Postgres. Every column is cast to text so the cleaner
/// sees the same loosely typed values it would get from a delimited file.
#[derive(Debug, Clone)]
pub struct PostgresDataSource {
    pool: PgPool,
    config: PostgresConfig,
    schema: SchemaConfig,
}

impl PostgresDataSource {
    pub async fn connect(config: PostgresConfig, schema: SchemaConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;

        info!(
            books = %config.books_table,
            users = %config.users_table,
            ratings = %config.ratings_table,
            "Connected to Postgres data source"
        );

        Ok(Self::with_pool(pool, config, schema))
    }

    pub fn with_pool(pool: PgPool, config: PostgresConfig, schema: SchemaConfig) -> Self {
        Self {
            pool,
            config,
            schema,
        }
    }

    async fn fetch<T, F>(&self, sql: String, map: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(&PgRow) -> std::result::Result<T, sqlx::Error> + Send + Sync,
    {
        let mut rows = sqlx::query(&sql).fetch(&self.pool);
        let mut out = Vec::new();
        while let Some(row) = rows.try_next().await? {
            out.push(map(&row)?);
        }
        Ok(out)
    }
}

pub fn select_text(column: &str, alias: &str) -> String {
    if column.trim().is_empty() {
        format!("NULL::text AS {alias}")
    } else {
        format!("{}::text AS {alias}", quote_ident(column))
    }
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn books_query(table: &str, s: &SchemaConfig) -> String {
    format!(
        "SELECT {}, {}, {}, {}, {}, {}, {}, {} FROM {}",
        select_text(&s.book_id, "book_id"),
        select_text(&s.title, "title"),
        select_text(&s.author, "author"),
        select_text(&s.year, "year"),
        select_text(&s.publisher, "publisher"),
        select_text(&s.image_small, "image_url_small"),
        select_text(&s.image_medium, "image_url_medium"),
        select_text(&s.image_large, "image_url_large"),
        quote_ident(table),
    )
}

pub fn users_query(table: &str, s: &SchemaConfig) -> String {
    format!(
        "SELECT {}, {} FROM {}",
        select_text(&s.user_id, "user_id"),
        select_text(&s.age, "age"),
        quote_ident(table),
    )
}

pub fn ratings_query(table: &str, s: &SchemaConfig) -> String {
    format!(
        "SELECT {}, {}, {} FROM {}",
        select_text(&s.rating_user_id, "user_id"),
        select_text(&s.rating_book_id, "book_id"),
        select_text(&s.rating_value, "rating"),
        quote_ident(table),
    )
}

#[async_trait::async_trait]
impl DataSource for PostgresDataSource {
    async fn load_books(&self) -> Result<Vec<RawBook>> {
        let sql = books_query(&self.config.books_table, &self.schema);
        self.fetch(sql, |row| {
            Ok(RawBook {
                book_id: row.try_get("book_id")?,
                title: row.try_get("title")?,
                author: row.try_get("author")?,
                year: row.try_get("year")?,
                publisher: row.try_get("publisher")?,
                image_url_small: row.try_get("image_url_small")?,
                image_url_medium: row.try_get("image_url_medium")?,
                image_url_large: row.try_get("image_url_large")?,
            })
        })
        .await
    }

    async fn load_users(&self) -> Result<Vec<RawUser>> {
        let sql = users_query(&self.config.users_table, &self.schema);
        self.fetch(sql, |row| {
            Ok(RawUser {
                user_id: row.try_get("user_id")?,
                age: row.try_get("age")?,
            })
        })
        .await
    }

    async fn load_ratings(&self) -> Result<Vec<RawRating>> {
        let sql = ratings_query(&self.config.ratings_table, &self.schema);
        self.fetch(sql, |row| {
            Ok(RawRating {
                user_id: row.try_get("user_id")?,
                book_id: row.try_get("book_id")?,
                rating: row.try_get("rating")?,
            })
        })
        .await
    }
}
