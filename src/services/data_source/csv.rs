use super::{missing_column, DataSource};
use crate::config::{CsvConfig, SchemaConfig};
use crate::error::{RecommendError, Result};
use crate::models::*;
use csv::{ByteRecord, ReaderBuilder};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CsvDataSource {
    config: CsvConfig,
    schema: SchemaConfig,
}

impl CsvDataSource {
    pub fn new(config: CsvConfig, schema: SchemaConfig) -> Self {
        Self { config, schema }
    }

    async fn read_table(
        &self,
        path: &Path,
        columns: Vec<Column>,
    ) -> Result<Vec<Vec<Option<String>>>> {
        let path = path.to_path_buf();
        let delimiter = self.config.delimiter_byte();
        tokio::task::spawn_blocking(move || read_columns(&path, delimiter, &columns))
            .await
            .map_err(|e| RecommendError::DataUnavailable(format!("csv reader task failed: {e}")))?
    }
}

#[derive(Debug, Clone)]
struct Column {
    name: String,
    required: bool,
}

impl Column {
    fn required(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: true,
        }
    }

    fn optional(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: false,
        }
    }
}

/// Returns one row per record with the requested columns in order. Bytes are decoded
/// lossily since the public dumps mix encodings.
fn read_columns(
    path: &Path,
    delimiter: u8,
    columns: &[Column],
) -> Result<Vec<Vec<Option<String>>>> {
    let table = path.display().to_string();
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| RecommendError::DataUnavailable(format!("{table}: {e}")))?;

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();

    let positions = columns
        .iter()
        .map(|column| {
            let position = headers.iter().position(|h| *h == column.name);
            match position {
                None if column.required => Err(missing_column(&table, &column.name)),
                _ => Ok(position),
            }
        })
        .collect::<Result<Vec<Option<usize>>>>()?;

    let mut rows = Vec::new();
    let mut record = ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        rows.push(
            positions
                .iter()
                .map(|position| {
                    position
                        .and_then(|i| record.get(i))
                        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                })
                .collect(),
        );
    }

    debug!(table = %table, rows = rows.len(), "Read csv table");
    Ok(rows)
}

#[async_trait::async_trait]
impl DataSource for CsvDataSource {
    async fn load_books(&self) -> Result<Vec<RawBook>> {
        let s = &self.schema;
        let columns = vec![
            Column::required(&s.book_id),
            Column::required(&s.title),
            Column::required(&s.author),
            Column::required(&s.year),
            Column::required(&s.publisher),
            Column::optional(&s.image_small),
            Column::optional(&s.image_medium),
            Column::optional(&s.image_large),
        ];
        let rows = self.read_table(&self.config.books_path, columns).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let mut fields = row.into_iter();
                RawBook {
                    book_id: fields.next().flatten(),
                    title: fields.next().flatten(),
                    author: fields.next().flatten(),
                    year: fields.next().flatten(),
                    publisher: fields.next().flatten(),
                    image_url_small: fields.next().flatten(),
                    image_url_medium: fields.next().flatten(),
                    image_url_large: fields.next().flatten(),
                }
            })
            .collect())
    }

    async fn load_users(&self) -> Result<Vec<RawUser>> {
        let s = &self.schema;
        let columns = vec![Column::required(&s.user_id), Column::optional(&s.age)];
        let rows = self.read_table(&self.config.users_path, columns).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let mut fields = row.into_iter();
                RawUser {
                    user_id: fields.next().flatten(),
                    age: fields.next().flatten(),
                }
            })
            .collect())
    }

    async fn load_ratings(&self) -> Result<Vec<RawRating>> {
        let s = &self.schema;
        let columns = vec![
            Column::required(&s.rating_user_id),
            Column::required(&s.rating_book_id),
            Column::required(&s.rating_value),
        ];
        let rows = self.read_table(&self.config.ratings_path, columns).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let mut fields = row.into_iter();
                RawRating {
                    user_id: fields.next().flatten(),
                    book_id: fields.next().flatten(),
                    rating: fields.next().flatten(),
                }
            })
            .collect())
    }
}
