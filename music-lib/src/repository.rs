//! Song storage over Postgres
//!
//! Writes run inside their own transaction; dropping an uncommitted
//! transaction rolls it back. Point lookups treat "no row" as an empty result,
//! not an error. Storage faults are logged here and returned unchanged.

use async_trait::async_trait;
use chrono::NaiveDate;
use music_lib_common::{Error, Result};
use sqlx::postgres::{PgArguments, PgPool};
use sqlx::Arguments;
use tracing::{debug, error};

use crate::models::{Song, SongId, SongPartial, RELEASE_DATE_FORMAT};
use crate::pagination::Pagination;
use crate::query::{self, QueryArg};

/// Storage operations consumed by the catalog service
#[async_trait]
pub trait SongRepository: Send + Sync {
    /// Insert the non-empty fields of `song`, returning the new id
    async fn insert(&self, song: &Song) -> Result<SongId>;

    /// Fetch one song; a default [`SongPartial`] when no row matches
    async fn get_by_id(&self, id: SongId) -> Result<SongPartial>;

    /// Filtered page of songs in insertion order; empty when nothing matches
    async fn get_all(&self, filter: &Song, pagination: Pagination) -> Result<Vec<SongPartial>>;

    /// Assign every present field; returns rows affected (zero for an unknown id)
    async fn update(&self, id: SongId, song: &SongPartial) -> Result<u64>;

    /// Delete by id; deleting an unknown id succeeds
    async fn delete(&self, id: SongId) -> Result<()>;

    /// Lyrics for one song; empty when no row matches
    async fn get_text(&self, id: SongId) -> Result<String>;
}

/// Check a `DD.MM.YYYY` string before it reaches the database
pub fn parse_release_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, RELEASE_DATE_FORMAT)
        .map_err(|_| Error::InvalidDate(value.to_string()))
}

/// Validate an optional release date; empty means "no date" and passes
pub fn check_release_date(value: &str) -> Result<()> {
    if !value.is_empty() {
        parse_release_date(value)?;
    }
    Ok(())
}

#[derive(sqlx::FromRow)]
struct SongRow {
    id: SongId,
    name: String,
    artist: String,
    release_date: String,
    text: String,
    link: String,
}

impl From<SongRow> for SongPartial {
    fn from(r: SongRow) -> Self {
        Self {
            id: r.id,
            name: Some(r.name),
            artist: Some(r.artist),
            release_date: Some(r.release_date),
            text: Some(r.text),
            link: Some(r.link),
        }
    }
}

fn to_arguments(args: &[QueryArg]) -> Result<PgArguments> {
    let mut arguments = PgArguments::default();
    for arg in args {
        let added = match arg {
            QueryArg::Text(value) => arguments.add(value.clone()),
            QueryArg::Integer(value) => arguments.add(*value),
        };
        added.map_err(|e| Error::Internal(format!("Failed to encode query argument: {}", e)))?;
    }
    Ok(arguments)
}

/// Log a storage fault and convert it, leaving the sqlx error intact
fn storage_fault(operation: &'static str) -> impl Fn(sqlx::Error) -> Error {
    move |e| {
        error!(operation, error = %e, "Storage operation failed");
        Error::Database(e)
    }
}

/// Postgres-backed [`SongRepository`]
#[derive(Clone)]
pub struct PgSongRepository {
    pool: PgPool,
}

impl PgSongRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SongRepository for PgSongRepository {
    async fn insert(&self, song: &Song) -> Result<SongId> {
        check_release_date(&song.release_date)?;
        let built = query::build_insert(song)?.into_query();
        let arguments = to_arguments(&built.args)?;

        let mut tx = self.pool.begin().await.map_err(storage_fault("insert"))?;

        let id: SongId = sqlx::query_scalar_with(&built.sql, arguments)
            .fetch_one(&mut *tx)
            .await
            .map_err(storage_fault("insert"))?;

        tx.commit().await.map_err(storage_fault("insert"))?;

        debug!(id, "Inserted song");
        Ok(id)
    }

    async fn get_by_id(&self, id: SongId) -> Result<SongPartial> {
        let row = sqlx::query_as::<_, SongRow>(&query::select_by_id())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_fault("get_by_id"))?;

        Ok(row.map(SongPartial::from).unwrap_or_default())
    }

    async fn get_all(&self, filter: &Song, pagination: Pagination) -> Result<Vec<SongPartial>> {
        check_release_date(&filter.release_date)?;
        let built = query::build_select_all(filter, pagination);
        let arguments = to_arguments(&built.args)?;

        let rows = sqlx::query_as_with::<_, SongRow, _>(&built.sql, arguments)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_fault("get_all"))?;

        Ok(rows.into_iter().map(SongPartial::from).collect())
    }

    async fn update(&self, id: SongId, song: &SongPartial) -> Result<u64> {
        let built = query::build_update(id, song)?;
        // An empty date clears the column
        if let Some(date) = &song.release_date {
            check_release_date(date)?;
        }
        let arguments = to_arguments(&built.args)?;

        let mut tx = self.pool.begin().await.map_err(storage_fault("update"))?;

        let result = sqlx::query_with(&built.sql, arguments)
            .execute(&mut *tx)
            .await
            .map_err(storage_fault("update"))?;

        tx.commit().await.map_err(storage_fault("update"))?;

        let rows_affected = result.rows_affected();
        debug!(id, rows_affected, "Updated song");
        Ok(rows_affected)
    }

    async fn delete(&self, id: SongId) -> Result<()> {
        sqlx::query(query::DELETE_BY_ID)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_fault("delete"))?;

        Ok(())
    }

    async fn get_text(&self, id: SongId) -> Result<String> {
        let text: Option<Option<String>> = sqlx::query_scalar(query::SELECT_TEXT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_fault("get_text"))?;

        Ok(text.flatten().unwrap_or_default())
    }
}
