use std::fmt::Display;
use std::str::FromStr;

use serde::{de::DeserializeOwned, Serialize};
use sqlx::{
    self,
    postgres::{PgArguments, PgRow},
    query::Query,
    FromRow, PgPool, Postgres,
};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::query_builder::{Page, QueryBuilder};
use crate::filter::{FilteredQuery, Pagination, Predicate};

/// Table schema for entities served by the generic CRUD handlers.
///
/// Implementors describe their table, key and writable columns, and bind their
/// own values in the same order as [`Resource::COLUMNS`].
pub trait Resource:
    for<'r> FromRow<'r, PgRow> + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static
{
    type Id: for<'q> sqlx::Encode<'q, Postgres>
        + sqlx::Type<Postgres>
        + FromStr
        + Display
        + Copy
        + Send
        + Sync
        + 'static;

    const TABLE: &'static str;
    const ID_COLUMN: &'static str;
    /// Writable columns in bind order. Never includes the key.
    const COLUMNS: &'static [&'static str];
    /// Projection used for reads and `RETURNING`; must alias columns to the
    /// names expected by `FromRow`.
    const SELECT_LIST: &'static str;
    /// Timestamp column listings are ordered by (newest first).
    const ORDER_COLUMN: &'static str;
    /// JSON key for listings.
    const PLURAL: &'static str;
    /// Human-readable name for error messages.
    const LABEL: &'static str;

    /// SQL expression used to write `column` from placeholder `$n`.
    fn value_expr(column: &str, n: usize) -> String {
        match column {
            "location" => format!("ST_GeogFromText(${})", n),
            _ => format!("${}", n),
        }
    }

    fn bind_values<'q>(&'q self, q: Query<'q, Postgres, PgArguments>) -> Query<'q, Postgres, PgArguments>;
}

pub struct Repository<T> {
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Resource> Repository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn parse_id(raw: &str) -> Option<T::Id> {
        raw.parse::<T::Id>().ok()
    }

    pub fn list_query(equipment_id: Option<Uuid>, pagination: Pagination) -> FilteredQuery {
        FilteredQuery::new(
            format!("SELECT {} FROM {}", T::SELECT_LIST, T::TABLE),
            format!("SELECT COUNT(*) AS count FROM {}", T::TABLE),
        )
        .filter_opt(equipment_id.map(|id| Predicate::eq("equipmentid", id)))
        .newest_first(T::ORDER_COLUMN, T::ID_COLUMN)
        .paginate(pagination)
    }

    pub async fn list(&self, equipment_id: Option<Uuid>, pagination: Pagination) -> Result<Page<T>, DatabaseError> {
        QueryBuilder::<T>::new(Self::list_query(equipment_id, pagination))
            .fetch_page(&self.pool)
            .await
    }

    pub async fn select_404(&self, id: T::Id) -> Result<T, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            T::SELECT_LIST,
            T::TABLE,
            T::ID_COLUMN
        );
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} {} not found", T::LABEL, id)))
    }

    pub async fn create(&self, record: &T) -> Result<T, DatabaseError> {
        let sql = Self::insert_sql();
        let row = record.bind_values(sqlx::query(&sql)).fetch_one(&self.pool).await?;
        Ok(T::from_row(&row)?)
    }

    pub async fn update_404(&self, id: T::Id, record: &T) -> Result<T, DatabaseError> {
        let sql = Self::update_sql();
        let row = record
            .bind_values(sqlx::query(&sql))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} {} not found", T::LABEL, id)))?;
        Ok(T::from_row(&row)?)
    }

    pub async fn delete_404(&self, id: T::Id) -> Result<(), DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE {} = $1", T::TABLE, T::ID_COLUMN);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("{} {} not found", T::LABEL, id)));
        }
        Ok(())
    }

    pub fn insert_sql() -> String {
        let values: Vec<String> = T::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, c)| T::value_expr(c, i + 1))
            .collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            T::TABLE,
            T::COLUMNS.join(", "),
            values.join(", "),
            T::SELECT_LIST
        )
    }

    pub fn update_sql() -> String {
        let assignments: Vec<String> = T::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} = {}", c, T::value_expr(c, i + 1)))
            .collect();
        format!(
            "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
            T::TABLE,
            assignments.join(", "),
            T::ID_COLUMN,
            T::COLUMNS.len() + 1,
            T::SELECT_LIST
        )
    }
}
