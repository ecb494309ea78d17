use sqlx::{
    self,
    postgres::{PgArguments, PgRow},
    FromRow, PgPool, Postgres, Row,
};

use crate::database::manager::DatabaseError;
use crate::filter::{FilteredQuery, SqlParam, SqlResult};

/// One page of a listing plus the total number of matching rows.
#[derive(Debug)]
pub struct Page<T> {
    pub total: i64,
    pub items: Vec<T>,
}

/// Runs a [`FilteredQuery`] against the pool and maps rows into `T`.
pub struct QueryBuilder<T> {
    query: FilteredQuery,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(query: FilteredQuery) -> Self {
        Self {
            query,
            _phantom: std::marker::PhantomData,
        }
    }

    /// COUNT and SELECT with the same predicates. Either failing fails the page.
    pub async fn fetch_page(self, pool: &PgPool) -> Result<Page<T>, DatabaseError> {
        let built = self.query.build()?;
        let total = count(&built.count, pool).await?;
        let items = select_all::<T>(&built.select, pool).await?;
        Ok(Page { total, items })
    }

    pub async fn select_all(self, pool: &PgPool) -> Result<Vec<T>, DatabaseError> {
        let built = self.query.build()?;
        select_all::<T>(&built.select, pool).await
    }
}

async fn select_all<T>(sql_result: &SqlResult, pool: &PgPool) -> Result<Vec<T>, DatabaseError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let mut q = sqlx::query_as::<_, T>(&sql_result.query);
    for p in sql_result.params.iter() {
        q = bind_param_query_as(q, p);
    }
    let rows = q.fetch_all(pool).await?;
    Ok(rows)
}

async fn count(sql_result: &SqlResult, pool: &PgPool) -> Result<i64, DatabaseError> {
    let mut q = sqlx::query(&sql_result.query);
    for p in sql_result.params.iter() {
        q = bind_param_query(q, p);
    }
    let row = q.fetch_one(pool).await?;
    let count: i64 = row.try_get("count")?;
    Ok(count)
}

pub fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match v {
        SqlParam::Text(s) => q.bind(s.as_str()),
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Uuid(u) => q.bind(*u),
    }
}

pub fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        SqlParam::Text(s) => q.bind(s.as_str()),
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Uuid(u) => q.bind(*u),
    }
}
