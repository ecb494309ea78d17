use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::pagination::Pagination;
use super::predicate::Predicate;
use super::types::{FilterOrderInfo, SqlParam, SqlResult};

/// A listing query: fixed base SELECT and COUNT statements plus the optional
/// predicates, ordering and pagination supplied per request.
///
/// Both statements share the same WHERE text and the same filter arguments.
/// Only the row query receives `LIMIT`/`OFFSET`.
#[derive(Debug, Clone)]
pub struct FilteredQuery {
    base_select: String,
    base_count: String,
    predicates: Vec<Predicate>,
    order_data: Vec<FilterOrderInfo>,
    pagination: Option<Pagination>,
}

/// The rendered row and count statements for one request.
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    pub select: SqlResult,
    pub count: SqlResult,
}

impl FilteredQuery {
    /// `base_count` must project a single `count` column, e.g.
    /// `SELECT COUNT(*) AS count FROM publicacoes`.
    pub fn new(base_select: impl Into<String>, base_count: impl Into<String>) -> Self {
        Self {
            base_select: base_select.into(),
            base_count: base_count.into(),
            predicates: vec![],
            order_data: vec![],
            pagination: None,
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn filter_opt(self, predicate: Option<Predicate>) -> Self {
        match predicate {
            Some(p) => self.filter(p),
            None => self,
        }
    }

    pub fn order(mut self, info: FilterOrderInfo) -> Self {
        self.order_data.push(info);
        self
    }

    /// Newest first by `timestamp_column`, ties broken by `id_column`.
    pub fn newest_first(self, timestamp_column: &'static str, id_column: &'static str) -> Self {
        self.order(FilterOrder::desc(timestamp_column))
            .order(FilterOrder::desc(id_column))
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    pub fn build(&self) -> Result<BuiltQuery, FilterError> {
        let (where_clause, params) = self.build_where();

        let count = SqlResult {
            query: join_clauses(&[&self.base_count, &where_clause]),
            params: params.clone(),
        };

        let mut select_params = params;
        let order_clause = FilterOrder::generate(&self.order_data);
        let limit_clause = match self.pagination {
            Some(p) => {
                let n = select_params.len();
                select_params.push(SqlParam::Int(p.limit()));
                select_params.push(SqlParam::Int(p.offset()));
                format!("LIMIT ${} OFFSET ${}", n + 1, n + 2)
            }
            None => String::new(),
        };

        let select = SqlResult {
            query: join_clauses(&[&self.base_select, &where_clause, &order_clause, &limit_clause]),
            params: select_params,
        };

        check_params("select", &select)?;
        check_params("count", &count)?;
        if select.params[..count.params.len()] != count.params[..] {
            return Err(FilterError::ParameterMismatch {
                query: "count",
                placeholders: count.placeholder_count(),
                params: count.params.len(),
            });
        }

        Ok(BuiltQuery { select, count })
    }

    fn build_where(&self) -> (String, Vec<SqlParam>) {
        let mut params: Vec<SqlParam> = vec![];
        let mut conditions = vec![];
        for predicate in &self.predicates {
            conditions.push(predicate.render(params.len()));
            params.extend_from_slice(predicate.args());
        }
        if conditions.is_empty() {
            (String::new(), params)
        } else {
            (format!("WHERE {}", conditions.join(" AND ")), params)
        }
    }
}

fn join_clauses(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn check_params(query: &'static str, sql: &SqlResult) -> Result<(), FilterError> {
    let placeholders = sql.placeholder_count();
    if placeholders != sql.params.len() {
        return Err(FilterError::ParameterMismatch {
            query,
            placeholders,
            params: sql.params.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publications() -> FilteredQuery {
        FilteredQuery::new(
            "SELECT * FROM publicacoes",
            "SELECT COUNT(*) AS count FROM publicacoes",
        )
    }

    #[test]
    fn no_filters_no_where() {
        let built = publications()
            .newest_first("data_criacao", "id_publicacao")
            .paginate(Pagination::new(1, 12).unwrap())
            .build()
            .unwrap();

        assert_eq!(
            built.select.query,
            "SELECT * FROM publicacoes ORDER BY data_criacao DESC, id_publicacao DESC LIMIT $1 OFFSET $2"
        );
        assert_eq!(built.select.params, vec![SqlParam::Int(12), SqlParam::Int(0)]);
        assert_eq!(built.count.query, "SELECT COUNT(*) AS count FROM publicacoes");
        assert!(built.count.params.is_empty());
    }

    #[test]
    fn filters_are_shared_and_count_has_no_paging() {
        let built = publications()
            .filter(Predicate::ilike("titulo", "vento"))
            .filter(Predicate::array_contains("autores", "Ana"))
            .newest_first("data_criacao", "id_publicacao")
            .paginate(Pagination::new(2, 12).unwrap())
            .build()
            .unwrap();

        assert_eq!(
            built.select.query,
            "SELECT * FROM publicacoes WHERE titulo ILIKE '%' || $1 || '%' AND $2 = ANY(autores) \
             ORDER BY data_criacao DESC, id_publicacao DESC LIMIT $3 OFFSET $4"
        );
        assert_eq!(
            built.count.query,
            "SELECT COUNT(*) AS count FROM publicacoes WHERE titulo ILIKE '%' || $1 || '%' AND $2 = ANY(autores)"
        );
        assert_eq!(built.count.params, built.select.params[..2].to_vec());
        assert_eq!(built.select.params[2..], [SqlParam::Int(12), SqlParam::Int(12)]);
    }

    #[test]
    fn news_filters_number_sequentially() {
        // The array and year filters come after a repeated-placeholder search term.
        let built = FilteredQuery::new("SELECT * FROM noticias", "SELECT COUNT(*) AS count FROM noticias")
            .filter(Predicate::ilike_any_of(&["titulo", "categoria"], "chuva"))
            .filter(Predicate::array_ilike("tags", "radar"))
            .filter(Predicate::array_ilike("autores", "silva"))
            .filter_opt(Predicate::year_range("data_publicacao", Some(2021), Some(2023)))
            .newest_first("data_publicacao", "id_noticia")
            .paginate(Pagination::new(1, 8).unwrap())
            .build()
            .unwrap();

        assert_eq!(built.count.params.len(), 5);
        assert_eq!(built.count.placeholder_count(), 5);
        assert_eq!(built.select.params.len(), 7);
        assert!(built.select.query.contains("BETWEEN $4 AND $5"));
        assert!(built.select.query.ends_with("LIMIT $6 OFFSET $7"));
        assert!(built.count.query.contains("unnest(autores)"));
    }

    #[test]
    fn fixed_predicates_do_not_shift_numbering() {
        let built = publications()
            .filter(Predicate::fixed("visibilidade = true"))
            .filter(Predicate::ilike("categoria", "clima"))
            .build()
            .unwrap();
        assert_eq!(
            built.count.query,
            "SELECT COUNT(*) AS count FROM publicacoes WHERE visibilidade = true AND categoria ILIKE '%' || $1 || '%'"
        );
        assert_eq!(built.select.params.len(), 1);
    }

    #[test]
    fn base_with_placeholder_is_rejected() {
        // A base statement must not carry its own placeholders; they would not have arguments.
        let err = FilteredQuery::new("SELECT * FROM t WHERE a = $1", "SELECT COUNT(*) AS count FROM t")
            .build()
            .unwrap_err();
        assert!(matches!(err, FilterError::ParameterMismatch { query: "select", .. }));
    }

    #[test]
    fn unpaginated_select_has_no_limit() {
        let built = publications().filter(Predicate::eq("id_usuario", "u1")).build().unwrap();
        assert!(!built.select.query.contains("LIMIT"));
        assert_eq!(built.select.params, built.count.params);
    }
}
