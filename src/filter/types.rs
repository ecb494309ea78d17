use uuid::Uuid;

/// A value bound to a positional placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
    Uuid(Uuid),
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Int(value)
    }
}

impl From<i32> for SqlParam {
    fn from(value: i32) -> Self {
        SqlParam::Int(value as i64)
    }
}

impl From<Uuid> for SqlParam {
    fn from(value: Uuid) -> Self {
        SqlParam::Uuid(value)
    }
}

/// One descending ORDER BY term. Listings only ever sort newest first.
#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub column: &'static str,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

impl SqlResult {
    /// Highest `$n` placeholder referenced by the query text.
    pub fn placeholder_count(&self) -> usize {
        let bytes = self.query.as_bytes();
        let mut max = 0;
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'$' {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
                if end > start {
                    if let Ok(n) = self.query[start..end].parse::<usize>() {
                        max = max.max(n);
                    }
                }
                i = end.max(start);
            } else {
                i += 1;
            }
        }
        max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_highest_placeholder() {
        let sql = SqlResult {
            query: "SELECT * FROM t WHERE a = $1 AND (b ILIKE $2 OR c ILIKE $2) LIMIT $3 OFFSET $4".into(),
            params: vec![],
        };
        assert_eq!(sql.placeholder_count(), 4);
    }

    #[test]
    fn no_placeholders() {
        let sql = SqlResult { query: "SELECT COUNT(*) AS count FROM t".into(), params: vec![] };
        assert_eq!(sql.placeholder_count(), 0);
    }

    #[test]
    fn multi_digit_placeholders() {
        let sql = SqlResult { query: "x = $12 AND y = $3".into(), params: vec![] };
        assert_eq!(sql.placeholder_count(), 12);
    }
}
