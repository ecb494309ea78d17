use super::types::SqlParam;

/// One optional WHERE fragment together with the values it binds.
///
/// The template refers to its own arguments as `{0}`, `{1}`, ... and is only
/// turned into positional `$n` placeholders when the full query is rendered,
/// so a fragment can never be separated from its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    template: String,
    args: Vec<SqlParam>,
}

impl Predicate {
    fn new(template: impl Into<String>, args: Vec<SqlParam>) -> Self {
        Self { template: template.into(), args }
    }

    /// A constant condition with no bound values, e.g. `visibilidade = true`.
    pub fn fixed(sql: &'static str) -> Self {
        Self::new(sql, vec![])
    }

    /// A hand-written fragment that refers to its arguments as `{0}`, `{1}`, ...
    /// A marker may appear more than once.
    pub fn raw(template: &'static str, args: Vec<SqlParam>) -> Self {
        Self::new(template, args)
    }

    /// `column = $n`
    pub fn eq(column: &'static str, value: impl Into<SqlParam>) -> Self {
        Self::new(format!("{} = {{0}}", column), vec![value.into()])
    }

    /// Case-insensitive substring match on a text column.
    pub fn ilike(column: &'static str, value: impl Into<String>) -> Self {
        Self::new(
            format!("{} ILIKE '%' || {{0}} || '%'", column),
            vec![SqlParam::Text(value.into())],
        )
    }

    /// Case-insensitive substring match against any of several columns, binding
    /// the search term once.
    pub fn ilike_any_of(columns: &[&'static str], value: impl Into<String>) -> Self {
        let parts: Vec<String> = columns
            .iter()
            .map(|c| format!("{} ILIKE '%' || {{0}} || '%'", c))
            .collect();
        Self::new(format!("({})", parts.join(" OR ")), vec![SqlParam::Text(value.into())])
    }

    /// Exact membership in a text array column.
    pub fn array_contains(column: &'static str, value: impl Into<String>) -> Self {
        Self::new(format!("{{0}} = ANY({})", column), vec![SqlParam::Text(value.into())])
    }

    /// Substring match against any element of a text array column.
    pub fn array_ilike(column: &'static str, value: impl Into<String>) -> Self {
        Self::new(
            format!(
                "EXISTS (SELECT 1 FROM unnest({}) AS item WHERE item ILIKE '%' || {{0}} || '%')",
                column
            ),
            vec![SqlParam::Text(value.into())],
        )
    }

    /// Inclusive year window over a date/timestamp column. Either bound may be
    /// absent; `None` when both are.
    pub fn year_range(column: &'static str, from: Option<i32>, to: Option<i32>) -> Option<Self> {
        match (from, to) {
            (Some(from), Some(to)) => Some(Self::new(
                format!("EXTRACT(YEAR FROM {}) BETWEEN {{0}} AND {{1}}", column),
                vec![SqlParam::Int(from as i64), SqlParam::Int(to as i64)],
            )),
            (Some(from), None) => Some(Self::new(
                format!("EXTRACT(YEAR FROM {}) >= {{0}}", column),
                vec![SqlParam::Int(from as i64)],
            )),
            (None, Some(to)) => Some(Self::new(
                format!("EXTRACT(YEAR FROM {}) <= {{0}}", column),
                vec![SqlParam::Int(to as i64)],
            )),
            (None, None) => None,
        }
    }

    pub fn args(&self) -> &[SqlParam] {
        &self.args
    }

    /// Render the fragment with its first argument bound at `$(offset + 1)`.
    pub fn render(&self, offset: usize) -> String {
        let mut sql = self.template.clone();
        // Replace highest indices first so `{1}` never clobbers part of `{10}`.
        for i in (0..self.args.len()).rev() {
            sql = sql.replace(&format!("{{{}}}", i), &format!("${}", offset + i + 1));
        }
        sql
    }
}

/// Treat blank query-string values the same as missing ones.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_reuses_markers() {
        let p = Predicate::raw("(a = {0} OR b = {0})", vec![SqlParam::Int(7)]);
        assert_eq!(p.render(2), "(a = $3 OR b = $3)");
    }

    #[test]
    fn ilike_renders_at_offset() {
        let p = Predicate::ilike("titulo", "vento");
        assert_eq!(p.render(0), "titulo ILIKE '%' || $1 || '%'");
        assert_eq!(p.render(3), "titulo ILIKE '%' || $4 || '%'");
        assert_eq!(p.args(), &[SqlParam::Text("vento".into())]);
    }

    #[test]
    fn multi_column_search_binds_once() {
        let p = Predicate::ilike_any_of(&["titulo", "categoria"], "lidar");
        assert_eq!(
            p.render(1),
            "(titulo ILIKE '%' || $2 || '%' OR categoria ILIKE '%' || $2 || '%')"
        );
        assert_eq!(p.args().len(), 1);
    }

    #[test]
    fn array_membership_forms() {
        assert_eq!(Predicate::array_contains("autores", "Ana").render(0), "$1 = ANY(autores)");
        assert_eq!(
            Predicate::array_ilike("tags", "clima").render(2),
            "EXISTS (SELECT 1 FROM unnest(tags) AS item WHERE item ILIKE '%' || $3 || '%')"
        );
    }

    #[test]
    fn year_range_variants() {
        let both = Predicate::year_range("data_publicacao", Some(2020), Some(2022)).unwrap();
        assert_eq!(both.render(0), "EXTRACT(YEAR FROM data_publicacao) BETWEEN $1 AND $2");
        assert_eq!(both.args(), &[SqlParam::Int(2020), SqlParam::Int(2022)]);

        let from = Predicate::year_range("data_publicacao", Some(2020), None).unwrap();
        assert_eq!(from.render(0), "EXTRACT(YEAR FROM data_publicacao) >= $1");

        assert!(Predicate::year_range("data_publicacao", None, None).is_none());
    }

    #[test]
    fn fixed_has_no_args() {
        let p = Predicate::fixed("visibilidade = true");
        assert_eq!(p.render(5), "visibilidade = true");
        assert!(p.args().is_empty());
    }

    #[test]
    fn blank_values_are_absent() {
        assert_eq!(non_empty(Some("  ")), None);
        assert_eq!(non_empty(Some(" chuva ")), Some("chuva"));
        assert_eq!(non_empty(None), None);
    }
}
