use serde::Deserialize;

use super::error::FilterError;

/// Raw paging parameters as they arrive in the query string.
///
/// Both the Portuguese and English names are accepted. Values stay strings
/// so that bad input can be reported as a 400 with a useful message.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(alias = "page")]
    pub pagina: Option<String>,
    #[serde(alias = "page_size")]
    pub itens_por_pagina: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Pagination {
    pub fn new(page: i64, page_size: i64) -> Result<Self, FilterError> {
        if page < 1 {
            return Err(FilterError::InvalidPagination("page must be >= 1".to_string()));
        }
        if page_size < 1 {
            return Err(FilterError::InvalidPagination("page size must be >= 1".to_string()));
        }
        // OFFSET must fit in a bigint
        if (page - 1).checked_mul(page_size).is_none() {
            return Err(FilterError::InvalidPagination(format!(
                "page {} is out of range for page size {}",
                page, page_size
            )));
        }
        Ok(Self { page, page_size })
    }

    /// Resolve query parameters against an endpoint default, capping the page
    /// size at `max_page_size`.
    pub fn from_params(params: &PageParams, default_page_size: i64, max_page_size: i64) -> Result<Self, FilterError> {
        let page = parse_positive(params.pagina.as_deref(), "pagina")?.unwrap_or(1);
        let requested = parse_positive(params.itens_por_pagina.as_deref(), "itens_por_pagina")?
            .unwrap_or(default_page_size);

        let page_size = if requested > max_page_size {
            tracing::debug!("page size {} exceeds max {}, capping", requested, max_page_size);
            max_page_size
        } else {
            requested
        };

        Self::new(page, page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

fn parse_positive(value: Option<&str>, name: &str) -> Result<Option<i64>, FilterError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<i64>() {
        Ok(n) if n >= 1 => Ok(Some(n)),
        _ => Err(FilterError::InvalidPagination(format!(
            "{} must be a positive integer, got '{}'",
            name, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<&str>, size: Option<&str>) -> PageParams {
        PageParams {
            pagina: page.map(String::from),
            itens_por_pagina: size.map(String::from),
        }
    }

    #[test]
    fn defaults_to_first_page_and_endpoint_size() {
        let p = Pagination::from_params(&PageParams::default(), 12, 100).unwrap();
        assert_eq!(p, Pagination { page: 1, page_size: 12 });
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn offset_is_page_minus_one_times_size() {
        let p = Pagination::from_params(&params(Some("3"), Some("8")), 12, 100).unwrap();
        assert_eq!(p.offset(), 16);
        assert_eq!(p.limit(), 8);
    }

    #[test]
    fn caps_page_size() {
        let p = Pagination::from_params(&params(None, Some("5000")), 10, 100).unwrap();
        assert_eq!(p.page_size, 100);
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert!(Pagination::from_params(&params(Some("0"), None), 10, 100).is_err());
        assert!(Pagination::from_params(&params(Some("abc"), None), 10, 100).is_err());
        assert!(Pagination::from_params(&params(None, Some("-2")), 10, 100).is_err());
    }

    #[test]
    fn rejects_pages_whose_offset_overflows() {
        let err = Pagination::from_params(&params(Some("9223372036854775807"), Some("10")), 10, 100).unwrap_err();
        assert!(matches!(err, FilterError::InvalidPagination(_)));

        let last = Pagination::from_params(&params(Some("922337203685477580"), Some("10")), 10, 100).unwrap();
        assert_eq!(last.offset(), 9_223_372_036_854_775_790);
    }

    #[test]
    fn blank_values_use_defaults() {
        let p = Pagination::from_params(&params(Some(""), Some(" ")), 8, 100).unwrap();
        assert_eq!(p, Pagination { page: 1, page_size: 8 });
    }
}
