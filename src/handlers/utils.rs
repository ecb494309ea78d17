use std::collections::HashMap;

use axum::http::HeaderMap;
use once_cell::sync::Lazy;
use rand::{distributions::Alphanumeric, Rng};
use uuid::Uuid;

use crate::error::ApiError;
use crate::filter::{non_empty, FilterError};

pub const IDENTIFIER_LEN: usize = 10;

/// Accented and separator characters folded before slugging.
static SLUG_FOLD: Lazy<HashMap<char, char>> = Lazy::new(|| {
    let groups = [
        ("àáäâã", 'a'),
        ("èéëê", 'e'),
        ("ìíïî", 'i'),
        ("òóöôõ", 'o'),
        ("ùúüûũ", 'u'),
        ("ñ", 'n'),
        ("ç", 'c'),
        ("·/_,:;", '-'),
    ];
    groups
        .iter()
        .flat_map(|(from, to)| from.chars().map(move |c| (c, *to)))
        .collect()
});

/// URL slug: lowercase ASCII letters and digits joined by single hyphens.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for ch in input.to_lowercase().chars() {
        let ch = SLUG_FOLD.get(&ch).copied().unwrap_or(ch);
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if (ch == '-' || ch.is_whitespace()) && !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Short public identifier paired with the slug in content URLs.
pub fn make_identifier() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(IDENTIFIER_LEN)
        .map(char::from)
        .collect()
}

/// First hop of `X-Forwarded-For`, else `X-Real-IP`.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    forwarded.or_else(real_ip).map(String::from)
}

pub fn parse_uuid(raw: &str, label: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::bad_request(format!("Invalid {} id: '{}'", label, raw)))
}

/// Optional year query parameter.
pub fn parse_year(value: Option<&str>, name: &str) -> Result<Option<i32>, FilterError> {
    match non_empty(value) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i32>()
            .map(Some)
            .map_err(|_| FilterError::InvalidValue(format!("{} must be a year, got '{}'", name, raw))),
    }
}

/// Trimmed required text field from a request body.
pub fn required_field<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, ApiError> {
    non_empty(value).ok_or_else(|| ApiError::bad_request(format!("{} is required", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn slug_folds_accents_and_separators() {
        assert_eq!(slugify("Ação Climática: Análise_2024"), "acao-climatica-analise-2024");
        assert_eq!(slugify("  Ventos   no Nordeste  "), "ventos-no-nordeste");
        assert_eq!(slugify("Medições LIDAR/SODAR"), "medicoes-lidar-sodar");
        assert_eq!(slugify("Pré-campanha"), "pre-campanha");
        assert_eq!(slugify("Brisa (marinha)!"), "brisa-marinha");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn identifier_is_ten_alphanumerics() {
        let id = make_identifier();
        assert_eq!(id.len(), IDENTIFIER_LEN);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(make_identifier(), id);
    }

    #[test]
    fn client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), None);
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_ip(&headers).as_deref(), Some("10.0.0.2"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn years_parse_or_fail() {
        assert_eq!(parse_year(Some("2023"), "ano_inicio").unwrap(), Some(2023));
        assert_eq!(parse_year(Some(" "), "ano_inicio").unwrap(), None);
        assert!(parse_year(Some("vinte"), "ano_inicio").is_err());
    }
}
