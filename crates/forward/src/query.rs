//! List-view search query schema
//!
//! A paginated list view accepts `term`, `page` and `page_size`. Unknown keys
//! are ignored; known keys are shape-checked.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::form_urlencoded;

/// First page number
pub const DEFAULT_PAGE: u32 = 1;

/// Rows per page when none is requested
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest accepted page size
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid value for `{field}`: {value:?} is not a whole number")]
    InvalidNumber { field: &'static str, value: String },

    #[error("page must be at least 1")]
    PageOutOfRange,

    #[error("page_size must be between 1 and {} (got {0})", MAX_PAGE_SIZE)]
    PageSizeOutOfRange(u32),
}

/// Validated search parameters for a paginated list view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSearchQuery")]
pub struct SearchQuery {
    /// Trimmed search term; `None` when blank
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,

    /// 1-based page number
    pub page: u32,

    /// Rows per page
    pub page_size: u32,
}

/// Unvalidated shape accepted by serde
#[derive(Deserialize)]
struct RawSearchQuery {
    #[serde(default)]
    term: Option<String>,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_page_size")]
    page_size: u32,
}

impl TryFrom<RawSearchQuery> for SearchQuery {
    type Error = QueryError;

    fn try_from(raw: RawSearchQuery) -> Result<Self, Self::Error> {
        let query = Self {
            term: raw.term.as_deref().and_then(normalize_term),
            page: raw.page,
            page_size: raw.page_size,
        };
        query.validate()?;
        Ok(query)
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            term: None,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchQuery {
    /// First page of results for a raw search box value
    pub fn first_page(raw_term: &str, page_size: u32) -> Result<Self, QueryError> {
        let query = Self {
            term: normalize_term(raw_term),
            page: DEFAULT_PAGE,
            page_size,
        };
        query.validate()?;
        Ok(query)
    }

    /// Parse a query string such as `term=alice&page=2&page_size=25`
    ///
    /// A leading `?` is allowed. Missing keys take their defaults.
    pub fn parse(query_string: &str) -> Result<Self, QueryError> {
        let query_string = query_string.strip_prefix('?').unwrap_or(query_string);
        let mut query = Self::default();

        for (key, value) in form_urlencoded::parse(query_string.as_bytes()) {
            match key.as_ref() {
                "term" => query.term = normalize_term(&value),
                "page" => query.page = parse_number("page", &value)?,
                "page_size" => query.page_size = parse_number("page_size", &value)?,
                other => debug!("Ignoring unknown query key '{}'", other),
            }
        }

        query.validate()?;
        Ok(query)
    }

    /// Check ranges
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.page < 1 {
            return Err(QueryError::PageOutOfRange);
        }
        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return Err(QueryError::PageSizeOutOfRange(self.page_size));
        }
        Ok(())
    }

    /// Canonical query string (`term` omitted when blank)
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if let Some(term) = &self.term {
            serializer.append_pair("term", term);
        }
        serializer.append_pair("page", &self.page.to_string());
        serializer.append_pair("page_size", &self.page_size.to_string());
        serializer.finish()
    }
}

/// Trim a raw term; blank terms become `None`
pub fn normalize_term(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<u32, QueryError> {
    value.trim().parse().map_err(|_| QueryError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        assert_eq!(SearchQuery::parse("").unwrap(), SearchQuery::default());
        assert_eq!(SearchQuery::parse("?").unwrap(), SearchQuery::default());
    }

    #[test]
    fn test_parse_all_fields() {
        let query = SearchQuery::parse("?term=jane+doe&page=3&page_size=25").unwrap();
        assert_eq!(query.term.as_deref(), Some("jane doe"));
        assert_eq!(query.page, 3);
        assert_eq!(query.page_size, 25);
    }

    #[test]
    fn test_parse_decodes_and_trims_term() {
        let query = SearchQuery::parse("term=%20loan%2F42%20").unwrap();
        assert_eq!(query.term.as_deref(), Some("loan/42"));

        let blank = SearchQuery::parse("term=+++").unwrap();
        assert_eq!(blank.term, None);
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let query = SearchQuery::parse("status=active&term=x").unwrap();
        assert_eq!(query.term.as_deref(), Some("x"));
    }

    #[test]
    fn test_parse_rejects_malformed_numbers() {
        let err = SearchQuery::parse("page=two").unwrap_err();
        assert_eq!(
            err,
            QueryError::InvalidNumber {
                field: "page",
                value: "two".to_string()
            }
        );
        assert!(SearchQuery::parse("page_size=-1").is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert_eq!(SearchQuery::parse("page=0").unwrap_err(), QueryError::PageOutOfRange);
        assert_eq!(
            SearchQuery::parse("page_size=101").unwrap_err(),
            QueryError::PageSizeOutOfRange(101)
        );
        assert_eq!(
            SearchQuery::parse("page_size=0").unwrap_err(),
            QueryError::PageSizeOutOfRange(0)
        );
    }

    #[test]
    fn test_query_string_is_canonical() {
        let query = SearchQuery::first_page("  acme  corp ", 20).unwrap();
        assert_eq!(query.to_query_string(), "term=acme++corp&page=1&page_size=20");
        assert_eq!(SearchQuery::parse(&query.to_query_string()).unwrap(), query);

        assert_eq!(SearchQuery::default().to_query_string(), "page=1&page_size=10");
    }

    #[test]
    fn test_deserialize_validates() {
        let query: SearchQuery = serde_json::from_str(r#"{"term":" a "}"#).unwrap();
        assert_eq!(query.term.as_deref(), Some("a"));
        assert_eq!(query.page, DEFAULT_PAGE);
        assert_eq!(query.page_size, DEFAULT_PAGE_SIZE);

        assert!(serde_json::from_str::<SearchQuery>(r#"{"page_size":500}"#).is_err());
    }

    #[test]
    fn test_serialize_omits_blank_term() {
        let json = serde_json::to_string(&SearchQuery::default()).unwrap();
        assert_eq!(json, r#"{"page":1,"page_size":10}"#);
    }
}
