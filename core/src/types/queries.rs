//! List query parameters.

use chrono::{DateTime, FixedOffset};

use crate::error::{FacturapiError, Result};
use crate::sanitize::{Sanitize, Value};

/// Largest page the server hands out.
pub const MAX_PAGE_SIZE: u32 = 50;

/// First page number.
pub const MIN_PAGE: u32 = 1;

/// Filters for a list operation.
///
/// Only fields that are set are sent; the server applies its own defaults
/// for the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Free-text search.
    pub q: Option<String>,
    /// Page size, `1..=MAX_PAGE_SIZE`.
    pub limit: Option<u32>,
    /// Page number, starting at `MIN_PAGE`.
    pub page: Option<u32>,
    pub date: Option<DateFilter>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query matching the free-text `q`.
    pub fn search(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_date(mut self, date: DateFilter) -> Self {
        self.date = Some(date);
        self
    }

    /// Reject out-of-range page sizes and page numbers.
    pub fn validate(&self) -> Result<()> {
        if let Some(limit) = self.limit {
            if !(1..=MAX_PAGE_SIZE).contains(&limit) {
                return Err(FacturapiError::Validation(format!(
                    "limit must be between 1 and {MAX_PAGE_SIZE}, got {limit}"
                )));
            }
        }
        if let Some(page) = self.page {
            if page < MIN_PAGE {
                return Err(FacturapiError::Validation(format!(
                    "page must be at least {MIN_PAGE}, got {page}"
                )));
            }
        }
        Ok(())
    }

    /// Query-string pairs for the fields that are set.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(q) = &self.q {
            params.push(("q".to_string(), q.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }
        if let Some(date) = &self.date {
            params.extend(date.to_params());
        }
        params
    }
}

/// Date range on the creation date of the listed resources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateFilter {
    pub gt: Option<DateTime<FixedOffset>>,
    pub gte: Option<DateTime<FixedOffset>>,
    pub lt: Option<DateTime<FixedOffset>>,
    pub lte: Option<DateTime<FixedOffset>>,
}

impl DateFilter {
    fn to_params(&self) -> Vec<(String, String)> {
        [
            ("gt", &self.gt),
            ("gte", &self.gte),
            ("lt", &self.lt),
            ("lte", &self.lte),
        ]
        .into_iter()
        .filter_map(|(op, bound)| {
            let Value::String(rendered) = bound.as_ref()?.sanitize() else {
                return None;
            };
            Some((format!("date[{op}]"), rendered))
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn only_set_fields_become_params() {
        let query = Query::search("Frida");
        assert_eq!(query.to_params(), vec![("q".to_string(), "Frida".to_string())]);
        assert!(Query::new().to_params().is_empty());
    }

    #[test]
    fn limit_above_max_is_rejected() {
        let err = Query::search("Frida").with_limit(51).validate().unwrap_err();
        assert!(matches!(err, FacturapiError::Validation(_)));
        assert!(Query::new().with_limit(0).validate().is_err());
        assert!(Query::new().with_limit(MAX_PAGE_SIZE).validate().is_ok());
    }

    #[test]
    fn page_below_min_is_rejected() {
        assert!(Query::search("Frida").with_page(0).validate().is_err());
        assert!(Query::new().with_page(1).validate().is_ok());
    }

    #[test]
    fn date_filter_renders_bracketed_params() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let query = Query::new().with_limit(10).with_date(DateFilter {
            gte: Some(offset.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            lt: Some(offset.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        });
        assert_eq!(
            query.to_params(),
            vec![
                ("limit".to_string(), "10".to_string()),
                ("date[gte]".to_string(), "2024-01-01T00:00:00+00:00".to_string()),
                ("date[lt]".to_string(), "2024-02-01T00:00:00+00:00".to_string()),
            ]
        );
    }
}
