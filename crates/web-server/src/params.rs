//! Query-string parameters every report accepts.

use chrono::NaiveDate;
use configuration::ReportSettings;
use core_types::filters::lenient;
use core_types::{DateField, DateRange, PageRequest, clamp_per_page, resolve};
use serde::Deserialize;

/// Paging, range and export switches. Report-specific filters are extracted
/// separately from the same query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportParams {
    #[serde(default, deserialize_with = "lenient")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub per_page: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub range: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient")]
    pub to: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient")]
    pub export: Option<String>,
    /// Enrollment report anchor.
    #[serde(default, deserialize_with = "lenient")]
    pub date_by: Option<DateField>,
    /// Negotiator report anchor.
    #[serde(default, deserialize_with = "lenient")]
    pub date_field: Option<DateField>,
}

impl ReportParams {
    pub fn wants_csv(&self) -> bool {
        self.export.as_deref() == Some("csv")
    }

    pub fn page_request(&self, settings: &ReportSettings) -> PageRequest {
        let per_page = clamp_per_page(self.per_page, settings.default_per_page, settings.max_per_page);
        PageRequest::new(self.page, per_page)
    }

    pub fn token(&self) -> Option<&str> {
        self.range.as_deref()
    }

    /// Token plus explicit bounds, resolved the common way.
    pub fn range(&self, today: NaiveDate) -> DateRange {
        resolve(self.token(), self.from, self.to, today)
    }

    /// Like [`range`](Self::range) but a missing token means `default`.
    pub fn range_or(&self, default: &str, today: NaiveDate) -> DateRange {
        resolve(Some(self.token().unwrap_or(default)), self.from, self.to, today)
    }

    /// Explicit bounds only, ignoring the token.
    pub fn explicit(&self) -> DateRange {
        DateRange::new(self.from, self.to, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(query: &str) -> ReportParams {
        let uri = format!("http://localhost/reports?{query}").parse().unwrap();
        axum::extract::Query::<ReportParams>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn per_page_is_clamped_to_the_configured_bounds() {
        let settings = ReportSettings::default();
        assert_eq!(parse("per_page=5000").page_request(&settings).per_page, 25);
        assert_eq!(parse("per_page=0").page_request(&settings).per_page, 25);
        assert_eq!(parse("per_page=abc").page_request(&settings).per_page, 25);
        assert_eq!(parse("per_page=1000&page=3").page_request(&settings), PageRequest::new(Some(3), 1000));
    }

    #[test]
    fn malformed_dates_are_ignored() {
        let params = parse("from=2024-13-45&to=2024-02-01&range=custom&date_by=welcome_call");
        assert_eq!(params.from, None);
        assert_eq!(params.to, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(params.date_by, Some(DateField::WelcomeCall));
    }

    #[test]
    fn missing_token_can_default() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let params = parse("from=2024-01-01");
        assert_eq!(params.range_or("all", today), DateRange::new(None, None, Some("all".into())));
        assert_eq!(params.range(today).from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert!(parse("export=csv").wants_csv());
    }
}
