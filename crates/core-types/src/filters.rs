//! Typed filter sets, one per report.
//!
//! Every field is optional and parsed leniently: blank or malformed query-string
//! values become `None` (no predicate) instead of rejecting the request.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::enums::{
    Company, EnrollmentStatusFilter, LeadStatusType, NegotiatorReportType, ReadyFlag,
};
use crate::tier::DebtTier;

/// Dropdown sentinel meaning "no data-source filter" on the team ranks report.
pub const ALL_DATA_SOURCES: &str = "All Data Sources";

/// Deserializes an optional value from its trimmed string form, mapping blank
/// or unparsable input to `None`.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            trimmed.parse().ok()
        }
    }))
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LeadFilters {
    #[serde(default, deserialize_with = "lenient")]
    pub agent: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub data_source: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub debt_tier: Option<DebtTier>,
    #[serde(default, deserialize_with = "lenient")]
    pub status_type: Option<LeadStatusType>,
}

impl LeadFilters {
    pub fn status_type(&self) -> LeadStatusType {
        self.status_type.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ContactFilters {
    #[serde(default, deserialize_with = "lenient")]
    pub agent: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub client: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub data_source: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub stage: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub debt_min: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub debt_max: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub score_min: Option<i32>,
    #[serde(default, deserialize_with = "lenient")]
    pub score_max: Option<i32>,
}

/// Filters shared by the enrollment, cancel and NSF reports.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EnrollmentFilters {
    #[serde(default, deserialize_with = "lenient")]
    pub agent: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub client: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub negotiator: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub enrollment_status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub debt_min: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub debt_max: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub length_min: Option<i32>,
    #[serde(default, deserialize_with = "lenient")]
    pub length_max: Option<i32>,
    #[serde(default, deserialize_with = "lenient")]
    pub company: Option<Company>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MarketingFilters {
    #[serde(default, deserialize_with = "lenient")]
    pub drop_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub debt_tier: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub drop_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub vendor: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub data_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub mail_style: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ProgramCompletionFilters {
    #[serde(default, deserialize_with = "lenient")]
    pub llg_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub client: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NegotiatorFilters {
    #[serde(default, deserialize_with = "lenient")]
    pub negotiator: Option<String>,
    /// Drop name the account enrolled under; `all` disables the filter.
    #[serde(default, deserialize_with = "lenient")]
    pub ngo: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub enrollment_status: Option<EnrollmentStatusFilter>,
    #[serde(default, deserialize_with = "lenient")]
    pub assignment_status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub ready_flag: Option<ReadyFlag>,
    #[serde(default, deserialize_with = "lenient")]
    pub creditor: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub collection_company: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub debt_min: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub debt_max: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub follow_up_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient")]
    pub follow_up_to: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient")]
    pub ready_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient")]
    pub ready_to: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient")]
    pub settlement_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient")]
    pub settlement_to: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_payment_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_payment_to: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient")]
    pub report_type: Option<NegotiatorReportType>,
}

impl NegotiatorFilters {
    pub fn ngo(&self) -> Option<&str> {
        self.ngo.as_deref().filter(|ngo| *ngo != "all")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TeamRanksFilters {
    #[serde(default, deserialize_with = "lenient")]
    pub data_source: Option<String>,
}

impl TeamRanksFilters {
    /// The selected data source, with the "all" sentinel mapped to `None`.
    pub fn data_source(&self) -> Option<&str> {
        self.data_source
            .as_deref()
            .filter(|source| *source != ALL_DATA_SOURCES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn blank_and_malformed_values_become_none() {
        let filters: ContactFilters = serde_json::from_value(json!({
            "agent": "  Jane ",
            "client": "",
            "debt_min": "abc",
            "debt_max": "2500.50",
            "score_min": "7x",
        }))
        .unwrap();

        assert_eq!(filters.agent.as_deref(), Some("Jane"));
        assert_eq!(filters.client, None);
        assert_eq!(filters.debt_min, None);
        assert_eq!(filters.debt_max, Some(dec!(2500.50)));
        assert_eq!(filters.score_min, None);
    }

    #[test]
    fn negotiator_filters_parse_dates_and_buckets() {
        let filters: NegotiatorFilters = serde_json::from_value(json!({
            "ngo": "all",
            "enrollment_status": "not_closed",
            "ready_flag": "maybe",
            "follow_up_from": "2024-02-30",
            "follow_up_to": "2024-03-01",
            "report_type": "settled",
        }))
        .unwrap();

        assert_eq!(filters.ngo(), None);
        assert_eq!(filters.enrollment_status, Some(EnrollmentStatusFilter::NotClosed));
        assert_eq!(filters.ready_flag, None);
        assert_eq!(filters.follow_up_from, None);
        assert_eq!(filters.follow_up_to, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(filters.report_type, Some(NegotiatorReportType::Settled));
    }

    #[test]
    fn data_source_sentinel_means_unfiltered() {
        let all = TeamRanksFilters { data_source: Some(ALL_DATA_SOURCES.into()) };
        assert_eq!(all.data_source(), None);
        let one = TeamRanksFilters { data_source: Some("Mailers".into()) };
        assert_eq!(one.data_source(), Some("Mailers"));
    }

    #[test]
    fn lead_status_defaults_to_all() {
        let filters: LeadFilters = serde_json::from_value(json!({ "debt_tier": "4" })).unwrap();
        assert_eq!(filters.status_type(), LeadStatusType::All);
        assert_eq!(filters.debt_tier.map(DebtTier::get), Some(4));
    }
}
