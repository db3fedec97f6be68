use chrono::NaiveDate;
use core_types::{DateRange, DebtTier, LeadFilters, LeadStatusType, classify_inclusive_of_zero};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use super::{OptionColumn, OptionSource};
use crate::query::{Predicates, ReportQuery, Sql};

pub const OPTIONS: OptionSource = OptionSource {
    table: "contacts",
    scope: None,
    columns: &[
        OptionColumn::new("agents", "agent"),
        OptionColumn::new("data_sources", "data_source"),
    ],
};

/// Contacts with their enrollment milestones rolled up, bounded on creation date.
#[derive(Debug, Clone, Default)]
pub struct LeadQuery {
    pub range: DateRange,
    pub filters: LeadFilters,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeadRow {
    pub created_date: Option<NaiveDate>,
    pub assigned_date: Option<NaiveDate>,
    pub llg_id: i64,
    pub campaign: Option<String>,
    pub data_source: Option<String>,
    pub agent: Option<String>,
    pub client: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub state: Option<String>,
    pub stage: Option<String>,
    pub status: Option<String>,
    pub debt_amount: Option<Decimal>,
    pub enrolled_debt: Decimal,
    pub submitted_date: Option<NaiveDate>,
    pub welcome_call_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
    pub cancel_date: Option<NaiveDate>,
    pub nsf_date: Option<NaiveDate>,
    #[sqlx(skip)]
    pub debt_tier: Option<DebtTier>,
}

const CONTACT_COLUMNS: &str = "c.created_date, c.assigned_date, c.llg_id, c.campaign, c.data_source, \
     c.agent, c.client, c.phone, c.email, c.state, c.stage, c.status, c.debt_amount";

impl ReportQuery for LeadQuery {
    type Row = LeadRow;

    fn push_base(&self, sql: &mut Sql) {
        sql.push("SELECT ")
            .push(CONTACT_COLUMNS)
            .push(
                ", SUM(COALESCE(e.debt_amount, 0)) AS enrolled_debt, \
                 MAX(e.submitted_date) AS submitted_date, \
                 MAX(e.welcome_call_date) AS welcome_call_date, \
                 MAX(COALESCE(e.first_payment_date, e.payment_date_1)) AS payment_date, \
                 MAX(e.cancel_date) AS cancel_date, \
                 MAX(e.nsf_date) AS nsf_date \
                 FROM contacts AS c LEFT JOIN enrollments AS e ON c.llg_id = e.llg_id",
            );

        let filters = &self.filters;
        let mut p = Predicates::new(sql);
        p.within("c.created_date", &self.range)
            .contains("c.agent", filters.agent.as_deref())
            .contains("c.data_source", filters.data_source.as_deref());

        if let Some(tier) = filters.debt_tier {
            let (lower, upper) = tier.bounds();
            p.at_least("c.debt_amount", Some(lower)).below("c.debt_amount", upper);
        }

        match filters.status_type() {
            LeadStatusType::All => {}
            LeadStatusType::Active => {
                p.raw("c.status = 'Active'");
            }
            LeadStatusType::Cancels => {
                p.not_null("e.cancel_date");
            }
            LeadStatusType::Nsfs => {
                p.not_null("e.nsf_date");
            }
            LeadStatusType::NotClosed => {
                p.is_null("e.submitted_date");
            }
        }

        sql.push(" GROUP BY ").push(CONTACT_COLUMNS);
    }

    fn order_by(&self) -> &'static str {
        "c.created_date DESC"
    }

    fn finish(&self, row: &mut LeadRow) {
        row.debt_tier = row.debt_amount.and_then(classify_inclusive_of_zero);
    }
}

/// Fixed tier dropdown, "1" through "9".
pub fn tier_options() -> Vec<String> {
    DebtTier::ALL.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::render;

    #[test]
    fn tier_filter_becomes_a_half_open_amount_range() {
        let query = LeadQuery {
            filters: LeadFilters {
                debt_tier: DebtTier::new(2),
                status_type: Some(LeadStatusType::NotClosed),
                ..LeadFilters::default()
            },
            ..LeadQuery::default()
        };
        let sql = render(&query);
        assert!(sql.sql().contains(
            "WHERE c.debt_amount >= $1 AND c.debt_amount < $2 AND e.submitted_date IS NULL GROUP BY"
        ));
        assert!(sql.sql().ends_with("ORDER BY c.created_date DESC"));
    }

    #[test]
    fn top_tier_has_no_upper_bound() {
        let query = LeadQuery {
            filters: LeadFilters { debt_tier: DebtTier::new(9), ..LeadFilters::default() },
            ..LeadQuery::default()
        };
        let sql = render(&query);
        assert!(sql.sql().contains("WHERE c.debt_amount >= $1 GROUP BY"));
    }

    #[test]
    fn tier_options_list_every_tier() {
        assert_eq!(tier_options(), vec!["1", "2", "3", "4", "5", "6", "7", "8", "9"]);
    }
}
