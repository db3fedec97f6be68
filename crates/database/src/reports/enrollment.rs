use chrono::NaiveDate;
use core_types::{Company, DateField, DateRange, EnrollmentFilters};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use super::{OptionColumn, OptionSource};
use crate::query::{Predicates, ReportQuery, Sql, date_field_column};

pub const OPTIONS: OptionSource = OptionSource {
    table: "enrollments",
    scope: None,
    columns: &[
        OptionColumn::new("states", "state"),
        OptionColumn::new("agents", "agent"),
        OptionColumn::new("negotiators", "negotiator"),
        OptionColumn::new("enrollment_statuses", "enrollment_status"),
    ],
};

#[derive(Debug, Clone)]
pub struct EnrollmentQuery {
    pub range: DateRange,
    pub date_field: DateField,
    pub filters: EnrollmentFilters,
}

impl Default for EnrollmentQuery {
    fn default() -> Self {
        Self {
            range: DateRange::default(),
            date_field: DateField::Submitted,
            filters: EnrollmentFilters::default(),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnrollmentRow {
    pub pk: i64,
    pub drop_name: Option<String>,
    pub llg_id: i64,
    pub category: Option<String>,
    pub state: Option<String>,
    pub agent: Option<String>,
    pub negotiator: Option<String>,
    pub client: Option<String>,
    pub debt_amount: Option<Decimal>,
    pub welcome_call_date: Option<NaiveDate>,
    pub submitted_date: Option<NaiveDate>,
    pub payment_date_1: Option<NaiveDate>,
    pub payment_date_2: Option<NaiveDate>,
    pub first_payment_cleared_date: Option<NaiveDate>,
    pub cancel_date: Option<NaiveDate>,
    pub nsf_date: Option<NaiveDate>,
    pub payments: Option<Decimal>,
}

/// Filters shared by the enrollment, cancel and NSF reports. Column names are
/// unqualified and refer to `enrollments`.
pub(crate) fn apply_enrollment_filters(p: &mut Predicates<'_>, f: &EnrollmentFilters) {
    p.contains("agent", f.agent.as_deref())
        .contains("client", f.client.as_deref())
        .contains("negotiator", f.negotiator.as_deref())
        .equals_text("state", f.state.as_deref())
        .equals_text("enrollment_status", f.enrollment_status.as_deref())
        .at_least("debt_amount", f.debt_min)
        .at_most("debt_amount", f.debt_max)
        .at_least("program_length", f.length_min)
        .at_most("program_length", f.length_max);

    match f.company {
        Some(Company::Progress) => {
            p.contains("enrollment_plan", Some("Progress"));
        }
        Some(Company::Ldr) => {
            p.not_contains("enrollment_plan", Some("Progress"));
        }
        None => {}
    }
}

impl ReportQuery for EnrollmentQuery {
    type Row = EnrollmentRow;

    fn push_base(&self, sql: &mut Sql) {
        sql.push(
            "SELECT pk, drop_name, llg_id, category, state, agent, negotiator, client, debt_amount, \
             welcome_call_date, submitted_date, payment_date_1, payment_date_2, \
             first_payment_cleared_date, cancel_date, nsf_date, payments FROM enrollments",
        );

        let mut p = Predicates::new(sql);
        p.within(date_field_column(self.date_field), &self.range);
        apply_enrollment_filters(&mut p, &self.filters);
    }

    fn order_by(&self) -> &'static str {
        "submitted_date DESC"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::render;

    #[test]
    fn payment_anchor_uses_the_fallback_chain() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let query = EnrollmentQuery {
            range: DateRange::new(Some(day), None, Some("custom".into())),
            date_field: DateField::Payment,
            filters: EnrollmentFilters {
                company: Some(Company::Ldr),
                ..EnrollmentFilters::default()
            },
        };
        let sql = render(&query);
        assert!(sql.sql().contains(
            "WHERE CAST(COALESCE(first_payment_cleared_date, payment_date_2, payment_date_1) AS date) >= $1 \
             AND enrollment_plan NOT ILIKE $2"
        ));
    }

    #[test]
    fn defaults_anchor_on_submitted_date() {
        let query = EnrollmentQuery {
            range: DateRange::new(None, NaiveDate::from_ymd_opt(2024, 6, 30), None),
            ..EnrollmentQuery::default()
        };
        let sql = render(&query);
        assert!(sql.sql().contains("WHERE CAST(submitted_date AS date) <= $1 ORDER BY submitted_date DESC"));
    }
}
