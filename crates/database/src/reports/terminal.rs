use chrono::NaiveDate;
use core_types::{DateRange, EnrollmentFilters, TerminalEvent};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use super::enrollment::apply_enrollment_filters;
use super::{OptionColumn, OptionSource};
use crate::query::{Predicates, ReportQuery, Sql};

const OPTION_COLUMNS: &[OptionColumn] = &[
    OptionColumn::new("states", "state"),
    OptionColumn::new("agents", "agent"),
    OptionColumn::new("negotiators", "negotiator"),
    OptionColumn::new("enrollment_statuses", "enrollment_status"),
    OptionColumn::wide("clients", "client"),
];

/// Column holding the event date.
pub fn event_column(event: TerminalEvent) -> &'static str {
    match event {
        TerminalEvent::Cancel => "cancel_date",
        TerminalEvent::Nsf => "nsf_date",
    }
}

/// Dropdowns only list values seen on rows that carry the event.
pub fn options(event: TerminalEvent) -> OptionSource {
    OptionSource {
        table: "enrollments",
        scope: Some(match event {
            TerminalEvent::Cancel => "cancel_date IS NOT NULL",
            TerminalEvent::Nsf => "nsf_date IS NOT NULL",
        }),
        columns: OPTION_COLUMNS,
    }
}

/// Enrollments that were cancelled or bounced (NSF).
#[derive(Debug, Clone)]
pub struct TerminalQuery {
    pub event: TerminalEvent,
    /// Bounds on the event date itself.
    pub event_range: DateRange,
    /// Bounds on the submitted date.
    pub submitted_range: DateRange,
    pub filters: EnrollmentFilters,
}

impl TerminalQuery {
    pub fn new(event: TerminalEvent) -> Self {
        Self {
            event,
            event_range: DateRange::default(),
            submitted_range: DateRange::default(),
            filters: EnrollmentFilters::default(),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TerminalRow {
    pub drop_name: Option<String>,
    pub llg_id: i64,
    pub state: Option<String>,
    pub agent: Option<String>,
    pub client: Option<String>,
    pub debt_amount: Option<Decimal>,
    pub welcome_call_date: Option<NaiveDate>,
    pub payment_date_1: Option<NaiveDate>,
    pub payment_date_2: Option<NaiveDate>,
    pub cancel_date: Option<NaiveDate>,
    pub nsf_date: Option<NaiveDate>,
    pub payments: Option<Decimal>,
    pub negotiator: Option<String>,
    pub negotiator_assigned_date: Option<NaiveDate>,
    pub first_payment_date: Option<NaiveDate>,
    pub first_payment_cleared_date: Option<NaiveDate>,
    pub enrolled_debt_accounts: Option<i32>,
    pub enrollment_status: Option<String>,
    pub enrollment_plan: Option<String>,
    pub program_payment: Option<Decimal>,
    pub program_length: Option<i32>,
    pub first_payment_status: Option<String>,
    pub submitted_date: Option<NaiveDate>,
}

impl ReportQuery for TerminalQuery {
    type Row = TerminalRow;

    fn push_base(&self, sql: &mut Sql) {
        sql.push(
            "SELECT drop_name, llg_id, state, agent, client, debt_amount, welcome_call_date, \
             payment_date_1, payment_date_2, cancel_date, nsf_date, payments, negotiator, \
             negotiator_assigned_date, first_payment_date, first_payment_cleared_date, \
             enrolled_debt_accounts, enrollment_status, enrollment_plan, program_payment, \
             program_length, first_payment_status, submitted_date FROM enrollments",
        );

        let column = event_column(self.event);
        let mut p = Predicates::new(sql);
        p.not_null(column)
            .within(column, &self.event_range)
            .within("submitted_date", &self.submitted_range);
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
    fn event_presence_is_always_required() {
        let sql = render(&TerminalQuery::new(TerminalEvent::Nsf));
        assert!(sql.sql().contains("FROM enrollments WHERE nsf_date IS NOT NULL ORDER BY"));
    }

    #[test]
    fn event_and_submitted_windows_are_independent() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let mut query = TerminalQuery::new(TerminalEvent::Cancel);
        query.event_range = DateRange::new(Some(day), None, None);
        query.submitted_range = DateRange::new(None, Some(day), Some("last_month".into()));
        query.filters.client = Some("Smith".into());

        let sql = render(&query);
        assert!(sql.sql().contains(
            "WHERE cancel_date IS NOT NULL AND CAST(cancel_date AS date) >= $1 \
             AND CAST(submitted_date AS date) <= $2 AND client ILIKE $3"
        ));
    }

    #[test]
    fn options_are_scoped_to_the_event() {
        assert_eq!(options(TerminalEvent::Cancel).scope, Some("cancel_date IS NOT NULL"));
        assert!(options(TerminalEvent::Nsf).columns.iter().any(|c| c.wide && c.key == "clients"));
    }
}
