use analytics::completion::{program_completion, settlement_rate};
use chrono::NaiveDate;
use core_types::{DateRange, ProgramCompletionFilters};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use crate::query::{Predicates, ReportQuery, Sql};

/// Settled share of enrolled debt, as an ordering expression over the grouped rows.
const COMPLETION_ORDER: &str = "CASE WHEN MAX(e.enrolled_debt) IS NULL OR MAX(e.enrolled_debt) = 0 THEN 0 \
     ELSE SUM(COALESCE(s.debt_amount, 0)) / MAX(e.enrolled_debt) END DESC";

/// Settlements rolled up per account against the account's enrolled debt.
#[derive(Debug, Clone, Default)]
pub struct ProgramCompletionQuery {
    pub range: DateRange,
    pub filters: ProgramCompletionFilters,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProgramCompletionRow {
    pub llg_id: i64,
    pub client: Option<String>,
    pub welcome_call_date: Option<NaiveDate>,
    pub total_settlement_amounts_accepted: Decimal,
    pub original_debt_amount_settled: Decimal,
    pub enrolled_debt: Option<Decimal>,
    pub latest_settlement_date: Option<NaiveDate>,
    #[sqlx(skip)]
    pub settlement_rate: Decimal,
    #[sqlx(skip)]
    pub program_completion: Decimal,
}

impl ReportQuery for ProgramCompletionQuery {
    type Row = ProgramCompletionRow;

    fn push_base(&self, sql: &mut Sql) {
        sql.push(
            "SELECT s.llg_id, MAX(s.client) AS client, \
             MAX(e.welcome_call_date) AS welcome_call_date, \
             SUM(COALESCE(s.settlement, 0)) AS total_settlement_amounts_accepted, \
             SUM(COALESCE(s.debt_amount, 0)) AS original_debt_amount_settled, \
             MAX(e.enrolled_debt) AS enrolled_debt, \
             MAX(s.settlement_date) AS latest_settlement_date \
             FROM settlement_details AS s \
             LEFT JOIN (SELECT llg_id, MAX(welcome_call_date) AS welcome_call_date, \
             SUM(COALESCE(debt_amount, 0)) AS enrolled_debt FROM enrollments GROUP BY llg_id) AS e \
             ON s.llg_id = e.llg_id",
        );

        let f = &self.filters;
        Predicates::new(sql)
            .not_null("s.llg_id")
            .within("s.settlement_date", &self.range)
            .contains("CAST(s.llg_id AS text)", f.llg_id.as_deref())
            .contains("s.client", f.client.as_deref());

        sql.push(" GROUP BY s.llg_id");
    }

    fn order_by(&self) -> &'static str {
        COMPLETION_ORDER
    }

    fn finish(&self, row: &mut ProgramCompletionRow) {
        row.settlement_rate = settlement_rate(row.total_settlement_amounts_accepted, row.original_debt_amount_settled);
        row.program_completion = program_completion(row.original_debt_amount_settled, row.enrolled_debt);
    }
}
