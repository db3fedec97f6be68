use analytics::waterfall::{self, Waterfall, WaterfallInputs};
use chrono::NaiveDate;
use core_types::DateRange;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use crate::query::{Predicates, ReportQuery, Sql};

/// Tranche sales bounded on payment date, joined with the enrollment and EPF
/// aggregates the waterfall needs.
#[derive(Debug, Clone, Default)]
pub struct TrancheQuery {
    pub range: DateRange,
    /// Payees whose cleared EPF payments count as recovery.
    pub epf_payee_ids: Vec<i64>,
}

impl TrancheQuery {
    pub fn new(range: DateRange, epf_payee_ids: Vec<i64>) -> Self {
        Self { range, epf_payee_ids }
    }

    /// Limits an aggregate to tranches with a sale inside the window.
    fn scope_to_window(&self, p: &mut Predicates<'_>, column: &str) {
        if self.range.is_unbounded() {
            return;
        }
        p.in_subquery(column, |sql| {
            sql.push("SELECT DISTINCT tranche FROM debt_tranche_sales");
            Predicates::new(sql).within("payment_date", &self.range);
        });
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrancheRow {
    pub tranche: i64,
    pub payment_date: Option<NaiveDate>,
    pub report_date: Option<NaiveDate>,
    pub total_debt: Option<Decimal>,
    pub payment: Option<Decimal>,
    pub flip_date: Option<NaiveDate>,
    pub count_ldr: Option<i64>,
    pub count_plaw: Option<i64>,
    pub count_progress: Option<i64>,
    pub count_total: Option<i64>,
    pub sold_debt_lookback: Option<Decimal>,
    pub epf_all: Option<Decimal>,
    pub epf_pending: Option<Decimal>,
    pub epf_amount: Option<Decimal>,
    pub epfd_amount: Option<Decimal>,
    #[sqlx(skip)]
    #[serde(flatten)]
    pub waterfall: Waterfall,
}

impl TrancheRow {
    pub fn waterfall_inputs(&self) -> WaterfallInputs {
        WaterfallInputs {
            payment: self.payment.unwrap_or_default(),
            sold_debt_lookback: self.sold_debt_lookback.unwrap_or_default(),
            epf_amount: self.epf_amount.unwrap_or_default(),
            epf_distribution_amount: self.epfd_amount.unwrap_or_default(),
        }
    }
}

impl ReportQuery for TrancheQuery {
    type Row = TrancheRow;

    fn push_base(&self, sql: &mut Sql) {
        sql.push(
            "SELECT ts.tranche, ts.payment_date, ts.report_date, ts.total_debt, ts.payment, ts.flip_date, \
             e.count_ldr, e.count_plaw, e.count_progress, e.count_total, e.sold_debt_lookback, \
             e.epf_all, e.epf_pending, p.epf_amount, d.epfd_amount \
             FROM debt_tranche_sales AS ts",
        );

        sql.push(
            " LEFT JOIN (SELECT tranche, COUNT(*) AS count_total, \
             SUM(CASE WHEN enrollment_plan NOT LIKE 'PLAW%' AND UPPER(enrollment_plan) NOT LIKE '%PROGRESS%' THEN 1 ELSE 0 END) AS count_ldr, \
             SUM(CASE WHEN enrollment_plan LIKE 'PLAW%' THEN 1 ELSE 0 END) AS count_plaw, \
             SUM(CASE WHEN UPPER(enrollment_plan) LIKE '%PROGRESS%' THEN 1 ELSE 0 END) AS count_progress, \
             SUM(CASE WHEN lookback_date IS NOT NULL THEN sold_debt ELSE 0 END) AS sold_debt_lookback, \
             SUM(sold_debt * epf_rate) AS epf_all, \
             SUM(CASE WHEN lookback_date IS NULL AND cancel_date IS NULL THEN sold_debt * epf_rate ELSE 0 END) AS epf_pending \
             FROM enrollments",
        );
        self.scope_to_window(&mut Predicates::new(sql), "tranche");
        sql.push(" GROUP BY tranche) AS e ON e.tranche = ts.tranche");

        sql.push(
            " LEFT JOIN (SELECT en.tranche, SUM(ep.amount) AS epf_amount \
             FROM epfs AS ep JOIN enrollments AS en ON ep.llg_id = en.llg_id",
        );
        {
            let mut p = Predicates::new(sql);
            p.not_null("ep.cleared_date")
                .any_of("ep.paid_to", self.epf_payee_ids.clone());
            self.scope_to_window(&mut p, "en.tranche");
        }
        sql.push(" GROUP BY en.tranche) AS p ON p.tranche = ts.tranche");

        sql.push(" LEFT JOIN (SELECT tranche, SUM(amount) AS epfd_amount FROM epf_distributions");
        self.scope_to_window(&mut Predicates::new(sql), "tranche");
        sql.push(" GROUP BY tranche) AS d ON d.tranche = ts.tranche");

        Predicates::new(sql).within("ts.payment_date", &self.range);
    }

    fn order_by(&self) -> &'static str {
        "ts.tranche ASC"
    }

    fn finish(&self, row: &mut TrancheRow) {
        row.waterfall = waterfall::compute(row.waterfall_inputs());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::render;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn unbounded_summary_has_no_tranche_scope() {
        let sql = render(&TrancheQuery::new(DateRange::default(), vec![31213, 35285]));
        assert!(!sql.sql().contains("SELECT DISTINCT tranche"));
        assert!(sql.sql().contains("WHERE ep.cleared_date IS NOT NULL AND ep.paid_to = ANY($1)"));
        assert!(sql.sql().ends_with("AS d ON d.tranche = ts.tranche ORDER BY ts.tranche ASC"));
    }

    #[test]
    fn bounded_summary_scopes_every_aggregate() {
        let range = DateRange::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 31)), Some("custom".into()));
        let sql = render(&TrancheQuery::new(range, vec![31213]));
        let text = sql.sql();
        assert_eq!(text.matches("SELECT DISTINCT tranche FROM debt_tranche_sales").count(), 3);
        assert!(text.contains(
            "FROM enrollments WHERE tranche IN (SELECT DISTINCT tranche FROM debt_tranche_sales \
             WHERE CAST(payment_date AS date) >= $1 AND CAST(payment_date AS date) <= $2) GROUP BY tranche"
        ));
        assert!(text.contains("AND en.tranche IN ("));
        assert!(text.contains("WHERE CAST(ts.payment_date AS date) >= $8 AND CAST(ts.payment_date AS date) <= $9"));
    }

    #[test]
    fn missing_aggregates_feed_zero_into_the_waterfall() {
        let row = TrancheRow {
            tranche: 3,
            payment_date: None,
            report_date: None,
            total_debt: None,
            payment: None,
            flip_date: None,
            count_ldr: None,
            count_plaw: None,
            count_progress: None,
            count_total: None,
            sold_debt_lookback: None,
            epf_all: None,
            epf_pending: None,
            epf_amount: None,
            epfd_amount: None,
            waterfall: Waterfall::default(),
        };
        assert_eq!(row.waterfall_inputs(), WaterfallInputs::default());
        assert_eq!(waterfall::compute(row.waterfall_inputs()).u, Decimal::ZERO);
    }
}
