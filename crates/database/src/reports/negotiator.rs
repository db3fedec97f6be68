//! Per-assignment negotiator worklist.
//!
//! The enrollment side is filtered once inside a CTE (`en`) and every joined
//! aggregate is restricted to the accounts that CTE kept. Balance snapshots are
//! taken at the end of the month two months back and at the end of last month,
//! both relative to the query's `today`.

use analytics::negotiator::{balance_snapshot_dates, debt_balance_ratio, AccountActivity, SEND_POA};
use chrono::NaiveDate;
use core_types::{
    classify_positive_only, DateField, DateRange, DebtTier, EnrollmentStatusFilter, NegotiatorFilters,
    NegotiatorReportType, ReadyFlag,
};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use super::{OptionColumn, OptionSource};
use crate::query::{date_field_column, Predicates, ReportQuery, Sql};

pub const ENROLLMENT_OPTIONS: OptionSource = OptionSource {
    table: "enrollments",
    scope: None,
    columns: &[
        OptionColumn::new("negotiators", "negotiator"),
        OptionColumn::new("ngos", "drop_name"),
        OptionColumn::new("enrollment_statuses", "enrollment_status"),
    ],
};

pub const ASSIGNMENT_OPTIONS: OptionSource = OptionSource {
    table: "negotiator_assignments",
    scope: None,
    columns: &[
        OptionColumn::new("assignment_statuses", "status"),
        OptionColumn::new("creditors", "creditor"),
        OptionColumn::new("collection_companies", "collection_company"),
    ],
};

#[derive(Debug, Clone)]
pub struct NegotiatorQuery {
    pub range: DateRange,
    pub date_field: DateField,
    pub filters: NegotiatorFilters,
    /// Reference day for balance snapshots and days-since-activity.
    pub today: NaiveDate,
}

impl NegotiatorQuery {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            range: DateRange::default(),
            date_field: DateField::Payment,
            filters: NegotiatorFilters::default(),
            today,
        }
    }

    fn push_enrollments(&self, sql: &mut Sql) {
        sql.push(
            "WITH en AS (SELECT llg_id, client, enrollment_status, negotiator, category, drop_name, agent, \
             payments, debt_amount, negotiator_assigned_date, first_payment_date, welcome_call_date, \
             submitted_date, cancel_date, nsf_date, 'LLG-' || llg_id AS cid, ",
        )
        .push(date_field_column(DateField::Payment))
        .push(" AS payment_date FROM enrollments");

        let f = &self.filters;
        let mut p = Predicates::new(sql);
        p.within(date_field_column(self.date_field), &self.range)
            .equals_text("negotiator", f.negotiator.as_deref())
            .equals_text("drop_name", f.ngo());

        match &f.enrollment_status {
            Some(EnrollmentStatusFilter::Active) => {
                p.is_null("cancel_date").is_null("nsf_date");
            }
            Some(EnrollmentStatusFilter::Cancels) => {
                p.not_null("cancel_date");
            }
            Some(EnrollmentStatusFilter::Nsfs) => {
                p.not_null("nsf_date");
            }
            Some(EnrollmentStatusFilter::NotClosed) => {
                p.is_null("cancel_date");
            }
            Some(EnrollmentStatusFilter::Exact(status)) => {
                p.equals_text("enrollment_status", Some(status.as_str()));
            }
            None => {}
        }

        sql.push(")");
    }

    fn push_snapshot(sql: &mut Sql, date: NaiveDate, alias: &str) {
        sql.push(" LEFT JOIN (SELECT llg_id, balance FROM balances_history WHERE CAST(balance_date AS date) = ")
            .push_bind(date)
            .push(" AND llg_id IN (SELECT DISTINCT llg_id FROM en)) AS ")
            .push(alias)
            .push(" ON ")
            .push(alias)
            .push(".llg_id = en.llg_id");
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NegotiatorRow {
    pub cid: String,
    pub enrollment_status: Option<String>,
    pub debt_id: Option<i64>,
    /// Current balance.
    pub balance: Option<Decimal>,
    pub payments: Option<Decimal>,
    pub agent: Option<String>,
    pub ngo: Option<String>,
    pub negotiator: Option<String>,
    pub negotiator_assigned_date: Option<NaiveDate>,
    pub follow_up_date: Option<NaiveDate>,
    pub account_not_ready_date: Option<NaiveDate>,
    pub account_not_ready_reason: Option<String>,
    pub last_payment_date: Option<NaiveDate>,
    pub settlement_date: Option<NaiveDate>,
    pub ready_to_settle_date: Option<NaiveDate>,
    pub welcome_call_date: Option<NaiveDate>,
    pub wcc_date: Option<NaiveDate>,
    pub submitted_date: Option<NaiveDate>,
    pub cancel_date: Option<NaiveDate>,
    pub nsf_date: Option<NaiveDate>,
    pub contact_name: Option<String>,
    pub debt_amount: Option<Decimal>,
    pub creditor: Option<String>,
    pub collection_company: Option<String>,
    pub creditor_group: Option<String>,
    pub assignment_status: Option<String>,
    pub payment_date: Option<NaiveDate>,
    pub settlements: i64,
    pub balance_two_months_ago: Option<Decimal>,
    pub balance_last_month: Option<Decimal>,
    #[sqlx(skip)]
    pub debt_tier: Option<DebtTier>,
    #[sqlx(skip)]
    pub debt_balance_ratio: Option<Decimal>,
    #[sqlx(skip)]
    pub last_activity_date: Option<NaiveDate>,
    #[sqlx(skip)]
    pub days_since_activity: Option<i64>,
    #[sqlx(skip)]
    pub send_poa: &'static str,
}

impl NegotiatorRow {
    pub fn activity(&self) -> AccountActivity {
        AccountActivity {
            last_payment_date: self.last_payment_date,
            settlement_date: self.settlement_date,
            ready_to_settle_date: self.ready_to_settle_date,
            account_not_ready_date: self.account_not_ready_date,
            follow_up_date: self.follow_up_date,
        }
    }

    /// Fills the fields computed in process.
    pub fn derive(&mut self, today: NaiveDate) {
        let activity = self.activity();
        self.debt_tier = self.debt_amount.and_then(classify_positive_only);
        self.debt_balance_ratio = debt_balance_ratio(self.debt_amount, self.balance);
        self.last_activity_date = activity.last_activity();
        self.days_since_activity = activity.days_since(today);
        self.send_poa = SEND_POA;
    }
}

impl ReportQuery for NegotiatorQuery {
    type Row = NegotiatorRow;

    fn push_base(&self, sql: &mut Sql) {
        self.push_enrollments(sql);

        sql.push(
            " SELECT en.cid, en.enrollment_status, n.debt_id, b.balance, en.payments, en.agent, \
             en.drop_name AS ngo, en.negotiator, en.negotiator_assigned_date, n.follow_up_date, \
             n.account_not_ready_date, n.account_not_ready_reason, d.last_payment_date, d.settlement_date, \
             n.ready_to_settle_date, en.welcome_call_date, en.first_payment_date AS wcc_date, \
             en.submitted_date, en.cancel_date, en.nsf_date, \
             COALESCE(c.client, en.client) AS contact_name, \
             COALESCE(c.debt_amount, en.debt_amount) AS debt_amount, \
             n.creditor, n.collection_company, cg.group_name AS creditor_group, \
             COALESCE(n.status, en.category) AS assignment_status, en.payment_date, \
             COALESCE(s.settlements, 0) AS settlements, ",
        );
        let snapshots = balance_snapshot_dates(self.today);
        if snapshots.is_some() {
            sql.push("bh1.balance AS balance_two_months_ago, bh2.balance AS balance_last_month");
        } else {
            sql.push("CAST(NULL AS numeric) AS balance_two_months_ago, CAST(NULL AS numeric) AS balance_last_month");
        }

        sql.push(
            " FROM en \
             LEFT JOIN contacts AS c ON c.llg_id = en.llg_id \
             LEFT JOIN balances AS b ON b.cid = en.cid \
             LEFT JOIN negotiator_assignments AS n ON n.cid = en.cid \
             LEFT JOIN negotiator_debts AS d ON d.debt_id = n.debt_id \
             LEFT JOIN (SELECT contact_id, COUNT(DISTINCT settlement_id) AS settlements \
             FROM negotiator_settlement_summary WHERE contact_id IN (SELECT DISTINCT llg_id FROM en) \
             GROUP BY contact_id) AS s ON s.contact_id = en.llg_id \
             LEFT JOIN creditor_groups AS cg ON UPPER(n.creditor) = UPPER(cg.creditor_name)",
        );
        if let Some((two_months_ago, last_month)) = snapshots {
            Self::push_snapshot(sql, two_months_ago, "bh1");
            Self::push_snapshot(sql, last_month, "bh2");
        }

        let f = &self.filters;
        let mut p = Predicates::new(sql);
        p.equals_text("n.status", f.assignment_status.as_deref());
        match f.ready_flag {
            Some(ReadyFlag::Ready) => {
                p.not_null("n.ready_to_settle_date");
            }
            Some(ReadyFlag::NotReady) => {
                p.is_null("n.ready_to_settle_date");
            }
            None => {}
        }
        p.contains("n.creditor", f.creditor.as_deref())
            .contains("n.collection_company", f.collection_company.as_deref())
            .at_least("COALESCE(c.debt_amount, en.debt_amount)", f.debt_min)
            .at_most("COALESCE(c.debt_amount, en.debt_amount)", f.debt_max)
            .on_or_after("n.follow_up_date", f.follow_up_from)
            .on_or_before("n.follow_up_date", f.follow_up_to)
            .on_or_after("n.ready_to_settle_date", f.ready_from)
            .on_or_before("n.ready_to_settle_date", f.ready_to)
            .on_or_after("d.settlement_date", f.settlement_from)
            .on_or_before("d.settlement_date", f.settlement_to)
            .on_or_after("d.last_payment_date", f.last_payment_from)
            .on_or_before("d.last_payment_date", f.last_payment_to);
        match f.report_type {
            Some(NegotiatorReportType::Ready) => {
                p.not_null("n.ready_to_settle_date").is_null("d.settlement_date");
            }
            Some(NegotiatorReportType::NotReady) => {
                p.is_null("n.ready_to_settle_date").is_null("d.settlement_date");
            }
            Some(NegotiatorReportType::Settled) => {
                p.not_null("d.settlement_date");
            }
            None => {}
        }
    }

    fn order_by(&self) -> &'static str {
        "en.negotiator, COALESCE(c.client, en.client)"
    }

    fn finish(&self, row: &mut NegotiatorRow) {
        row.derive(self.today);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::render;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn enrollment_filters_live_inside_the_cte() {
        let mut query = NegotiatorQuery::new(date(2024, 3, 15));
        query.filters.negotiator = Some("Dana".into());
        query.filters.ngo = Some("all".into());
        query.filters.enrollment_status = Some(EnrollmentStatusFilter::Active);

        let sql = render(&query);
        assert!(sql.sql().starts_with("WITH en AS (SELECT llg_id"));
        assert!(sql.sql().contains(
            "FROM enrollments WHERE negotiator = $1 AND cancel_date IS NULL AND nsf_date IS NULL) SELECT en.cid"
        ));
    }

    #[test]
    fn snapshots_bind_month_end_dates() {
        let query = NegotiatorQuery::new(date(2024, 3, 15));
        let sql = render(&query);
        assert!(sql.sql().contains("WHERE CAST(balance_date AS date) = $1"));
        assert!(sql.sql().contains("WHERE CAST(balance_date AS date) = $2"));
        assert!(sql.sql().ends_with("ORDER BY en.negotiator, COALESCE(c.client, en.client)"));
    }

    #[test]
    fn report_type_and_date_pairs_filter_the_joined_rows() {
        let mut query = NegotiatorQuery::new(date(2024, 3, 15));
        query.date_field = DateField::Submitted;
        query.range = DateRange::new(Some(date(2024, 1, 1)), None, None);
        query.filters.report_type = Some(NegotiatorReportType::Ready);
        query.filters.settlement_to = Some(date(2024, 2, 1));

        let sql = render(&query);
        assert!(sql.sql().contains("FROM enrollments WHERE CAST(submitted_date AS date) >= $1)"));
        assert!(sql.sql().contains(
            "AS bh2 ON bh2.llg_id = en.llg_id WHERE CAST(d.settlement_date AS date) <= $4 \
             AND n.ready_to_settle_date IS NOT NULL AND d.settlement_date IS NULL ORDER BY"
        ));
    }

    fn with_status(status: EnrollmentStatusFilter) -> String {
        let mut query = NegotiatorQuery::new(date(2024, 3, 15));
        query.filters.enrollment_status = Some(status);
        render(&query).sql().to_string()
    }

    fn with_report_type(report_type: NegotiatorReportType) -> String {
        let mut query = NegotiatorQuery::new(date(2024, 3, 15));
        query.filters.report_type = Some(report_type);
        render(&query).sql().to_string()
    }

    #[test]
    fn status_buckets_map_to_terminal_dates() {
        let not_closed = with_status(EnrollmentStatusFilter::NotClosed);
        assert!(not_closed.contains("FROM enrollments WHERE cancel_date IS NULL) SELECT en.cid"));
        assert!(!not_closed.contains("nsf_date IS"));

        let cancels = with_status(EnrollmentStatusFilter::Cancels);
        assert!(cancels.contains("FROM enrollments WHERE cancel_date IS NOT NULL) SELECT en.cid"));

        let nsfs = with_status(EnrollmentStatusFilter::Nsfs);
        assert!(nsfs.contains("FROM enrollments WHERE nsf_date IS NOT NULL) SELECT en.cid"));
    }

    #[test]
    fn not_ready_and_settled_report_types_are_disjoint() {
        let not_ready = with_report_type(NegotiatorReportType::NotReady);
        assert!(not_ready.contains(
            "AS bh2 ON bh2.llg_id = en.llg_id WHERE n.ready_to_settle_date IS NULL \
             AND d.settlement_date IS NULL ORDER BY"
        ));

        let settled = with_report_type(NegotiatorReportType::Settled);
        assert!(settled.contains("AS bh2 ON bh2.llg_id = en.llg_id WHERE d.settlement_date IS NOT NULL ORDER BY"));
        assert!(!settled.contains("ready_to_settle_date IS"));
    }

    #[test]
    fn derived_fields_use_the_positive_only_tier() {
        let mut row = NegotiatorRow {
            cid: "LLG-7".into(),
            enrollment_status: None,
            debt_id: None,
            balance: Some(dec!(5000)),
            payments: None,
            agent: None,
            ngo: None,
            negotiator: None,
            negotiator_assigned_date: None,
            follow_up_date: Some(date(2024, 3, 1)),
            account_not_ready_date: None,
            account_not_ready_reason: None,
            last_payment_date: Some(date(2024, 2, 20)),
            settlement_date: None,
            ready_to_settle_date: None,
            welcome_call_date: None,
            wcc_date: None,
            submitted_date: None,
            cancel_date: None,
            nsf_date: None,
            contact_name: None,
            debt_amount: Some(dec!(0)),
            creditor: None,
            collection_company: None,
            creditor_group: None,
            assignment_status: None,
            payment_date: None,
            settlements: 0,
            balance_two_months_ago: None,
            balance_last_month: None,
            debt_tier: None,
            debt_balance_ratio: None,
            last_activity_date: None,
            days_since_activity: None,
            send_poa: "",
        };
        row.derive(date(2024, 3, 15));
        assert_eq!(row.debt_tier, None);
        assert_eq!(row.debt_balance_ratio, Some(dec!(0)));
        assert_eq!(row.last_activity_date, Some(date(2024, 3, 1)));
        assert_eq!(row.days_since_activity, Some(14));
        assert_eq!(row.send_poa, "Send POA");

        row.debt_amount = Some(dec!(12000));
        row.derive(date(2024, 3, 15));
        assert_eq!(row.debt_tier, DebtTier::new(2));
        assert_eq!(row.debt_balance_ratio, Some(dec!(2.4)));
    }
}
