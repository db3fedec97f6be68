use analytics::DropCosts;
use chrono::NaiveDate;
use core_types::{DateRange, MarketingFilters};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use super::{OptionColumn, OptionSource};
use crate::query::{Predicates, ReportQuery, Sql};

pub const OPTIONS: OptionSource = OptionSource {
    table: "marketing_drops",
    scope: None,
    columns: &[
        OptionColumn::new("vendors", "vendor"),
        OptionColumn::new("drop_types", "drop_type"),
        OptionColumn::new("data_types", "data_type"),
        OptionColumn::new("mail_styles", "mail_style"),
        OptionColumn::new("debt_tiers", "debt_tier"),
        OptionColumn::new("languages", "language"),
    ],
};

/// Which stored cost total an update touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostField {
    Mail,
    Data,
}

impl CostField {
    pub fn column(self) -> &'static str {
        match self {
            CostField::Mail => "mail_drop_cost",
            CostField::Data => "data_drop_cost",
        }
    }
}

/// Marketing drops bounded on send date. Every filter is a substring match.
#[derive(Debug, Clone, Default)]
pub struct MarketingQuery {
    pub range: DateRange,
    pub filters: MarketingFilters,
    /// Restricts the result to one record, used to re-read after a cost update.
    pub pk: Option<i64>,
}

impl MarketingQuery {
    pub fn single(pk: i64) -> Self {
        Self { pk: Some(pk), ..Self::default() }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MarketingRow {
    pub pk: i64,
    pub drop_name: Option<String>,
    pub debt_tier: Option<String>,
    pub drop_type: Option<String>,
    pub vendor: Option<String>,
    pub data_type: Option<String>,
    pub mail_style: Option<String>,
    pub send_date: Option<NaiveDate>,
    pub amount_dropped: Option<i64>,
    pub mail_invoice_number: Option<String>,
    pub mail_drop_cost: Decimal,
    pub data_invoice_number: Option<String>,
    pub data_drop_cost: Decimal,
    pub calls: Option<i64>,
    pub language: Option<String>,
    pub drop_name_sequential: Option<String>,
    #[sqlx(skip)]
    #[serde(flatten)]
    pub costs: DropCosts,
}

impl ReportQuery for MarketingQuery {
    type Row = MarketingRow;

    fn push_base(&self, sql: &mut Sql) {
        sql.push(
            "SELECT pk, drop_name, debt_tier, drop_type, vendor, data_type, mail_style, send_date, \
             amount_dropped, mail_invoice_number, COALESCE(mail_drop_cost, 0) AS mail_drop_cost, \
             data_invoice_number, COALESCE(data_drop_cost, 0) AS data_drop_cost, calls, language, \
             drop_name_sequential FROM marketing_drops",
        );

        let f = &self.filters;
        Predicates::new(sql)
            .equals("pk", self.pk)
            .within("send_date", &self.range)
            .contains("drop_name", f.drop_name.as_deref())
            .contains("debt_tier", f.debt_tier.as_deref())
            .contains("drop_type", f.drop_type.as_deref())
            .contains("vendor", f.vendor.as_deref())
            .contains("data_type", f.data_type.as_deref())
            .contains("mail_style", f.mail_style.as_deref())
            .contains("language", f.language.as_deref());
    }

    fn order_by(&self) -> &'static str {
        "send_date ASC, drop_name ASC"
    }

    fn finish(&self, row: &mut MarketingRow) {
        row.costs = DropCosts::derive(Some(row.mail_drop_cost), Some(row.data_drop_cost), row.amount_dropped);
    }
}

/// `UPDATE marketing_drops SET <column> = $1 WHERE pk = $2`.
pub fn update_cost(field: CostField, pk: i64, cost: Decimal) -> Sql {
    let mut sql = Sql::new("UPDATE marketing_drops SET ");
    sql.push(field.column())
        .push(" = ")
        .push_bind(cost)
        .push(" WHERE pk = ")
        .push_bind(pk);
    sql
}
