use chrono::NaiveDate;
use core_types::{ContactFilters, DateRange};
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
        OptionColumn::new("clients", "client"),
        OptionColumn::new("data_sources", "data_source"),
        OptionColumn::new("stages", "stage"),
        OptionColumn::new("statuses", "status"),
        OptionColumn::new("states", "state"),
    ],
};

/// Raw contact records. Two independent windows: assignment and creation.
#[derive(Debug, Clone, Default)]
pub struct ContactQuery {
    pub assigned: DateRange,
    pub created: DateRange,
    pub filters: ContactFilters,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContactRow {
    pub created_date: Option<NaiveDate>,
    pub assigned_date: Option<NaiveDate>,
    pub llg_id: i64,
    pub external_id: Option<String>,
    pub campaign: Option<String>,
    pub data_source: Option<String>,
    pub agent: Option<String>,
    pub client: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub stage: Option<String>,
    pub status: Option<String>,
    pub debt_enrolled: Option<Decimal>,
    pub address_1: Option<String>,
    pub address_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub credit_score: Option<i32>,
}

impl ContactRow {
    /// Street lines joined for display and export.
    pub fn address(&self) -> String {
        [self.address_1.as_deref(), self.address_2.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ReportQuery for ContactQuery {
    type Row = ContactRow;

    fn push_base(&self, sql: &mut Sql) {
        sql.push(
            "SELECT created_date, assigned_date, llg_id, external_id, campaign, data_source, \
             agent, client, phone, email, stage, status, debt_enrolled, address_1, address_2, \
             city, state, zip, credit_score FROM contacts",
        );

        let f = &self.filters;
        Predicates::new(sql)
            .within("assigned_date", &self.assigned)
            .within("created_date", &self.created)
            .contains("agent", f.agent.as_deref())
            .contains("client", f.client.as_deref())
            .contains("data_source", f.data_source.as_deref())
            .equals_text("stage", f.stage.as_deref())
            .equals_text("status", f.status.as_deref())
            .equals_text("state", f.state.as_deref())
            .at_least("debt_enrolled", f.debt_min)
            .at_most("debt_enrolled", f.debt_max)
            .at_least("credit_score", f.score_min)
            .at_most("credit_score", f.score_max);
    }

    fn order_by(&self) -> &'static str {
        "created_date DESC"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::render;
    use rust_decimal_macros::dec;

    #[test]
    fn windows_and_ranges_bind_in_order() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let query = ContactQuery {
            assigned: DateRange::new(Some(day), Some(day), None),
            created: DateRange::default(),
            filters: ContactFilters {
                stage: Some("Qualified".into()),
                debt_min: Some(dec!(10000)),
                score_max: Some(700),
                ..ContactFilters::default()
            },
        };
        let sql = render(&query);
        assert!(sql.sql().ends_with(
            "FROM contacts WHERE CAST(assigned_date AS date) >= $1 \
             AND CAST(assigned_date AS date) <= $2 AND stage = $3 \
             AND debt_enrolled >= $4 AND credit_score <= $5 ORDER BY created_date DESC"
        ));
    }

    #[test]
    fn address_skips_blank_lines() {
        let row = ContactRow {
            created_date: None,
            assigned_date: None,
            llg_id: 1,
            external_id: None,
            campaign: None,
            data_source: None,
            agent: None,
            client: None,
            phone: None,
            email: None,
            stage: None,
            status: None,
            debt_enrolled: None,
            address_1: Some("12 Main St".into()),
            address_2: Some(" ".into()),
            city: None,
            state: None,
            zip: None,
            credit_score: None,
        };
        assert_eq!(row.address(), "12 Main St");
    }
}
