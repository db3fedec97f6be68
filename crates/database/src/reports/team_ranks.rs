//! Raw aggregates behind the team/agent performance ranking.
//!
//! Nothing here ranks anything. The queries return per-agent counts that the
//! analyzer joins onto the active-agent roster before scoring.

use std::collections::HashMap;

use core_types::{DateRange, TerminalEvent};
use rust_decimal::Decimal;
use sqlx::FromRow;

use super::{OptionColumn, OptionSource};
use crate::query::{Predicates, Sql};

pub const OPTIONS: OptionSource = OptionSource {
    table: "contacts",
    scope: None,
    columns: &[OptionColumn::new("data_sources", "data_source")],
};

/// Contact statuses that never count toward an agent's pipeline.
const INELIGIBLE_STATUSES: &str =
    "('Funded', 'Freedom Plus Client', 'Lexington Law Client', 'Plush Funding', 'No Credit Ran')";

#[derive(Debug, Clone, Default)]
pub struct TeamRanksQuery {
    /// Bounds `COALESCE(assigned_date, created_date)` of the contact.
    pub range: DateRange,
    /// Exact data source, already stripped of the "all" sentinel.
    pub data_source: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ManagerRow {
    pub manager_id: i64,
    pub manager_name: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RosterRow {
    pub manager_id: Option<i64>,
    pub agent_name: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct AgentCount {
    pub agent: Option<String>,
    pub total: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct AgentEnrollments {
    pub agent: Option<String>,
    pub wcc: i64,
    pub enrolled_debt: Option<Decimal>,
}

/// Everything the ranking needs, keyed by agent name.
#[derive(Debug, Clone, Default)]
pub struct TeamRanksInput {
    /// Manager id to manager name, for current assignments only.
    pub managers: HashMap<i64, String>,
    /// Active agents in manager, name order.
    pub roster: Vec<RosterRow>,
    pub contacts: HashMap<String, i64>,
    pub enrollments: HashMap<String, (i64, Decimal)>,
    pub cancels: HashMap<String, i64>,
    pub nsfs: HashMap<String, i64>,
}

/// Drops rows without an agent and keys the rest by name.
pub fn by_agent(rows: Vec<AgentCount>) -> HashMap<String, i64> {
    rows.into_iter()
        .filter_map(|row| row.agent.map(|agent| (agent, row.total)))
        .collect()
}

pub fn enrollments_by_agent(rows: Vec<AgentEnrollments>) -> HashMap<String, (i64, Decimal)> {
    rows.into_iter()
        .filter_map(|row| {
            let debt = row.enrolled_debt.unwrap_or_default();
            row.agent.map(|agent| (agent, (row.wcc, debt)))
        })
        .collect()
}

impl TeamRanksQuery {
    pub fn managers_sql(&self) -> Sql {
        Sql::new(
            "SELECT DISTINCT e.pk AS manager_id, e.employee_name AS manager_name \
             FROM employees AS e JOIN employee_sales_managers AS s ON e.pk = s.sales_manager_id \
             WHERE s.end_date IS NULL",
        )
    }

    pub fn roster_sql(&self) -> Sql {
        Sql::new(
            "SELECT s.sales_manager_id AS manager_id, e.employee_name AS agent_name \
             FROM employees AS e LEFT JOIN employee_sales_managers AS s ON e.pk = s.agent_id \
             WHERE e.term_date IS NULL AND s.end_date IS NULL AND e.access_level = 'Agent' \
             AND e.employee_name <> 'Debt PayPro' AND e.employee_name NOT LIKE '% User' \
             ORDER BY s.sales_manager_id, e.employee_name",
        )
    }

    /// Contact conditions shared by every aggregate; `c` is the contacts alias.
    fn eligible(&self, p: &mut Predicates<'_>, c: &str) {
        let column = |name: &str| format!("{c}{name}");
        let activity = format!("COALESCE({c}assigned_date, {c}created_date)");
        p.within(&activity, &self.range)
            .raw(&format!("{} NOT IN {INELIGIBLE_STATUSES}", column("status")))
            .raw(&format!("{} <> 'Rejected (Not Qualified DS)'", column("status")))
            .raw(&format!("{} NOT LIKE 'EC Loan Leads%'", column("data_source")));
    }

    pub fn contacts_sql(&self) -> Sql {
        let mut sql = Sql::new("SELECT agent, COUNT(*) AS total FROM contacts");
        {
            let mut p = Predicates::new(&mut sql);
            self.eligible(&mut p, "");
            p.equals_text("data_source", self.data_source.as_deref());
        }
        sql.push(" GROUP BY agent");
        sql
    }

    /// Welcome-call completions and enrolled debt. Data source is a prefix match here.
    pub fn enrollments_sql(&self) -> Sql {
        let mut sql = Sql::new(
            "SELECT c.agent, COUNT(*) AS wcc, SUM(e.debt_amount) AS enrolled_debt \
             FROM enrollments AS e JOIN contacts AS c ON e.llg_id = c.llg_id",
        );
        {
            let mut p = Predicates::new(&mut sql);
            self.eligible(&mut p, "c.");
            p.starts_with("c.data_source", self.data_source.as_deref());
        }
        sql.push(" GROUP BY c.agent");
        sql
    }

    pub fn terminal_sql(&self, event: TerminalEvent) -> Sql {
        let mut sql = Sql::new(
            "SELECT c.agent, COUNT(*) AS total \
             FROM enrollments AS e JOIN contacts AS c ON e.llg_id = c.llg_id",
        );
        {
            let mut p = Predicates::new(&mut sql);
            self.eligible(&mut p, "c.");
            p.equals_text("c.data_source", self.data_source.as_deref())
                .not_null(match event {
                    TerminalEvent::Cancel => "e.cancel_date",
                    TerminalEvent::Nsf => "e.nsf_date",
                });
        }
        sql.push(" GROUP BY c.agent");
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn contacts_match_the_data_source_exactly() {
        let query = TeamRanksQuery {
            range: DateRange::new(NaiveDate::from_ymd_opt(2024, 1, 1), None, None),
            data_source: Some("Mailers".into()),
        };
        let sql = query.contacts_sql();
        assert_eq!(
            sql.sql(),
            "SELECT agent, COUNT(*) AS total FROM contacts \
             WHERE CAST(COALESCE(assigned_date, created_date) AS date) >= $1 \
             AND status NOT IN ('Funded', 'Freedom Plus Client', 'Lexington Law Client', 'Plush Funding', 'No Credit Ran') \
             AND status <> 'Rejected (Not Qualified DS)' AND data_source NOT LIKE 'EC Loan Leads%' \
             AND data_source = $2 GROUP BY agent"
        );
    }

    #[test]
    fn enrollments_use_a_prefix_match() {
        let query = TeamRanksQuery { data_source: Some("Mailers".into()), ..TeamRanksQuery::default() };
        assert!(query.enrollments_sql().sql().contains("AND c.data_source ILIKE $1 GROUP BY c.agent"));
        assert!(query
            .terminal_sql(TerminalEvent::Nsf)
            .sql()
            .ends_with("AND c.data_source = $1 AND e.nsf_date IS NOT NULL GROUP BY c.agent"));
    }

    #[test]
    fn rows_without_an_agent_are_dropped() {
        let counts = by_agent(vec![
            AgentCount { agent: Some("Ana".into()), total: 4 },
            AgentCount { agent: None, total: 9 },
        ]);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["Ana"], 4);

        let enrolled = enrollments_by_agent(vec![AgentEnrollments {
            agent: Some("Ana".into()),
            wcc: 2,
            enrolled_debt: None,
        }]);
        assert_eq!(enrolled["Ana"], (2, Decimal::ZERO));
    }
}
