use crate::DbError;
use crate::query::{ReportQuery, Sql, render};
use crate::reports::marketing::{self, CostField, MarketingQuery, MarketingRow};
use crate::reports::team_ranks::{
    self, AgentCount, AgentEnrollments, ManagerRow, RosterRow, TeamRanksInput, TeamRanksQuery,
};
use crate::reports::{FilterOptions, OptionColumn, OptionSource};
use configuration::ReportSettings;
use core_types::{Page, PageRequest, TerminalEvent};
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;

/// The `DbRepository` runs report queries against the reporting database.
/// It owns no SQL of its own beyond the generic paging, options and update
/// plumbing; each report's text comes from its `ReportQuery`.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

/// Wraps a report's base query as `SELECT COUNT(*) FROM (<base>) AS report`.
pub fn count_sql<Q: ReportQuery>(query: &Q) -> Sql {
    let mut sql = Sql::new("SELECT COUNT(*) FROM (");
    query.push_base(&mut sql);
    sql.push(") AS report");
    sql
}

/// The ordered base query restricted to one page.
pub fn page_sql<Q: ReportQuery>(query: &Q, page: PageRequest) -> Sql {
    let mut sql = render(query);
    sql.push(" LIMIT ")
        .push_bind(page.per_page)
        .push(" OFFSET ")
        .push_bind(page.offset());
    sql
}

/// Distinct, non-empty values of one column, sorted and capped at `$1`.
pub fn distinct_sql(source: &OptionSource, column: &OptionColumn, limit: i64) -> Sql {
    let value = format!("CAST({} AS text)", column.column);
    let mut sql = Sql::new("SELECT DISTINCT ");
    sql.push(&value)
        .push(" AS value FROM ")
        .push(source.table)
        .push(" WHERE ")
        .push(column.column)
        .push(" IS NOT NULL AND ")
        .push(&value)
        .push(" <> ''");
    if let Some(scope) = source.scope {
        sql.push(" AND ").push(scope);
    }
    sql.push(" ORDER BY value LIMIT ").push_bind(limit);
    sql
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One page of a report plus the total row count.
    pub async fn paginate<Q: ReportQuery>(&self, query: &Q, page: PageRequest) -> Result<Page<Q::Row>, DbError> {
        let total: i64 = count_sql(query)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut rows = page_sql(query, page)
            .build_query_as::<Q::Row>()
            .fetch_all(&self.pool)
            .await?;
        rows.iter_mut().for_each(|row| query.finish(row));

        tracing::debug!(total, page = page.page, rows = rows.len(), "Fetched report page");
        Ok(Page::new(rows, total, page))
    }

    /// Every row of a report, for exports.
    pub async fn all<Q: ReportQuery>(&self, query: &Q) -> Result<Vec<Q::Row>, DbError> {
        let mut rows = render(query)
            .build_query_as::<Q::Row>()
            .fetch_all(&self.pool)
            .await?;
        rows.iter_mut().for_each(|row| query.finish(row));
        Ok(rows)
    }

    pub async fn distinct_values(
        &self,
        source: &OptionSource,
        column: &OptionColumn,
        limit: i64,
    ) -> Result<Vec<String>, DbError> {
        let values = distinct_sql(source, column, limit)
            .build_query_scalar::<String>()
            .fetch_all(&self.pool)
            .await?;
        Ok(values)
    }

    /// Dropdown values for every column of `source`.
    pub async fn options(&self, source: &OptionSource, limits: &ReportSettings) -> Result<FilterOptions, DbError> {
        let mut options = FilterOptions::new();
        for column in source.columns {
            let limit = if column.wide {
                limits.client_options_limit
            } else {
                limits.options_limit
            };
            options.insert(column.key, self.distinct_values(source, column, limit).await?);
        }
        Ok(options)
    }

    /// Overwrites one stored cost total and returns the refreshed record.
    /// Concurrent updates are last-write-wins.
    pub async fn update_drop_cost(&self, field: CostField, pk: i64, cost: Decimal) -> Result<MarketingRow, DbError> {
        let result = marketing::update_cost(field, pk, cost)
            .build()
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        tracing::info!(pk, column = field.column(), %cost, "Marketing drop cost updated");
        self.all(&MarketingQuery::single(pk))
            .await?
            .into_iter()
            .next()
            .ok_or(DbError::NotFound)
    }

    /// Runs the team-ranks aggregates one after another.
    pub async fn team_ranks_input(&self, query: &TeamRanksQuery) -> Result<TeamRanksInput, DbError> {
        let managers = query
            .managers_sql()
            .build_query_as::<ManagerRow>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .filter_map(|row| row.manager_name.map(|name| (row.manager_id, name)))
            .collect();

        let roster = query
            .roster_sql()
            .build_query_as::<RosterRow>()
            .fetch_all(&self.pool)
            .await?;

        let contacts = query
            .contacts_sql()
            .build_query_as::<AgentCount>()
            .fetch_all(&self.pool)
            .await?;

        let enrollments = query
            .enrollments_sql()
            .build_query_as::<AgentEnrollments>()
            .fetch_all(&self.pool)
            .await?;

        let cancels = query
            .terminal_sql(TerminalEvent::Cancel)
            .build_query_as::<AgentCount>()
            .fetch_all(&self.pool)
            .await?;

        let nsfs = query
            .terminal_sql(TerminalEvent::Nsf)
            .build_query_as::<AgentCount>()
            .fetch_all(&self.pool)
            .await?;

        Ok(TeamRanksInput {
            managers,
            roster,
            contacts: team_ranks::by_agent(contacts),
            enrollments: team_ranks::enrollments_by_agent(enrollments),
            cancels: team_ranks::by_agent(cancels),
            nsfs: team_ranks::by_agent(nsfs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{enrollment::EnrollmentQuery, terminal};

    #[test]
    fn count_wraps_the_unordered_base() {
        let sql = count_sql(&EnrollmentQuery::default());
        assert!(sql.sql().starts_with("SELECT COUNT(*) FROM (SELECT pk, drop_name"));
        assert!(sql.sql().ends_with("FROM enrollments) AS report"));
        assert!(!sql.sql().contains("ORDER BY"));
    }

    #[test]
    fn page_binds_limit_and_offset_last() {
        let sql = page_sql(&MarketingQuery::default(), PageRequest::new(Some(3), 25));
        assert!(sql.sql().ends_with("ORDER BY send_date ASC, drop_name ASC LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn distinct_values_skip_blanks_and_respect_scope() {
        let source = terminal::options(TerminalEvent::Cancel);
        let sql = distinct_sql(&source, &source.columns[0], 500);
        assert_eq!(
            sql.sql(),
            "SELECT DISTINCT CAST(state AS text) AS value FROM enrollments \
             WHERE state IS NOT NULL AND CAST(state AS text) <> '' \
             AND cancel_date IS NOT NULL ORDER BY value LIMIT $1"
        );
    }
}
