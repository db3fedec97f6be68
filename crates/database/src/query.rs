//! The one place report SQL is assembled.
//!
//! Each report implements [`ReportQuery`] by pushing its `SELECT ... FROM ... WHERE ...`
//! into a [`Sql`] builder. Filters go through [`Predicates`], so every user-supplied
//! value ends up as a bound parameter and absent values add nothing.

use chrono::NaiveDate;
use core_types::{DateField, DateRange};
use sqlx::postgres::PgRow;
use sqlx::{Encode, FromRow, Postgres, QueryBuilder, Type};

/// Query builder whose bound arguments are owned.
pub type Sql = QueryBuilder<'static, Postgres>;

/// Any owned value that can be bound as a Postgres parameter.
pub trait Bind: 'static + Encode<'static, Postgres> + Type<Postgres> + Send {}

impl<T> Bind for T where T: 'static + Encode<'static, Postgres> + Type<Postgres> + Send {}

/// A report's base query plus the row post-processing it needs.
pub trait ReportQuery: Send + Sync {
    type Row: for<'r> FromRow<'r, PgRow> + Send + Unpin;

    /// Pushes the full unordered query, including `WHERE` and `GROUP BY`.
    fn push_base(&self, sql: &mut Sql);

    /// The `ORDER BY` list, without the keyword.
    fn order_by(&self) -> &'static str;

    /// Fills derived fields after the row is fetched.
    fn finish(&self, _row: &mut Self::Row) {}
}

/// Renders the base query of `query` on its own, ordered. Mostly useful in tests.
pub fn render<Q: ReportQuery>(query: &Q) -> Sql {
    let mut sql = Sql::new("");
    query.push_base(&mut sql);
    sql.push(" ORDER BY ").push(query.order_by());
    sql
}

/// The enrollment column a `date_by`/`date_field` selector anchors on.
pub fn date_field_column(field: DateField) -> &'static str {
    match field {
        DateField::Submitted => "submitted_date",
        DateField::WelcomeCall => "welcome_call_date",
        DateField::Payment => "COALESCE(first_payment_cleared_date, payment_date_2, payment_date_1)",
    }
}

/// Appends `WHERE`/`AND` conditions to a query.
pub struct Predicates<'a> {
    sql: &'a mut Sql,
    started: bool,
}

impl<'a> Predicates<'a> {
    /// Starts a fresh `WHERE` clause.
    pub fn new(sql: &'a mut Sql) -> Self {
        Self { sql, started: false }
    }

    fn clause(&mut self) -> &mut Sql {
        self.sql.push(if self.started { " AND " } else { " WHERE " });
        self.started = true;
        self.sql
    }

    /// A fixed condition with no parameters.
    pub fn raw(&mut self, condition: &str) -> &mut Self {
        self.clause().push(condition);
        self
    }

    /// Case-insensitive substring match on the trimmed value.
    pub fn contains(&mut self, expr: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = non_blank(value) {
            self.clause()
                .push(expr)
                .push(" ILIKE ")
                .push_bind(format!("%{value}%"));
        }
        self
    }

    pub fn not_contains(&mut self, expr: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = non_blank(value) {
            self.clause()
                .push(expr)
                .push(" NOT ILIKE ")
                .push_bind(format!("%{value}%"));
        }
        self
    }

    /// Case-insensitive prefix match.
    pub fn starts_with(&mut self, expr: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = non_blank(value) {
            self.clause()
                .push(expr)
                .push(" ILIKE ")
                .push_bind(format!("{value}%"));
        }
        self
    }

    pub fn equals<T: Bind>(&mut self, expr: &str, value: Option<T>) -> &mut Self {
        self.compare(expr, " = ", value)
    }

    /// Exact match on trimmed text; blank means no filter.
    pub fn equals_text(&mut self, expr: &str, value: Option<&str>) -> &mut Self {
        self.equals(expr, non_blank(value).map(str::to_string))
    }

    pub fn at_least<T: Bind>(&mut self, expr: &str, value: Option<T>) -> &mut Self {
        self.compare(expr, " >= ", value)
    }

    pub fn at_most<T: Bind>(&mut self, expr: &str, value: Option<T>) -> &mut Self {
        self.compare(expr, " <= ", value)
    }

    pub fn below<T: Bind>(&mut self, expr: &str, value: Option<T>) -> &mut Self {
        self.compare(expr, " < ", value)
    }

    fn compare<T: Bind>(&mut self, expr: &str, op: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.clause().push(expr).push(op).push_bind(value);
        }
        self
    }

    /// Compares the calendar date of `expr` (timestamps are truncated).
    pub fn on_or_after(&mut self, expr: &str, date: Option<NaiveDate>) -> &mut Self {
        self.compare_date(expr, " >= ", date)
    }

    pub fn on_or_before(&mut self, expr: &str, date: Option<NaiveDate>) -> &mut Self {
        self.compare_date(expr, " <= ", date)
    }

    fn compare_date(&mut self, expr: &str, op: &str, date: Option<NaiveDate>) -> &mut Self {
        if let Some(date) = date {
            self.clause()
                .push("CAST(")
                .push(expr)
                .push(" AS date)")
                .push(op)
                .push_bind(date);
        }
        self
    }

    /// Both bounds of a resolved range; either side may be open.
    pub fn within(&mut self, expr: &str, range: &DateRange) -> &mut Self {
        self.on_or_after(expr, range.from).on_or_before(expr, range.to)
    }

    pub fn is_null(&mut self, expr: &str) -> &mut Self {
        self.clause().push(expr).push(" IS NULL");
        self
    }

    pub fn not_null(&mut self, expr: &str) -> &mut Self {
        self.clause().push(expr).push(" IS NOT NULL");
        self
    }

    /// `expr IN (<subquery>)`, the subquery written by `build`.
    pub fn in_subquery(&mut self, expr: &str, build: impl FnOnce(&mut Sql)) -> &mut Self {
        let sql = self.clause();
        sql.push(expr).push(" IN (");
        build(sql);
        sql.push(")");
        self
    }

    /// `expr = ANY($n)`; an empty list adds nothing.
    pub fn any_of<T>(&mut self, expr: &str, values: Vec<T>) -> &mut Self
    where
        Vec<T>: Bind,
    {
        if !values.is_empty() {
            self.clause().push(expr).push(" = ANY(").push_bind(values).push(")");
        }
        self
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn absent_values_add_nothing() {
        let mut sql = Sql::new("SELECT * FROM contacts");
        Predicates::new(&mut sql)
            .contains("agent", None)
            .contains("client", Some("   "))
            .equals::<i64>("llg_id", None)
            .within("created_date", &DateRange::default());
        assert_eq!(sql.sql(), "SELECT * FROM contacts");
    }

    #[test]
    fn first_condition_opens_the_where_clause() {
        let mut sql = Sql::new("SELECT * FROM contacts");
        Predicates::new(&mut sql)
            .contains("agent", Some(" Jo "))
            .equals_text("state", Some("TX"))
            .within("created_date", &DateRange::new(Some(date(2024, 1, 1)), None, None))
            .is_null("cancel_date");
        assert_eq!(
            sql.sql(),
            "SELECT * FROM contacts WHERE agent ILIKE $1 AND state = $2 \
             AND CAST(created_date AS date) >= $3 AND cancel_date IS NULL"
        );
    }

    #[test]
    fn any_of_skips_empty_lists() {
        let mut sql = Sql::new("SELECT * FROM epfs");
        Predicates::new(&mut sql)
            .any_of::<i64>("paid_to", vec![])
            .any_of("paid_to", vec![1_i64, 2]);
        assert_eq!(sql.sql(), "SELECT * FROM epfs WHERE paid_to = ANY($1)");
    }

    #[test]
    fn payment_date_falls_back_through_scheduled_payments() {
        assert_eq!(date_field_column(DateField::Submitted), "submitted_date");
        assert!(date_field_column(DateField::Payment).starts_with("COALESCE(first_payment_cleared_date"));
    }
}
