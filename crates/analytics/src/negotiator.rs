use chrono::NaiveDate;
use core_types::range::month_end;
use rust_decimal::Decimal;

/// Literal POA flag shown on every negotiator row.
pub const SEND_POA: &str = "Send POA";

/// `debt / balance` when the balance is positive, otherwise `None`.
pub fn debt_balance_ratio(debt: Option<Decimal>, balance: Option<Decimal>) -> Option<Decimal> {
    let balance = balance.filter(|b| *b > Decimal::ZERO)?;
    debt.unwrap_or_default().checked_div(balance)
}

/// The dates that count as negotiation activity on an assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountActivity {
    pub last_payment_date: Option<NaiveDate>,
    pub settlement_date: Option<NaiveDate>,
    pub ready_to_settle_date: Option<NaiveDate>,
    pub account_not_ready_date: Option<NaiveDate>,
    pub follow_up_date: Option<NaiveDate>,
}

impl AccountActivity {
    /// Latest non-null activity date.
    pub fn last_activity(&self) -> Option<NaiveDate> {
        [
            self.last_payment_date,
            self.settlement_date,
            self.ready_to_settle_date,
            self.account_not_ready_date,
            self.follow_up_date,
        ]
        .into_iter()
        .flatten()
        .max()
    }

    /// Whole days from the last activity to `today`. Negative when the latest
    /// activity is a future-dated follow-up.
    pub fn days_since(&self, today: NaiveDate) -> Option<i64> {
        self.last_activity()
            .map(|last| today.signed_duration_since(last).num_days())
    }
}

/// Balance snapshot dates: end of the month two months back, and end of last month.
pub fn balance_snapshot_dates(today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    Some((month_end(today, 2)?, month_end(today, 1)?))
}
