use rust_decimal::Decimal;
use serde::Serialize;

/// Costs derived from a marketing drop's stored totals. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DropCosts {
    pub per_piece_mail_cost: Decimal,
    pub per_piece_data_cost: Decimal,
    pub total_drop_cost: Decimal,
    pub per_piece_total_cost: Decimal,
}

impl DropCosts {
    /// Missing costs count as zero; per-piece values are zero when nothing was dropped.
    pub fn derive(mail_drop_cost: Option<Decimal>, data_drop_cost: Option<Decimal>, amount_dropped: Option<i64>) -> Self {
        let mail = mail_drop_cost.unwrap_or_default();
        let data = data_drop_cost.unwrap_or_default();
        let total = mail + data;

        let per_piece = |cost: Decimal| match amount_dropped {
            Some(pieces) if pieces != 0 => cost.checked_div(Decimal::from(pieces)).unwrap_or_default(),
            _ => Decimal::ZERO,
        };

        Self {
            per_piece_mail_cost: per_piece(mail),
            per_piece_data_cost: per_piece(data),
            total_drop_cost: total,
            per_piece_total_cost: per_piece(total),
        }
    }
}
