use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

/// Share of lookback sold debt owed back (K).
pub const LOOKBACK_RATE: Decimal = dec!(0.08);
/// Payment target buffer (N).
pub const PAYMENT_BUFFER: Decimal = dec!(1.10);

/// Per-tranche aggregates that feed the waterfall. Missing aggregates are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WaterfallInputs {
    pub payment: Decimal,
    pub sold_debt_lookback: Decimal,
    pub epf_amount: Decimal,
    pub epf_distribution_amount: Decimal,
}

/// The lookback shortfall/overage chain for one tranche sale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Waterfall {
    /// 8% of lookback sold debt.
    pub k: Decimal,
    /// Payment plus 10%.
    pub n: Decimal,
    /// EPF recovered: cleared payments plus distributions.
    pub q: Decimal,
    /// Lesser of recovery and target.
    pub r: Decimal,
    /// Shortfall the servicer covers.
    pub s: Decimal,
    /// Surplus over target.
    pub t: Decimal,
    /// Recovery ratio `R / N`, zero when there is no target.
    pub u: Decimal,
}

fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

pub fn compute(inputs: WaterfallInputs) -> Waterfall {
    let k = round(inputs.sold_debt_lookback * LOOKBACK_RATE, 2);
    let n = round(inputs.payment * PAYMENT_BUFFER, 2);
    let q = round(inputs.epf_amount + inputs.epf_distribution_amount, 2);

    let lesser = q.min(n);
    let r = round(lesser, 2);
    let s = round((n - q).max(Decimal::ZERO), 2);
    let t = round((q - n).max(Decimal::ZERO), 2);
    let u = if n.is_zero() {
        Decimal::ZERO
    } else {
        lesser.checked_div(n).map_or(Decimal::ZERO, |ratio| round(ratio, 4))
    };

    Waterfall { k, n, q, r, s, t, u }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortfall_tranche() {
        let w = compute(WaterfallInputs {
            payment: dec!(1000),
            sold_debt_lookback: dec!(5000),
            epf_amount: dec!(300),
            epf_distribution_amount: dec!(0),
        });
        assert_eq!(w.k, dec!(400.00));
        assert_eq!(w.n, dec!(1100.00));
        assert_eq!(w.q, dec!(300.00));
        assert_eq!(w.r, dec!(300.00));
        assert_eq!(w.s, dec!(800.00));
        assert_eq!(w.t, dec!(0.00));
        assert_eq!(w.u, dec!(0.2727));
    }

    #[test]
    fn surplus_tranche_caps_recovery_at_target() {
        let w = compute(WaterfallInputs {
            payment: dec!(100),
            sold_debt_lookback: dec!(0),
            epf_amount: dec!(90.004),
            epf_distribution_amount: dec!(40),
        });
        assert_eq!(w.n, dec!(110.00));
        assert_eq!(w.q, dec!(130.00));
        assert_eq!(w.r, dec!(110.00));
        assert_eq!(w.s, dec!(0));
        assert_eq!(w.t, dec!(20.00));
        assert_eq!(w.u, dec!(1));
    }

    #[test]
    fn zero_target_yields_zero_ratio() {
        let w = compute(WaterfallInputs {
            epf_amount: dec!(50),
            ..WaterfallInputs::default()
        });
        assert_eq!(w.n, Decimal::ZERO);
        assert_eq!(w.u, Decimal::ZERO);
        assert_eq!(w.t, dec!(50));
    }

    #[test]
    fn rounds_half_away_from_zero() {
        let w = compute(WaterfallInputs {
            sold_debt_lookback: dec!(0.0625),
            payment: dec!(0.05),
            ..WaterfallInputs::default()
        });
        // 0.0625 * 0.08 = 0.005 and 0.05 * 1.10 = 0.055
        assert_eq!(w.k, dec!(0.01));
        assert_eq!(w.n, dec!(0.06));
    }
}
