use rust_decimal::Decimal;

/// Settlement amounts accepted per dollar of original debt settled. Zero when nothing settled.
pub fn settlement_rate(accepted: Decimal, settled: Decimal) -> Decimal {
    if settled.is_zero() {
        return Decimal::ZERO;
    }
    accepted.checked_div(settled).unwrap_or_default()
}

/// Share of enrolled debt that has been settled. Zero when enrolled debt is unknown or zero.
pub fn program_completion(settled: Decimal, enrolled: Option<Decimal>) -> Decimal {
    match enrolled {
        Some(enrolled) if !enrolled.is_zero() => settled.checked_div(enrolled).unwrap_or_default(),
        _ => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn ratios_guard_against_zero_denominators() {
        assert_eq!(settlement_rate(dec!(400), dec!(1000)), dec!(0.4));
        assert_eq!(settlement_rate(dec!(400), dec!(0)), dec!(0));
        assert_eq!(program_completion(dec!(1000), Some(dec!(4000))), dec!(0.25));
        assert_eq!(program_completion(dec!(1000), Some(dec!(0))), dec!(0));
        assert_eq!(program_completion(dec!(1000), None), dec!(0));
    }
}
