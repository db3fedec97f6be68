use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Inclusive lower bound of each tier, tier 1 first. Each tier runs up to
/// (but not including) the next floor; tier 9 is open-ended.
pub const TIER_FLOORS: [i64; 9] = [0, 12_000, 15_001, 19_000, 26_000, 35_000, 50_000, 65_000, 80_000];

/// A 1-9 ordinal bucket derived from a debt amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DebtTier(u8);

impl DebtTier {
    pub const ALL: [DebtTier; 9] = [
        DebtTier(1),
        DebtTier(2),
        DebtTier(3),
        DebtTier(4),
        DebtTier(5),
        DebtTier(6),
        DebtTier(7),
        DebtTier(8),
        DebtTier(9),
    ];

    pub fn new(tier: u8) -> Option<Self> {
        (1..=9).contains(&tier).then_some(Self(tier))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// The half-open amount interval `[lower, upper)` covered by this tier.
    /// `upper` is `None` for the top tier.
    pub fn bounds(self) -> (Decimal, Option<Decimal>) {
        let index = usize::from(self.0 - 1);
        let lower = Decimal::from(TIER_FLOORS[index]);
        let upper = TIER_FLOORS.get(index + 1).copied().map(Decimal::from);
        (lower, upper)
    }

    fn for_non_negative(amount: Decimal) -> Self {
        let position = TIER_FLOORS
            .iter()
            .rposition(|floor| amount >= Decimal::from(*floor))
            .unwrap_or(0);
        // `position` is at most 8, so the tier always fits.
        Self(position as u8 + 1)
    }
}

impl fmt::Display for DebtTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<DebtTier> for u8 {
    fn from(tier: DebtTier) -> Self {
        tier.0
    }
}

impl TryFrom<u8> for DebtTier {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        DebtTier::new(value)
            .ok_or_else(|| CoreError::InvalidInput("debt_tier".into(), value.to_string()))
    }
}

impl FromStr for DebtTier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(DebtTier::new)
            .ok_or_else(|| CoreError::InvalidInput("debt_tier".into(), s.to_string()))
    }
}

/// Lead-report policy: zero is a valid tier-1 amount; only negatives are unclassified.
pub fn classify_inclusive_of_zero(amount: Decimal) -> Option<DebtTier> {
    if amount < Decimal::ZERO {
        return None;
    }
    Some(DebtTier::for_non_negative(amount))
}

/// Negotiator-report policy: amounts at or below zero carry no tier.
pub fn classify_positive_only(amount: Decimal) -> Option<DebtTier> {
    if amount <= Decimal::ZERO {
        return None;
    }
    Some(DebtTier::for_non_negative(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tier(amount: Decimal) -> Option<u8> {
        classify_inclusive_of_zero(amount).map(DebtTier::get)
    }

    #[test]
    fn breakpoints_are_half_open() {
        let amounts = [dec!(0), dec!(11999), dec!(12000), dec!(15000), dec!(15001), dec!(80000), dec!(80001)];
        let tiers: Vec<_> = amounts.iter().map(|a| tier(*a)).collect();
        assert_eq!(
            tiers,
            vec![Some(1), Some(1), Some(2), Some(2), Some(3), Some(9), Some(9)]
        );
        assert_eq!(tier(dec!(11999.99)), Some(1));
        assert_eq!(tier(dec!(64999.99)), Some(7));
        assert_eq!(tier(dec!(65000)), Some(8));
    }

    #[test]
    fn zero_policies_diverge() {
        assert_eq!(tier(dec!(0)), Some(1));
        assert_eq!(classify_positive_only(dec!(0)), None);
        assert_eq!(classify_positive_only(dec!(-5)), None);
        assert_eq!(tier(dec!(-5)), None);
        assert_eq!(classify_positive_only(dec!(0.01)).map(DebtTier::get), Some(1));
        assert_eq!(classify_positive_only(dec!(26000)).map(DebtTier::get), Some(5));
    }

    #[test]
    fn bounds_match_classification() {
        for tier in DebtTier::ALL {
            let (lower, upper) = tier.bounds();
            assert_eq!(classify_inclusive_of_zero(lower), Some(tier));
            if let Some(upper) = upper {
                assert_eq!(classify_inclusive_of_zero(upper - dec!(0.01)), Some(tier));
            }
        }
        assert_eq!(DebtTier::ALL[8].bounds(), (dec!(80000), None));
    }

    #[test]
    fn parses_only_valid_ordinals() {
        assert_eq!("3".parse::<DebtTier>().map(DebtTier::get), Ok(3));
        assert!("0".parse::<DebtTier>().is_err());
        assert!("10".parse::<DebtTier>().is_err());
        assert!("tier".parse::<DebtTier>().is_err());
    }
}
