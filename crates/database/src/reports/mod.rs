//! One query module per report.

pub mod contact;
pub mod enrollment;
pub mod lead;
pub mod marketing;
pub mod negotiator;
pub mod program_completion;
pub mod team_ranks;
pub mod terminal;
pub mod tranche;

use std::collections::BTreeMap;

/// Dropdown values per filter name.
pub type FilterOptions = BTreeMap<&'static str, Vec<String>>;

/// A dropdown backed by the distinct values of one column.
#[derive(Debug, Clone, Copy)]
pub struct OptionColumn {
    pub key: &'static str,
    pub column: &'static str,
    /// Uses the larger client-list cap instead of the regular one.
    pub wide: bool,
}

impl OptionColumn {
    pub const fn new(key: &'static str, column: &'static str) -> Self {
        Self { key, column, wide: false }
    }

    pub const fn wide(key: &'static str, column: &'static str) -> Self {
        Self { key, column, wide: true }
    }
}

/// Where a report's dropdown values come from.
#[derive(Debug, Clone, Copy)]
pub struct OptionSource {
    pub table: &'static str,
    /// Extra fixed condition limiting which rows feed the dropdowns.
    pub scope: Option<&'static str>,
    pub columns: &'static [OptionColumn],
}
