//! # Core Types
//!
//! The shared vocabulary of the reporting layer. Everything in this crate is
//! pure: no I/O, no clock access. Callers pass "today" explicitly so that every
//! report resolves ranges identically and tests can pin time.
//!
//! - `range`: named range tokens (`today`, `last_month`, `30`, ...) to concrete bounds.
//! - `tier`: the 1-9 debt tier breakpoints and both zero-handling policies.
//! - `filters`: typed per-report filter sets parsed leniently from query strings.
//! - `page`: pagination request/response shapes shared by every report.

pub mod enums;
pub mod error;
pub mod filters;
pub mod page;
pub mod range;
pub mod tier;

// Re-export the core types to provide a clean public API.
pub use enums::{
    Company, DateField, EnrollmentStatusFilter, LeadStatusType, NegotiatorReportType, ReadyFlag,
    TerminalEvent,
};
pub use error::CoreError;
pub use filters::{
    ContactFilters, EnrollmentFilters, LeadFilters, MarketingFilters, NegotiatorFilters,
    ProgramCompletionFilters, TeamRanksFilters, ALL_DATA_SOURCES,
};
pub use page::{clamp_per_page, Page, PageRequest};
pub use range::{resolve, DateRange};
pub use tier::{classify_inclusive_of_zero, classify_positive_only, DebtTier};
