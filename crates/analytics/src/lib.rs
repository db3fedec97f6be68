//! # Reporting Analytics
//!
//! The numeric reductions that run over fetched report rows.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** nothing here touches the database or the clock. Rows come in,
//!   derived values go out, and "today" is always a parameter.
//! - **No silent division errors:** every ratio has an explicit zero policy, either
//!   `0` or `None`, chosen per field.
//!
//! ## Public API
//!
//! - `ranking`: tie-averaged ranks, the 50/30/20 composite score, team/company rollups.
//! - `waterfall`: the K..U tranche recovery chain.
//! - `negotiator`: balance ratio, last activity and snapshot dates for negotiator rows.
//! - `costs`: per-piece marketing drop costs.
//! - `completion`: settlement rate and program completion ratios.

pub mod completion;
pub mod costs;
pub mod negotiator;
pub mod ranking;
pub mod waterfall;

pub use costs::DropCosts;
pub use negotiator::AccountActivity;
pub use ranking::{ActivityCounts, PerformanceRow};
pub use waterfall::{Waterfall, WaterfallInputs};
