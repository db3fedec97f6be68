//! # Reporting Database Crate
//!
//! This crate is the only place that talks to the PostgreSQL reporting store.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** Encapsulates all SQL. Callers hand over a typed report query
//!   (filters, resolved date range) and get typed rows back.
//! - **One query builder:** Every report assembles its text through
//!   [`query::Predicates`], so user input is always bound, never interpolated,
//!   and the SQL can be asserted in unit tests without a live database.
//! - **Arithmetic stays in Rust:** Tiers, waterfalls, ratios and per-piece costs
//!   are filled in after the fetch by each query's `finish` step.
//!
//! ## Public API
//!
//! - `connect`: builds the connection pool.
//! - `DbRepository`: paginate, fetch-all, dropdown options, cost updates and the
//!   team-ranks aggregates.
//! - `reports`: one module per report with its query and row type.
//! - `DbError`: the errors this crate returns.

pub mod connection;
pub mod error;
pub mod query;
pub mod reports;
pub mod repository;

pub use connection::connect;
pub use error::DbError;
pub use query::ReportQuery;
pub use reports::FilterOptions;
pub use repository::DbRepository;
