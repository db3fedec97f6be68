use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Report query failed: {0}")]
    QueryError(#[from] sqlx::Error),

    /// An update or single-record lookup matched no row.
    #[error("The requested record was not found in the database.")]
    NotFound,
}
