use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] database::DbError),
    #[error("Analyzer error: {0}")]
    Analyzer(#[from] analyzer::error::AnalyzerError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Export error: {0}")]
    Export(String),
    #[error("Invalid input: {0}")]
    Validation(String),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(database::DbError::NotFound) => {
                (StatusCode::NOT_FOUND, "The requested record was not found".to_string())
            }
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Analyzer(analyzer_err) => {
                tracing::error!(error = ?analyzer_err, "Analyzer error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while ranking agents".to_string(),
                )
            }
            AppError::Csv(csv_err) => {
                tracing::error!(error = ?csv_err, "CSV error.");
                (StatusCode::INTERNAL_SERVER_ERROR, "The export could not be written".to_string())
            }
            AppError::Export(message) => {
                tracing::error!(error = %message, "Export error.");
                (StatusCode::INTERNAL_SERVER_ERROR, "The export could not be written".to_string())
            }
            AppError::Validation(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
