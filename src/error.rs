use axum::{http::StatusCode, response::IntoResponse};
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum RssError {
    #[error("Environment variable {0} not set")]
    MissingConfigPath(&'static str),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Seed error: {0}")]
    Seed(String),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),
}

impl RssError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
}

impl From<figment::Error> for RssError {
    fn from(e: figment::Error) -> Self {
        RssError::Config(e.to_string())
    }
}

impl IntoResponse for RssError {
    fn into_response(self) -> axum::response::Response {
        match self {
            RssError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            RssError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            other => {
                // Detail stays in the log; clients only see a generic message.
                error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
                    .into_response()
            }
        }
    }
}
