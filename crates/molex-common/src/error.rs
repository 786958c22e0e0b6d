use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MolexError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("CSV parse error: {0}")]
    Csv(String),

    #[error("Invalid structure identifier: {0:?}")]
    InvalidProtein(String),

    #[error("Protein not in catalog: {0}")]
    UnknownProtein(String),

    #[error("Compound not found: {0}")]
    CompoundNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, MolexError>;

/// Error type returned by JSON API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MolexError> for ApiError {
    fn from(err: MolexError) -> Self {
        match err {
            MolexError::UnknownProtein(_) | MolexError::CompoundNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            MolexError::InvalidProtein(_) => ApiError::BadRequest(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("API error: {}", self);
        }
        let body = serde_json::json!({ "status": "error", "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_errors_map_to_not_found() {
        let api: ApiError = MolexError::UnknownProtein("9XYZ".into()).into();
        assert_eq!(api.status(), StatusCode::NOT_FOUND);

        let api: ApiError = MolexError::CompoundNotFound("C404".into()).into();
        assert_eq!(api.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_protein_is_bad_request() {
        let api: ApiError = MolexError::InvalidProtein("../etc".into()).into();
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_io_error_is_internal() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let api: ApiError = MolexError::from(io).into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(api.to_string().contains("disk gone"));
    }
}
