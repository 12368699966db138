use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Store(e) => match e {
                StoreError::NotFound(_) | StoreError::UserNotFound(_) => {
                    (StatusCode::NOT_FOUND, e.to_string())
                }
                StoreError::DuplicateUser(_) => (StatusCode::CONFLICT, e.to_string()),
                StoreError::Validation(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                StoreError::Conflict(_) => {
                    tracing::warn!("Write conflict: {}", e);
                    (StatusCode::CONFLICT, "Concurrent update, try again".to_string())
                }
                StoreError::StorageUnavailable => {
                    (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
                }
                StoreError::Parse { .. } | StoreError::Backend(_) => {
                    tracing::error!("Store error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
        };

        (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn response_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn not_found_returns_404() {
        assert_eq!(response_status(AppError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            response_status(StoreError::UserNotFound("u1".into()).into()),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn duplicate_user_returns_409() {
        assert_eq!(
            response_status(StoreError::DuplicateUser("ann@x.com".into()).into()),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn validation_returns_400() {
        assert_eq!(
            response_status(StoreError::Validation("name is required".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            response_status(AppError::BadRequest("oops".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn unavailable_storage_returns_503() {
        assert_eq!(
            response_status(StoreError::StorageUnavailable.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn backend_failure_returns_500() {
        assert_eq!(
            response_status(StoreError::Backend("disk full".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
