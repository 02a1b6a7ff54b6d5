use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Every failure the API can report to a client.
///
/// Handlers return it with `?`; [`IntoResponse`] only sets the status and
/// attaches the error to the response, and the request context middleware
/// renders it into the envelope once the request details are at hand.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Request limit exceeded")]
    RequestLimitExceeded,

    #[error("{0}")]
    DuplicateEntity(String),

    #[error("Not Found")]
    NotFound,

    #[error("Resource path not found")]
    ResourceNotFound,

    #[error("Request method not supported")]
    MethodNotAllowed,

    #[error("Post field error: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("HTTP message body not readable: {0}")]
    UnreadableBody(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::RequestLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ApiError::DuplicateEntity(_) => StatusCode::CONFLICT,
            ApiError::NotFound | ApiError::ResourceNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Validation(_) | ApiError::InvalidRequest(_) | ApiError::UnreadableBody(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal(_) | ApiError::Configuration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Status line shown to the client in the envelope.
    pub fn status_text(&self) -> String {
        match self {
            ApiError::RequestLimitExceeded => "Request limit exceeded".to_string(),
            ApiError::DuplicateEntity(msg) => msg.clone(),
            ApiError::NotFound => "Not Found".to_string(),
            ApiError::ResourceNotFound => "Resource path not found".to_string(),
            ApiError::MethodNotAllowed => "Request method not supported".to_string(),
            ApiError::Validation(_) => "Post field error".to_string(),
            ApiError::InvalidRequest(_) => "Invalid request parameters".to_string(),
            ApiError::UnreadableBody(_) => "HTTP message body not readable".to_string(),
            ApiError::Internal(_) | ApiError::Configuration(_) => {
                "An unexpected error occurred".to_string()
            }
        }
    }

    /// Detail lines safe to return to the client.
    pub fn error_messages(&self) -> Vec<String> {
        match self {
            ApiError::Validation(messages) => messages.clone(),
            ApiError::InvalidRequest(msg) => vec![msg.clone()],
            _ => Vec::new(),
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = self.status_code().into_response();
        response.extensions_mut().insert(self);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::RequestLimitExceeded.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            ApiError::DuplicateEntity("Book(s) already exist".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::MethodNotAllowed.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ApiError::Validation(vec![]).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Internal("lock poisoned".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let err = ApiError::Internal("repository lock poisoned".into());
        assert_eq!(err.status_text(), "An unexpected error occurred");
        assert!(err.error_messages().is_empty());
        assert!(err.is_server_error());
    }

    #[test]
    fn test_into_response_carries_error() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(matches!(
            response.extensions().get::<ApiError>(),
            Some(ApiError::NotFound)
        ));
    }
}
