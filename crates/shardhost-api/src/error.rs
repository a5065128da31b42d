//! HTTP error mapping for lifecycle errors.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use shardhost_lifecycle::LifecycleError;

/// Error wrapper carrying the HTTP projection of a lifecycle failure.
#[derive(Debug)]
pub struct ApiError(pub LifecycleError);

impl ApiError {
    /// A validation failure raised directly by the API layer.
    pub fn validation(message: impl Into<String>) -> Self {
        Self(LifecycleError::Validation(message.into()))
    }

    fn status(&self) -> StatusCode {
        match &self.0 {
            LifecycleError::Validation(_) => StatusCode::BAD_REQUEST,
            LifecycleError::NotFound(_) => StatusCode::NOT_FOUND,
            LifecycleError::Conflict(_) => StatusCode::CONFLICT,
            LifecycleError::Authorization(_) => StatusCode::FORBIDDEN,
            LifecycleError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            LifecycleError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LifecycleError> for ApiError {
    fn from(e: LifecycleError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_map_to_status_codes() {
        let cases = [
            (LifecycleError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (LifecycleError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (LifecycleError::Conflict("x".into()), StatusCode::CONFLICT),
            (LifecycleError::Authorization("x".into()), StatusCode::FORBIDDEN),
            (LifecycleError::Timeout("x".into()), StatusCode::GATEWAY_TIMEOUT),
            (
                LifecycleError::Infrastructure("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }
}
