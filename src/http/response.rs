//! Error responses.
//!
//! A failed tile answers `500` with the error message as a JSON string body,
//! whatever went wrong upstream.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::sources::SourceError;

impl IntoResponse for SourceError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        tracing::error!(error = %message, "Dashboard request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(message)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_error_body_is_json_string() {
        let response = SourceError::Status {
            source_name: "appfigures",
            status: 401,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let message: String = serde_json::from_slice(&body).unwrap();
        assert_eq!(message, "appfigures returned HTTP 401");
    }
}
