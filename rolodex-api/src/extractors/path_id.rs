//! Path extractor for contact IDs.
//!
//! `PathId` parses the `:id` segment into a [`ContactId`] and answers a
//! malformed value with a 400 in the API's error shape, instead of axum's
//! plain-text path rejection.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use rolodex_core::ContactId;

use crate::error::{ApiError, ErrorCode};

/// Extractor for a contact ID path parameter.
///
/// # Example
///
/// ```rust,ignore
/// async fn get_contact(
///     State(store): State<SharedStore>,
///     PathId(id): PathId,
/// ) -> ApiResult<Json<Contact>> {
///     // id is a ContactId, not a String
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub ContactId);

/// Error returned when PathId extraction fails.
#[derive(Debug)]
pub struct PathIdError {
    pub path_param: String,
    pub message: String,
}

impl std::fmt::Display for PathIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid contact ID '{}': {}", self.path_param, self.message)
    }
}

impl std::error::Error for PathIdError {}

impl From<PathIdError> for ApiError {
    fn from(err: PathIdError) -> Self {
        ApiError::new(ErrorCode::InvalidFormat, err.to_string())
            .with_details(serde_json::json!({ "path_param": err.path_param }))
    }
}

impl IntoResponse for PathIdError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = PathIdError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| PathIdError {
                path_param: parts.uri.path().to_string(),
                message: format!("Failed to extract ID from path: {}", e),
            })?;

        raw.parse::<ContactId>()
            .map(PathId)
            .map_err(|e| PathIdError {
                path_param: raw.clone(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode, routing::get, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new().route(
            "/contacts/:id",
            get(|PathId(id): PathId| async move { id.to_string() }),
        )
    }

    #[test]
    fn test_path_id_error_display() {
        let err = PathIdError {
            path_param: "not-a-uuid".to_string(),
            message: "bad id".to_string(),
        };
        assert!(err.to_string().contains("not-a-uuid"));
        assert_eq!(ApiError::from(err).code, ErrorCode::InvalidFormat);
    }

    #[tokio::test]
    async fn test_valid_id_extracts() {
        let id = ContactId::now_v7();
        let response = app()
            .oneshot(
                Request::builder()
                    .uri(format!("/contacts/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_id_is_bad_request() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/contacts/12345")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
