// ABOUTME: JSON request body extractor with enveloped rejections
// ABOUTME: Malformed or wrongly typed bodies become 400 responses with the parser's complaint as detail

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
    Json,
};
use tracing::debug;

use crate::response::ApiResponse;

pub const INVALID_BODY: &str = "Invalid request body";

/// Drop-in for `Json<T>` whose rejection uses the API error envelope
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

pub fn rejection_response(rejection: JsonRejection) -> Response {
    let detail = rejection.body_text();
    debug!("Rejected request body: {}", detail);

    let status = match rejection {
        JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        _ => StatusCode::BAD_REQUEST,
    };
    let body = ApiResponse::<()>::error_with_details(INVALID_BODY.to_string(), vec![detail]);
    (status, ResponseJson(body)).into_response()
}

impl<T, S> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(rejection_response(rejection)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Debug, Deserialize)]
    struct Line {
        quantity: i64,
    }

    async fn extract(content_type: Option<&str>, body: &str) -> Result<Line, (StatusCode, Value)> {
        let mut builder = HttpRequest::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();

        match JsonBody::<Line>::from_request(req, &()).await {
            Ok(JsonBody(line)) => Ok(line),
            Err(response) => {
                let status = response.status();
                let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                    .await
                    .unwrap();
                Err((status, serde_json::from_slice(&bytes).unwrap()))
            }
        }
    }

    #[tokio::test]
    async fn test_well_formed_body_is_extracted() {
        let line = extract(Some("application/json"), r#"{"quantity":3}"#)
            .await
            .unwrap();
        assert_eq!(line.quantity, 3);
    }

    #[tokio::test]
    async fn test_fractional_integer_is_enveloped_bad_request() {
        let (status, json) = extract(Some("application/json"), r#"{"quantity":1.5}"#)
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], INVALID_BODY);
        let detail = json["details"][0].as_str().unwrap();
        assert!(detail.contains("quantity"), "{}", detail);
    }

    #[tokio::test]
    async fn test_syntax_error_is_enveloped_bad_request() {
        let (status, json) = extract(Some("application/json"), "{\"quantity\":")
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(json["details"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_content_type_is_enveloped() {
        let (status, json) = extract(None, r#"{"quantity":3}"#).await.unwrap_err();
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], INVALID_BODY);
    }
}
