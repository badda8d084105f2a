use axum::body::Body;
use axum::extract::rejection::{FormRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Form;

use crate::convert::ConvertError;
use crate::storage::StoreError;

/// Body of every 404 answered for an unknown record.
pub const NOT_FOUND_MESSAGE: &str = "File not found!";

// ============================================================================
// Unified error type for handlers
// ============================================================================

/// A plain-text error that can be either a fail (4xx) or error (5xx).
#[derive(Debug)]
pub enum ApiError {
    Fail(StatusCode, String),
    Error(StatusCode, String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Fail(code, msg) => (code, msg).into_response(),
            ApiError::Error(code, msg) => {
                tracing::error!(status = %code, error = %msg, "Request failed");
                (code, msg).into_response()
            }
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::BAD_REQUEST, message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::NOT_FOUND, message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::PAYLOAD_TOO_LARGE, message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Error(StatusCode::INTERNAL_SERVER_ERROR, message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => ApiError::not_found(NOT_FOUND_MESSAGE),
            StoreError::Decode(_) => ApiError::bad_request(e.to_string()),
            StoreError::Database(e) => ApiError::internal(e.to_string()),
        }
    }
}

impl From<ConvertError> for ApiError {
    fn from(e: ConvertError) -> Self {
        match e {
            ConvertError::Empty | ConvertError::Parse(_) => ApiError::bad_request(e.to_string()),
            ConvertError::Parquet(_) => ApiError::internal(e.to_string()),
        }
    }
}

// ============================================================================
// Downloads
// ============================================================================

/// Build a download response that asks the browser to save `body` as `filename`.
pub fn attachment(content_type: &'static str, filename: &str, body: impl Into<Body>) -> Response {
    let mut response = (StatusCode::OK, body.into()).into_response();
    let headers = response.headers_mut();

    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));

    // Quotes would terminate the quoted filename early
    let filename = filename.replace('"', "_");
    if let Ok(value) = format!("attachment; filename=\"{filename}\"").parse() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    response
}

// ============================================================================
// Custom extractors (reject with ApiError)
// ============================================================================

/// Drop-in replacement for `axum::extract::Path`. Ids that do not parse
/// cannot name a record, so they answer 404.
pub struct AppPath<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for AppPath<T>
where
    axum::extract::Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, ApiError> {
        match axum::extract::Path::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Path(value)) => Ok(AppPath(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected path");
                Err(ApiError::not_found(NOT_FOUND_MESSAGE))
            }
        }
    }
}

/// Drop-in replacement for `axum::Form` that rejects with `ApiError`.
pub struct AppForm<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for AppForm<T>
where
    Form<T>: FromRequest<S, Rejection = FormRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, ApiError> {
        match Form::<T>::from_request(req, state).await {
            Ok(Form(value)) => Ok(AppForm(value)),
            Err(rejection) => {
                let message = match rejection {
                    FormRejection::InvalidFormContentType(_) => {
                        "Missing Content-Type: application/x-www-form-urlencoded header".into()
                    }
                    FormRejection::FailedToDeserializeForm(err) => {
                        format!("Invalid form data: {}", err.body_text())
                    }
                    FormRejection::FailedToDeserializeFormBody(err) => {
                        format!("Invalid form data: {}", err.body_text())
                    }
                    _ => "Failed to read request body".into(),
                };
                Err(ApiError::bad_request(message))
            }
        }
    }
}
