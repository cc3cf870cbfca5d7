use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

/// Success envelope: `{ success: true, data, message }`.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    fn new(data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}

/// Error envelope: `{ success: false, error: { code, message, details } }`.
#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ApiErrorBody,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    pub details: Option<Value>,
}

pub fn success<T: Serialize>(data: T, message: impl Into<String>) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::new(Some(data), message)))
}

/// 201 variant of [`success`] for freshly created resources.
pub fn created<T: Serialize>(data: T, message: impl Into<String>) -> impl IntoResponse {
    (StatusCode::CREATED, Json(ApiResponse::new(Some(data), message)))
}

pub fn empty_success(message: impl Into<String>) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::<()>::new(None, message)))
}

pub fn error(
    code: &str,
    message: impl Into<String>,
    details: Option<Value>,
    status: StatusCode,
) -> Response {
    let body = ApiErrorResponse {
        success: false,
        error: ApiErrorBody {
            code: code.to_string(),
            message: message.into(),
            details,
        },
    };

    (status, Json(body)).into_response()
}
