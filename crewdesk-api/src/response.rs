/// Success response envelope
///
/// Every successful response carries `{statusCode, message, data}`. Success
/// codes are 200 (ok) and 201 (created); the envelope mirrors the error
/// shape in `error.rs` so clients parse one format.
///
/// # Example
///
/// ```
/// use crewdesk_api::response::ApiResponse;
/// use serde_json::json;
///
/// let response = ApiResponse::ok("Projects retrieved successfully", json!([]));
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Success envelope returned by every handler
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    status: StatusCode,
    message: String,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK with a message and payload
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            message: message.into(),
            data,
        }
    }

    /// 201 Created with a message and payload
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            message: message.into(),
            data,
        }
    }
}

/// Wire shape of the success envelope
#[derive(Debug, Serialize)]
struct SuccessBody<T: Serialize> {
    #[serde(rename = "statusCode")]
    status_code: u16,

    message: String,

    data: T,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = Json(SuccessBody {
            status_code: self.status.as_u16(),
            message: self.message,
            data: self.data,
        });

        (self.status, body).into_response()
    }
}
