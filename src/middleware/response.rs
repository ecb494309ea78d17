use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::database::Page;

/// JSON body with an optional non-200 status
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
        }
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
        }
    }

    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

impl ApiResponse<()> {
    /// 204 with an empty body
    pub fn no_content() -> Self {
        Self::with_status((), StatusCode::NO_CONTENT)
    }
}

impl ApiResponse<Value> {
    /// `{"message": ...}` plus any extra fields, e.g. the affected id.
    pub fn message(message: &str, extra: Value) -> Self {
        let mut body = Map::new();
        body.insert("message".to_string(), Value::String(message.to_string()));
        if let Value::Object(fields) = extra {
            body.extend(fields);
        }
        Self::success(Value::Object(body))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }

        match serde_json::to_value(&self.data) {
            Ok(value) => (status, Json(value)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                crate::error::ApiError::internal_server_error("Failed to serialize response data").into_response()
            }
        }
    }
}

/// `{"total": n, "<plural>": [...]}` for paginated listings.
#[derive(Debug)]
pub struct ListResponse<T: Serialize> {
    plural: &'static str,
    page: Page<T>,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(plural: &'static str, page: Page<T>) -> Self {
        Self { plural, page }
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        let items = serde_json::to_value(&self.page.items)?;
        let mut body = Map::new();
        body.insert("total".to_string(), json!(self.page.total));
        body.insert(self.plural.to_string(), items);
        Ok(Value::Object(body))
    }
}

impl<T: Serialize> IntoResponse for ListResponse<T> {
    fn into_response(self) -> Response {
        match self.to_json() {
            Ok(body) => Json(body).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize {}: {}", self.plural, e);
                crate::error::ApiError::internal_server_error("Failed to serialize response data").into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
pub type ListResult<T> = Result<ListResponse<T>, crate::error::ApiError>;
