use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde_json::json;

use crate::error::StudyError;

impl IntoResponse for StudyError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message, field) = match self {
            StudyError::Validation { field, message } => {
                (StatusCode::BAD_REQUEST, message, Some(field))
            }
            StudyError::SessionNotFound(_) => (StatusCode::NOT_FOUND, self.to_string(), None),
            StudyError::Conflict(message) => (StatusCode::CONFLICT, message, None),
            StudyError::Storage(ref err) => {
                error!("storage failure: {err:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}"), None)
            }
        };

        let mut detail = json!({ "code": code, "message": message });
        if let Some(field) = field {
            detail["field"] = json!(field);
        }

        (status, Json(json!({ "success": false, "error": detail }))).into_response()
    }
}

impl From<JsonRejection> for StudyError {
    fn from(rejection: JsonRejection) -> Self {
        StudyError::validation("body", rejection.body_text())
    }
}

impl From<PathRejection> for StudyError {
    fn from(rejection: PathRejection) -> Self {
        StudyError::validation("id", rejection.body_text())
    }
}
