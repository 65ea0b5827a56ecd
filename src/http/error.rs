use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

use crate::application::AppError;
use crate::auth::REALM;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidAmount(_)
            | AppError::InvalidPage(_)
            | AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            // Empty body: a missing card and someone else's card look the same.
            AppError::NotFound(_) => status.into_response(),

            AppError::Unauthenticated => {
                let mut response = (status, Json(json!({ "error": self.to_string() }))).into_response();
                if let Ok(challenge) = HeaderValue::from_str(&format!("Basic realm=\"{REALM}\"")) {
                    response.headers_mut().insert(WWW_AUTHENTICATE, challenge);
                }
                response
            }

            AppError::Database(ref err) => {
                error!(error = %err, "Request failed");
                (status, Json(json!({ "error": "internal server error" }))).into_response()
            }

            _ => {
                warn!(status = status.as_u16(), error = %self, "Request rejected");
                (status, Json(json!({ "error": self.to_string() }))).into_response()
            }
        }
    }
}
