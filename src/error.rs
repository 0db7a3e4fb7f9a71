use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};

use crate::api::ApiError;
use crate::imaging::ImagingError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    /// Signed out on a page that needs a user; sends them to log in.
    #[error("Unauthorized")]
    Unauthorized,

    /// Signed in but not allowed; sends them home.
    #[error("Forbidden")]
    Forbidden,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Image(#[from] ImagingError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::Unauthorized => return Redirect::to("/login").into_response(),
            AppError::Forbidden => return Redirect::to("/").into_response(),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Api(e) if e.is_unauthorized() => {
                tracing::warn!("Backend rejected session: {}", e);
                return Redirect::to("/login").into_response();
            }
            AppError::Api(e) if e.is_not_found() => {
                (StatusCode::NOT_FOUND, "Not found".to_string())
            }
            AppError::Api(e) => {
                tracing::error!("Backend error: {}", e);
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            AppError::Image(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Template(e) => {
                tracing::error!("Template error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    fn response_status(err: AppError) -> StatusCode {
        let response = err.into_response();
        response.status()
    }

    fn location(err: AppError) -> String {
        let response = err.into_response();
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn not_found_returns_404() {
        assert_eq!(response_status(AppError::NotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unauthorized_redirects_to_login() {
        assert_eq!(
            response_status(AppError::Unauthorized),
            StatusCode::SEE_OTHER
        );
        assert_eq!(location(AppError::Unauthorized), "/login");
    }

    #[test]
    fn forbidden_redirects_home() {
        assert_eq!(location(AppError::Forbidden), "/");
    }

    #[test]
    fn bad_request_returns_400() {
        assert_eq!(
            response_status(AppError::BadRequest("oops".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn backend_statuses_map_through() {
        let missing = ApiError::Status {
            status: 404,
            message: "Photo not found".into(),
        };
        assert_eq!(response_status(missing.into()), StatusCode::NOT_FOUND);

        let expired = ApiError::Status {
            status: 401,
            message: "Token expired".into(),
        };
        assert_eq!(location(expired.into()), "/login");

        let broken = ApiError::Status {
            status: 500,
            message: "Failed to fetch photos: 500 Internal Server Error".into(),
        };
        assert_eq!(response_status(broken.into()), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn image_errors_are_bad_requests() {
        assert_eq!(
            response_status(ImagingError::NotAnImage.into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn internal_returns_500() {
        assert_eq!(
            response_status(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
