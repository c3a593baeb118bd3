pub mod categories;
pub mod health;
pub mod risks;
pub mod stats;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::RegisterError;

/// Handler error rendered as `{"error": "..."}` with a status matching its kind.
#[derive(Debug)]
pub struct AppError(RegisterError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            RegisterError::NotFound { .. } => StatusCode::NOT_FOUND,
            RegisterError::Validation(_) | RegisterError::UnknownCategory(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            RegisterError::Conflict(_) | RegisterError::CategoryInUse(_) => StatusCode::CONFLICT,
            RegisterError::Database(_) | RegisterError::Migration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if self.0.is_client_error() {
            tracing::warn!(status = status.as_u16(), error = %self.0, "request rejected");
        } else {
            tracing::error!(error = %self.0, "request failed");
        }

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<RegisterError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// `skip`/`limit` query parameters shared by the list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn resolve(&self, default_limit: i64) -> (i64, i64) {
        (
            self.skip.unwrap_or(0).max(0),
            self.limit.unwrap_or(default_limit).max(0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::from(RegisterError::risk_not_found(1)).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(RegisterError::Validation("x".into())).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::from(RegisterError::CategoryInUse(2)).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::from(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_pagination_defaults_and_clamping() {
        assert_eq!(Pagination::default().resolve(100), (0, 100));
        let page = Pagination {
            skip: Some(-4),
            limit: Some(10),
        };
        assert_eq!(page.resolve(100), (0, 10));
    }
}
