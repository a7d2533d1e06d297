use actix_web::{HttpResponse, ResponseError, error::BlockingError, http::StatusCode};
use derive_more::Display;
use serde_json::json;
use tracing::error;

#[derive(Debug, Display)]
pub enum AppError {
    /// Malformed request or upload, missing required field.
    #[display(fmt = "{}", _0)]
    Validation(String),

    /// Upload columns with no `salary_item_meta` entry.
    #[display(fmt = "Unknown salary items detected: {:?}", unknown)]
    UnknownItems { unknown: Vec<String> },

    /// Unrecognised month label, unreadable spreadsheet.
    #[display(fmt = "{}", _0)]
    Parse(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "database error: {}", _0)]
    Persistence(String),

    #[display(fmt = "internal error: {}", _0)]
    Internal(String),
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::UnknownItems { .. } | AppError::Parse(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Persistence(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::UnknownItems { unknown } => json!({
                "error": "Unknown salary items detected",
                "message": "Some Excel columns do not match salary_item_meta.",
                "unknown_columns": unknown,
                "hint": "Please fix spelling or create metadata before uploading."
            }),
            AppError::Persistence(detail) | AppError::Internal(detail) => {
                error!(error = %detail, "Request failed");
                json!({ "error": "Internal Server Error" })
            }
            other => json!({ "error": other.to_string() }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Persistence(e.to_string())
    }
}

impl From<calamine::Error> for AppError {
    fn from(e: calamine::Error) -> Self {
        AppError::Parse(format!("Failed to read Excel: {}", e))
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        AppError::Internal(format!("Failed to write Excel: {}", e))
    }
}

impl From<BlockingError> for AppError {
    fn from(e: BlockingError) -> Self {
        AppError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(err: AppError) -> serde_json::Value {
        let resp = err.error_response();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Parse("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::UnknownItems { unknown: vec![] }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Persistence("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn persistence_detail_is_not_leaked() {
        let body = body_json(AppError::Persistence("Duplicate entry 'secret'".into())).await;
        assert_eq!(body["error"], "Internal Server Error");
    }

    #[actix_web::test]
    async fn unknown_items_lists_columns() {
        let body = body_json(AppError::UnknownItems {
            unknown: vec!["ค่าอื่นๆ".to_string()],
        })
        .await;
        assert_eq!(body["unknown_columns"][0], "ค่าอื่นๆ");
    }

    #[actix_web::test]
    async fn parse_error_carries_diagnostic() {
        let body = body_json(AppError::Parse("Unrecognised month label `abc`".into())).await;
        assert_eq!(body["error"], "Unrecognised month label `abc`");
    }
}
