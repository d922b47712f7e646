use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("No document text available: {0}")]
    EmptyDocument(String),

    #[error("Model response did not match the expected shape: {0}")]
    GenerationParseError(String),

    #[error("External service error: {0}")]
    ServiceError(String),

    #[error("Length mismatch: {0}")]
    LengthMismatch(String),

    #[error("There are no questions and answers to evaluate")]
    NothingToEvaluate,

    #[error("Index out of range: {0}")]
    IndexOutOfRange(String),

    #[error("Round mismatch: {0}")]
    RoundMismatch(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::EmptyDocument(_) => "EMPTY_DOCUMENT",
            AppError::GenerationParseError(_) => "GENERATION_PARSE_ERROR",
            AppError::ServiceError(_) => "SERVICE_ERROR",
            AppError::LengthMismatch(_) => "LENGTH_MISMATCH",
            AppError::NothingToEvaluate => "NOTHING_TO_EVALUATE",
            AppError::IndexOutOfRange(_) => "INDEX_OUT_OF_RANGE",
            AppError::RoundMismatch(_) => "ROUND_MISMATCH",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: &'static str,
    pub code: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::EmptyDocument(_) => StatusCode::UNPROCESSABLE_ENTITY,
            // Upstream model failures surface to the user for a manual retry;
            // nothing is rolled back locally.
            AppError::GenerationParseError(_) => StatusCode::BAD_GATEWAY,
            AppError::ServiceError(_) => StatusCode::BAD_GATEWAY,
            AppError::LengthMismatch(_) => StatusCode::BAD_REQUEST,
            AppError::NothingToEvaluate => StatusCode::BAD_REQUEST,
            AppError::IndexOutOfRange(_) => StatusCode::BAD_REQUEST,
            AppError::RoundMismatch(_) => StatusCode::CONFLICT,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            error_code: self.error_code(),
            code: self.status_code().as_u16(),
        })
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<async_openai::error::OpenAIError> for AppError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        AppError::ServiceError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::NotFound("test".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::EmptyDocument("test".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::ServiceError("test".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::GenerationParseError("test".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::RoundMismatch("test".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::NothingToEvaluate.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_error_messages() {
        let err = AppError::NotFound("session".into());
        assert_eq!(err.to_string(), "Not found: session");

        let err = AppError::IndexOutOfRange("answer index 7 of 3".into());
        assert_eq!(err.to_string(), "Index out of range: answer index 7 of 3");
    }

    #[test]
    fn test_validation_errors_convert() {
        use validator::Validate;

        #[derive(Validate)]
        struct Probe {
            #[validate(range(min = 1, max = 10))]
            count: u8,
        }

        let err: AppError = Probe { count: 0 }.validate().unwrap_err().into();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
