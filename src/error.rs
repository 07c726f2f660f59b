//! HTTP error taxonomy and mapping onto response codes.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::core::data::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no file was attached to the `{0}` field")]
    MissingFile(&'static str),
    #[error("uploaded file exceeds the {0}-byte limit")]
    FileTooLarge(usize),
    #[error("unsupported upload content type `{0}`")]
    UnsupportedType(String),
    #[error("malformed multipart payload: {0}")]
    BadPayload(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to store uploaded file: {0}")]
    UploadIo(#[from] std::io::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFile(_) | ApiError::BadPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::FileTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Store(StoreError::Unavailable) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(_) | ApiError::UploadIo(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}
