use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use time::Date;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum FoodLogError {
    #[error("entry {0} not found")]
    NotFound(Uuid),

    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: Date, end: Date },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for FoodLogError {
    fn into_response(self) -> Response {
        let status = match &self {
            FoodLogError::NotFound(_) => StatusCode::NOT_FOUND,
            FoodLogError::InvalidRange { .. } | FoodLogError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            FoodLogError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}
