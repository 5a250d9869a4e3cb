use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use merx_order::models::OrderError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    BadRequest { code: &'static str, message: String },
    NotFound { code: &'static str, message: String },
    BadGateway { code: &'static str, message: String },
    Internal(anyhow::Error),
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        AppError::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        AppError::NotFound {
            code,
            message: message.into(),
        }
    }

    pub fn internal(err: Box<dyn std::error::Error + Send + Sync + 'static>) -> Self {
        AppError::Internal(anyhow::Error::from_boxed(err))
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let code = err.kind();
        let message = err.to_string();
        match err {
            OrderError::ProductNotFound { .. } | OrderError::PricingConfigMissing { .. } => {
                AppError::NotFound { code, message }
            }
            OrderError::RegionMismatch { .. }
            | OrderError::InsufficientStock { .. }
            | OrderError::InvalidPricingInput(_)
            | OrderError::InvalidOrderShape(_) => AppError::BadRequest { code, message },
            OrderError::ConfirmationFailed(_) => AppError::BadGateway { code, message },
            OrderError::Storage(_) => AppError::Internal(anyhow::anyhow!(message)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::NotFound { code, message } => (StatusCode::NOT_FOUND, code, message),
            AppError::BadGateway { code, message } => (StatusCode::BAD_GATEWAY, code, message),
            AppError::Internal(err) => {
                tracing::error!("Internal Server Error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": code,
            "message": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
