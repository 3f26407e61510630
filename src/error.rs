use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Invalid or expired coupon code")]
    CouponNotFound,

    #[error("Minimum order value for this coupon is {min_order_value}")]
    MinOrderNotMet { min_order_value: i64 },

    #[error("You have already used this coupon")]
    CouponAlreadyUsed,

    #[error("Invalid shipping address: {0}")]
    AddressValidationFailed(String),

    #[error("You can save at most {0} addresses")]
    AddressLimitExceeded(usize),

    #[error("Payment could not be initiated: {0}")]
    PaymentInitiationFailed(String),

    #[error("Payment was not confirmed: {0}")]
    PaymentNotConfirmed(String),

    #[error(
        "Your payment was received but the order could not be recorded. \
         Please contact support with your payment reference."
    )]
    OrderPersistenceFailed,

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_)
            | AppError::CouponNotFound
            | AppError::MinOrderNotMet { .. }
            | AppError::AddressValidationFailed(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::CouponAlreadyUsed | AppError::AddressLimitExceeded(_) => {
                StatusCode::CONFLICT
            }
            AppError::PaymentNotConfirmed(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::PaymentInitiationFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::OrderPersistenceFailed
            | AppError::DbError(_)
            | AppError::OrmError(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
