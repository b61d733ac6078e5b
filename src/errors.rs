use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use r2d2_redis::redis::RedisError;
use serde_json::json;
use thiserror::Error;

/// Everything that can go wrong while serving a storefront request.
///
/// Domain errors carry user-facing messages; infrastructure errors are
/// reported generically and logged with their detail.
#[derive(Debug, Error)]
pub enum ShopError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("not enough stock for the requested quantity")]
    OutOfStock,
    #[error("{0}")]
    InvalidInput(String),
    #[error("you must agree to the terms before placing an order")]
    TermsNotAccepted,
    #[error("your cart is empty")]
    EmptyCart,
    #[error("cart item index out of range")]
    IndexOutOfRange,
    #[error("storage error: {0}")]
    Persistence(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("session store error: {0}")]
    Session(#[from] RedisError),
    #[error("session payload error: {0}")]
    SessionPayload(#[from] serde_json::Error),
    #[error("notification error: {0}")]
    Notification(String),
}

impl ResponseError for ShopError {
    fn status_code(&self) -> StatusCode {
        match self {
            ShopError::NotFound(_) => StatusCode::NOT_FOUND,
            ShopError::OutOfStock
            | ShopError::InvalidInput(_)
            | ShopError::TermsNotAccepted
            | ShopError::EmptyCart
            | ShopError::IndexOutOfRange => StatusCode::BAD_REQUEST,
            ShopError::Persistence(_)
            | ShopError::Pool(_)
            | ShopError::Session(_)
            | ShopError::SessionPayload(_)
            | ShopError::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Something went wrong. Please try again later.".to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(status).json(json!({ "error": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_client_statuses() {
        assert_eq!(ShopError::NotFound("product").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ShopError::OutOfStock.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ShopError::EmptyCart.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ShopError::TermsNotAccepted.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ShopError::IndexOutOfRange.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn infrastructure_detail_never_reaches_the_body() {
        let err = ShopError::Persistence(diesel::result::Error::NotFound);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = err.error_response();
        assert_eq!(body.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
