use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use beadstock_core::DomainError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::InvalidInput(_) => json_error(StatusCode::BAD_REQUEST, "invalid_input", message),
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", message),
        DomainError::Conflict(_) => json_error(StatusCode::CONFLICT, "conflict", message),
        DomainError::InsufficientStock { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "insufficient_stock", message)
        }
        DomainError::Unavailable(_) => json_error(StatusCode::SERVICE_UNAVAILABLE, "unavailable", message),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = [
            (DomainError::invalid_input("x"), StatusCode::BAD_REQUEST),
            (DomainError::invalid_id("x"), StatusCode::BAD_REQUEST),
            (DomainError::not_found(), StatusCode::NOT_FOUND),
            (DomainError::conflict("x"), StatusCode::CONFLICT),
            (DomainError::insufficient_stock(1, 2), StatusCode::UNPROCESSABLE_ENTITY),
            (DomainError::unavailable("x"), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (err, status) in cases {
            assert_eq!(domain_error_to_response(err).status(), status);
        }
    }
}
