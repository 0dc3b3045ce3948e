// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

// Códigos de erro expostos no corpo da resposta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    InternalError,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Corpo padrão: {"error": CODE, "message": "..."}
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "VALIDATION_ERROR")]
    pub error: ErrorCode,
    #[schema(example = "seats_reserved must be greater than 0")]
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Erro de validação")]
    InvalidPayload(#[from] validator::ValidationErrors),

    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Missing or invalid authentication token")]
    InvalidToken,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation(_) | AppError::InvalidPayload(_) => ErrorCode::ValidationError,
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::Unauthorized(_) => {
                ErrorCode::Unauthorized
            }
            AppError::Forbidden(_) => ErrorCode::Forbidden,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::EmailAlreadyExists | AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => ErrorCode::InternalError,
        }
    }

    // Mensagem segura para o cliente. Erros internos nunca vazam detalhes.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidPayload(errors) => {
                let mut fields: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .map(|(field, field_errors)| {
                        let messages: Vec<String> = field_errors
                            .iter()
                            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                            .collect();
                        if messages.is_empty() {
                            format!("{field} is invalid")
                        } else {
                            messages.join(", ")
                        }
                    })
                    .collect();
                fields.sort();
                fields.join("; ")
            }
            other if other.code() == ErrorCode::InternalError => "Unexpected server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();

        if code == ErrorCode::InternalError {
            // O `tracing` registra a causa real; o cliente só vê a mensagem genérica.
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let body = ErrorBody {
            error: code,
            message: self.public_message(),
        };
        (code.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 6, message = "password must have at least 6 characters"))]
        password: String,
    }

    #[test]
    fn taxonomy_maps_to_status_codes() {
        assert_eq!(AppError::validation("x").code().status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidToken.code().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::forbidden("x").code().status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::not_found("x").code().status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::EmailAlreadyExists.code().status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InternalServerError(anyhow::anyhow!("boom")).code().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_details_do_not_leak() {
        let err = AppError::InternalServerError(anyhow::anyhow!("connection refused at 10.0.0.3"));
        assert_eq!(err.public_message(), "Unexpected server error");
    }

    #[test]
    fn validator_messages_are_collected() {
        let errors = Probe { password: "123".into() }.validate().unwrap_err();
        let err = AppError::from(errors);
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.public_message(), "password must have at least 6 characters");
    }

    #[test]
    fn codes_serialize_in_screaming_snake_case() {
        let json = serde_json::to_value(ErrorCode::ValidationError).unwrap();
        assert_eq!(json, "VALIDATION_ERROR");
        let json = serde_json::to_value(ErrorCode::NotFound).unwrap();
        assert_eq!(json, "NOT_FOUND");
    }
}
