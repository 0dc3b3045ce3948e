// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::employee::Employee;

// Dados para registro de um novo funcionário
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterEmployeePayload {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    #[schema(example = "Ana Ribeiro")]
    pub name: String,
    #[validate(email(message = "email is invalid"))]
    #[schema(example = "ana.ribeiro@empresa.pt")]
    pub email: String,
    #[validate(length(min = 6, message = "password must have at least 6 characters"))]
    #[schema(example = "segredo123")]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "department is required"))]
    #[schema(example = "Engenharia")]
    pub department: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordPayload {
    #[validate(length(min = 1, message = "current_password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "New password must be at least 6 characters"))]
    pub new_password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    pub employee: Employee,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do funcionário)
    pub email: String,
    pub name: String,
    pub department: String,
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

// O ator autenticado, resolvido uma única vez na borda e passado
// explicitamente para os serviços.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub employee_id: Uuid,
    pub email: String,
    pub name: String,
    pub department: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            employee_id: claims.sub,
            email: claims.email,
            name: claims.name,
            department: claims.department,
        }
    }
}
