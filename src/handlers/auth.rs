// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::{
        error::{AppError, ErrorBody},
        extract::AppJson,
    },
    config::AppState,
    middleware::auth::AuthenticatedEmployee,
    models::{
        auth::{AuthResponse, ChangePasswordPayload, LoginPayload, MessageResponse, RegisterEmployeePayload},
        employee::Employee,
    },
};

// Handler de registro
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = RegisterEmployeePayload,
    responses(
        (status = 201, description = "Funcionário registrado", body = Employee),
        (status = 400, description = "Campos ausentes ou inválidos", body = ErrorBody),
        (status = 409, description = "E-mail já registrado", body = ErrorBody)
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<RegisterEmployeePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let employee = app_state.auth_service.register_employee(payload).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

// Handler de login
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Token emitido", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas", body = ErrorBody)
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let response = app_state.auth_service.login(payload).await?;
    Ok(Json(response))
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Funcionário autenticado", body = Employee),
        (status = 401, description = "Token ausente ou inválido", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
) -> Result<Json<Employee>, AppError> {
    let employee = app_state.auth_service.current_employee(&identity).await?;
    Ok(Json(employee))
}

#[utoipa::path(
    post,
    path = "/auth/change-password",
    tag = "Auth",
    request_body = ChangePasswordPayload,
    responses(
        (status = 200, description = "Senha alterada", body = MessageResponse),
        (status = 400, description = "Nova senha muito curta", body = ErrorBody),
        (status = 401, description = "Senha atual incorreta", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn change_password(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
    AppJson(payload): AppJson<ChangePasswordPayload>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;

    app_state.auth_service.change_password(&identity, payload).await?;
    Ok(Json(MessageResponse {
        message: "Password changed successfully".to_string(),
    }))
}
