// src/handlers/employees.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::{
        error::{AppError, ErrorBody},
        extract::AppJson,
    },
    config::AppState,
    middleware::auth::AuthenticatedEmployee,
    models::{
        employee::{Employee, EmployeeProfile, UpdateProfilePayload},
        reservation::Reservation,
        ride::Ride,
        stats::HistoryItem,
    },
};

#[utoipa::path(
    get,
    path = "/employees/",
    tag = "Employees",
    responses((status = 200, description = "Diretório de funcionários", body = [Employee])),
    security(("api_jwt" = []))
)]
pub async fn list_employees(
    State(app_state): State<AppState>,
    _auth: AuthenticatedEmployee,
) -> Result<Json<Vec<Employee>>, AppError> {
    let employees = app_state.employee_service.list_employees().await?;
    Ok(Json(employees))
}

#[utoipa::path(
    get,
    path = "/employees/me",
    tag = "Employees",
    responses((status = 200, description = "Perfil com estatísticas de carona", body = EmployeeProfile)),
    security(("api_jwt" = []))
)]
pub async fn get_profile(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
) -> Result<Json<EmployeeProfile>, AppError> {
    let profile = app_state.employee_service.profile(&identity).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    patch,
    path = "/employees/me",
    tag = "Employees",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = Employee),
        (status = 400, description = "Campos inválidos", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_profile(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
    AppJson(payload): AppJson<UpdateProfilePayload>,
) -> Result<Json<Employee>, AppError> {
    payload.validate()?;

    let employee = app_state.employee_service.update_profile(&identity, payload).await?;
    Ok(Json(employee))
}

#[utoipa::path(
    get,
    path = "/employees/me/rides",
    tag = "Employees",
    responses((status = 200, description = "Caronas oferecidas", body = [Ride])),
    security(("api_jwt" = []))
)]
pub async fn my_rides(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
) -> Result<Json<Vec<Ride>>, AppError> {
    Ok(Json(app_state.employee_service.my_rides(&identity).await?))
}

#[utoipa::path(
    get,
    path = "/employees/me/reservations",
    tag = "Employees",
    responses((status = 200, description = "Reservas feitas", body = [Reservation])),
    security(("api_jwt" = []))
)]
pub async fn my_reservations(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
) -> Result<Json<Vec<Reservation>>, AppError> {
    Ok(Json(app_state.employee_service.my_reservations(&identity).await?))
}

#[utoipa::path(
    get,
    path = "/employees/me/history",
    tag = "Employees",
    responses((status = 200, description = "Linha do tempo (partida mais recente primeiro)", body = [HistoryItem])),
    security(("api_jwt" = []))
)]
pub async fn my_history(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
) -> Result<Json<Vec<HistoryItem>>, AppError> {
    Ok(Json(app_state.reporting_service.history(&identity).await?))
}
