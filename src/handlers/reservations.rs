// src/handlers/reservations.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use uuid::Uuid;

use crate::{
    common::{
        error::{AppError, ErrorBody},
        extract::{AppJson, AppPath},
    },
    config::AppState,
    middleware::auth::AuthenticatedEmployee,
    models::{
        auth::MessageResponse,
        reservation::{CreateReservationPayload, Reservation},
    },
};

#[utoipa::path(
    post,
    path = "/reservations/",
    tag = "Reservations",
    request_body = CreateReservationPayload,
    responses(
        (status = 201, description = "Reserva criada (PENDING)", body = Reservation),
        (status = 400, description = "Cadeiras inválidas, carona cheia/concluída ou reserva duplicada", body = ErrorBody),
        (status = 403, description = "employee_id diferente do autenticado", body = ErrorBody),
        (status = 404, description = "Carona não encontrada", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_reservation(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
    AppJson(payload): AppJson<CreateReservationPayload>,
) -> Result<impl IntoResponse, AppError> {
    let reservation = app_state
        .reservation_service
        .create_reservation(&identity, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

#[utoipa::path(
    get,
    path = "/reservations/",
    tag = "Reservations",
    responses((status = 200, description = "Todas as reservas", body = [Reservation])),
    security(("api_jwt" = []))
)]
pub async fn list_reservations(
    State(app_state): State<AppState>,
    _auth: AuthenticatedEmployee,
) -> Result<Json<Vec<Reservation>>, AppError> {
    Ok(Json(app_state.reservation_service.list_reservations().await?))
}

#[utoipa::path(
    get,
    path = "/reservations/{id}",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Reserva", body = Reservation),
        (status = 403, description = "Nem passageiro nem motorista", body = ErrorBody),
        (status = 404, description = "Reserva não encontrada", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_reservation(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    Ok(Json(app_state.reservation_service.get_reservation(&identity, id).await?))
}

#[utoipa::path(
    patch,
    path = "/reservations/{id}/approve",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Reserva confirmada; cadeiras descontadas", body = Reservation),
        (status = 400, description = "Não está PENDING ou sem cadeiras suficientes", body = ErrorBody),
        (status = 403, description = "Não é o motorista", body = ErrorBody),
        (status = 404, description = "Reserva não encontrada", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_reservation(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    Ok(Json(app_state.reservation_service.approve(&identity, id).await?))
}

#[utoipa::path(
    patch,
    path = "/reservations/{id}/reject",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Reserva rejeitada", body = Reservation),
        (status = 400, description = "Não está PENDING", body = ErrorBody),
        (status = 403, description = "Não é o motorista", body = ErrorBody),
        (status = 404, description = "Reserva não encontrada", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_reservation(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    Ok(Json(app_state.reservation_service.reject(&identity, id).await?))
}

#[utoipa::path(
    post,
    path = "/reservations/{id}/cancel",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Reserva cancelada; cadeiras devolvidas se estava CONFIRMED", body = Reservation),
        (status = 400, description = "Já está em estado terminal", body = ErrorBody),
        (status = 403, description = "Não é quem fez a reserva", body = ErrorBody),
        (status = 404, description = "Reserva não encontrada", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_reservation(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    Ok(Json(app_state.reservation_service.cancel(&identity, id).await?))
}

#[utoipa::path(
    delete,
    path = "/reservations/{id}",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Reserva removida", body = MessageResponse),
        (status = 403, description = "Nem passageiro nem motorista", body = ErrorBody),
        (status = 404, description = "Reserva não encontrada", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_reservation(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    app_state.reservation_service.delete_reservation(&identity, id).await?;
    Ok(Json(MessageResponse {
        message: "Reservation deleted successfully".to_string(),
    }))
}
