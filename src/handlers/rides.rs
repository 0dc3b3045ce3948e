// src/handlers/rides.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use uuid::Uuid;

use crate::{
    common::{
        error::{AppError, ErrorBody},
        extract::{AppJson, AppPath, AppQuery},
    },
    config::AppState,
    middleware::auth::AuthenticatedEmployee,
    models::{
        auth::MessageResponse,
        ride::{CreateRidePayload, Participant, Ride, RideFilter, RideListQuery, RidePage, UpdateRidePayload},
    },
};

#[utoipa::path(
    post,
    path = "/rides/",
    tag = "Rides",
    request_body = CreateRidePayload,
    responses(
        (status = 201, description = "Carona criada (ACTIVE)", body = Ride),
        (status = 400, description = "Cadeiras <= 0 ou campos inválidos", body = ErrorBody),
        (status = 404, description = "Motorista não encontrado", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_ride(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
    AppJson(payload): AppJson<CreateRidePayload>,
) -> Result<impl IntoResponse, AppError> {
    let ride = app_state.ride_service.create_ride(&identity, payload).await?;
    Ok((StatusCode::CREATED, Json(ride)))
}

#[utoipa::path(
    get,
    path = "/rides/",
    tag = "Rides",
    params(RideListQuery),
    responses(
        (status = 200, description = "Página de caronas", body = RidePage),
        (status = 400, description = "page/per_page/data inválidos", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_rides(
    State(app_state): State<AppState>,
    _auth: AuthenticatedEmployee,
    AppQuery(query): AppQuery<RideListQuery>,
) -> Result<Json<RidePage>, AppError> {
    let filter = RideFilter::try_from(query)?;
    Ok(Json(app_state.ride_service.list_rides(filter).await?))
}

#[utoipa::path(
    get,
    path = "/rides/{id}",
    tag = "Rides",
    params(("id" = Uuid, Path, description = "ID da carona")),
    responses(
        (status = 200, description = "Carona", body = Ride),
        (status = 404, description = "Carona não encontrada", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_ride(
    State(app_state): State<AppState>,
    _auth: AuthenticatedEmployee,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Ride>, AppError> {
    Ok(Json(app_state.ride_service.get_ride(id).await?))
}

#[utoipa::path(
    put,
    path = "/rides/{id}",
    tag = "Rides",
    request_body = UpdateRidePayload,
    params(("id" = Uuid, Path, description = "ID da carona")),
    responses(
        (status = 200, description = "Carona atualizada", body = Ride),
        (status = 400, description = "Carona concluída ou cadeiras abaixo do confirmado", body = ErrorBody),
        (status = 403, description = "Não é o motorista", body = ErrorBody),
        (status = 404, description = "Carona não encontrada", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_ride(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateRidePayload>,
) -> Result<Json<Ride>, AppError> {
    Ok(Json(app_state.ride_service.update_ride(&identity, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/rides/{id}",
    tag = "Rides",
    params(("id" = Uuid, Path, description = "ID da carona")),
    responses(
        (status = 200, description = "Carona removida", body = MessageResponse),
        (status = 403, description = "Não é o motorista", body = ErrorBody),
        (status = 404, description = "Carona não encontrada", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_ride(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    app_state.ride_service.delete_ride(&identity, id).await?;
    Ok(Json(MessageResponse {
        message: "Ride deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    patch,
    path = "/rides/{id}/complete",
    tag = "Rides",
    params(("id" = Uuid, Path, description = "ID da carona")),
    responses(
        (status = 200, description = "Carona concluída", body = Ride),
        (status = 400, description = "Carona já concluída", body = ErrorBody),
        (status = 403, description = "Não é o motorista", body = ErrorBody),
        (status = 404, description = "Carona não encontrada", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_ride(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Ride>, AppError> {
    Ok(Json(app_state.ride_service.complete_ride(&identity, id).await?))
}

#[utoipa::path(
    get,
    path = "/rides/{id}/participants",
    tag = "Rides",
    params(("id" = Uuid, Path, description = "ID da carona")),
    responses(
        (status = 200, description = "Passageiros com reservas não canceladas", body = [Participant]),
        (status = 403, description = "Não é o motorista", body = ErrorBody),
        (status = 404, description = "Carona não encontrada", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn ride_participants(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Vec<Participant>>, AppError> {
    Ok(Json(app_state.ride_service.participants(&identity, id).await?))
}
