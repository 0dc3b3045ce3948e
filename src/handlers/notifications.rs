// src/handlers/notifications.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{AppError, ErrorBody},
        extract::{AppJson, AppPath},
    },
    config::AppState,
    middleware::auth::AuthenticatedEmployee,
    models::{
        auth::MessageResponse,
        notification::{CreateNotificationPayload, Notification},
    },
};

#[utoipa::path(
    post,
    path = "/notifications/",
    tag = "Notifications",
    request_body = CreateNotificationPayload,
    responses(
        (status = 201, description = "Notificação criada", body = Notification),
        (status = 404, description = "Funcionário ou carona não encontrados", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_notification(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
    AppJson(payload): AppJson<CreateNotificationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let notification = app_state
        .notification_service
        .create_notification(&identity, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

// GET usa o id do funcionário; PATCH/DELETE usam o id da notificação
#[utoipa::path(
    get,
    path = "/notifications/{id}",
    tag = "Notifications",
    params(("id" = Uuid, Path, description = "ID do funcionário")),
    responses(
        (status = 200, description = "Notificações, mais recentes primeiro", body = [Notification]),
        (status = 403, description = "Não é o dono", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_notifications(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
    AppPath(employee_id): AppPath<Uuid>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = app_state
        .notification_service
        .list_for_employee(&identity, employee_id)
        .await?;
    Ok(Json(notifications))
}

#[utoipa::path(
    patch,
    path = "/notifications/{id}/read",
    tag = "Notifications",
    params(("id" = Uuid, Path, description = "ID da notificação")),
    responses(
        (status = 200, description = "Marcada como lida", body = Notification),
        (status = 403, description = "Não é o dono", body = ErrorBody),
        (status = 404, description = "Notificação não encontrada", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_notification_read(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Notification>, AppError> {
    Ok(Json(app_state.notification_service.mark_read(&identity, id).await?))
}

#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    tag = "Notifications",
    params(("id" = Uuid, Path, description = "ID da notificação")),
    responses(
        (status = 200, description = "Notificação removida", body = MessageResponse),
        (status = 403, description = "Não é o dono", body = ErrorBody),
        (status = 404, description = "Notificação não encontrada", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_notification(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(identity): AuthenticatedEmployee,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    app_state.notification_service.delete_notification(&identity, id).await?;
    Ok(Json(MessageResponse {
        message: "Notification deleted successfully".to_string(),
    }))
}
