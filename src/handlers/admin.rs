// src/handlers/admin.rs

use axum::{extract::State, Json};

use crate::{
    common::error::{AppError, ErrorBody},
    config::AppState,
    middleware::auth::AuthenticatedEmployee,
    models::stats::AdminStats,
};

#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "Admin",
    responses(
        (status = 200, description = "Estatísticas da plataforma", body = AdminStats),
        (status = 401, description = "Não autenticado", body = ErrorBody)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    _auth: AuthenticatedEmployee,
) -> Result<Json<AdminStats>, AppError> {
    Ok(Json(app_state.reporting_service.platform_stats().await?))
}
