// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::{AppConfig, AppState};

use crate::middleware::auth::auth_guard;

// Monta o router completo; usado pelo main e pelos testes de integração
pub fn app(app_state: AppState) -> Router {
    // Rotas públicas
    let public_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login));

    // Rotas protegidas pelo middleware (Bearer obrigatório).
    // Coleções respondem com e sem a barra final.
    let protected_routes = Router::new()
        .route("/auth/me", get(handlers::auth::get_me))
        .route("/auth/change-password", post(handlers::auth::change_password))
        // --- Employees ---
        .route("/employees", get(handlers::employees::list_employees))
        .route("/employees/", get(handlers::employees::list_employees))
        .route(
            "/employees/me",
            get(handlers::employees::get_profile).patch(handlers::employees::update_profile),
        )
        .route("/employees/me/rides", get(handlers::employees::my_rides))
        .route("/employees/me/reservations", get(handlers::employees::my_reservations))
        .route("/employees/me/history", get(handlers::employees::my_history))
        // --- Rides ---
        .route(
            "/rides",
            post(handlers::rides::create_ride).get(handlers::rides::list_rides),
        )
        .route(
            "/rides/",
            post(handlers::rides::create_ride).get(handlers::rides::list_rides),
        )
        .route(
            "/rides/{id}",
            get(handlers::rides::get_ride)
                .put(handlers::rides::update_ride)
                .delete(handlers::rides::delete_ride),
        )
        .route("/rides/{id}/complete", patch(handlers::rides::complete_ride))
        .route("/rides/{id}/participants", get(handlers::rides::ride_participants))
        // --- Reservations ---
        .route(
            "/reservations",
            post(handlers::reservations::create_reservation).get(handlers::reservations::list_reservations),
        )
        .route(
            "/reservations/",
            post(handlers::reservations::create_reservation).get(handlers::reservations::list_reservations),
        )
        .route(
            "/reservations/{id}",
            get(handlers::reservations::get_reservation).delete(handlers::reservations::delete_reservation),
        )
        .route("/reservations/{id}/approve", patch(handlers::reservations::approve_reservation))
        .route("/reservations/{id}/reject", patch(handlers::reservations::reject_reservation))
        .route("/reservations/{id}/cancel", post(handlers::reservations::cancel_reservation))
        // --- Notifications ---
        .route("/notifications", post(handlers::notifications::create_notification))
        .route("/notifications/", post(handlers::notifications::create_notification))
        .route(
            "/notifications/{id}",
            get(handlers::notifications::list_notifications).delete(handlers::notifications::delete_notification),
        )
        .route("/notifications/{id}/read", patch(handlers::notifications::mark_notification_read))
        // --- Admin ---
        .route("/admin/stats", get(handlers::admin::get_stats))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
