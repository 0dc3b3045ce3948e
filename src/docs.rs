// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::common;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,
        handlers::auth::change_password,

        // --- Employees ---
        handlers::employees::list_employees,
        handlers::employees::get_profile,
        handlers::employees::update_profile,
        handlers::employees::my_rides,
        handlers::employees::my_reservations,
        handlers::employees::my_history,

        // --- Rides ---
        handlers::rides::create_ride,
        handlers::rides::list_rides,
        handlers::rides::get_ride,
        handlers::rides::update_ride,
        handlers::rides::delete_ride,
        handlers::rides::complete_ride,
        handlers::rides::ride_participants,

        // --- Reservations ---
        handlers::reservations::create_reservation,
        handlers::reservations::list_reservations,
        handlers::reservations::get_reservation,
        handlers::reservations::approve_reservation,
        handlers::reservations::reject_reservation,
        handlers::reservations::cancel_reservation,
        handlers::reservations::delete_reservation,

        // --- Notifications ---
        handlers::notifications::create_notification,
        handlers::notifications::list_notifications,
        handlers::notifications::mark_notification_read,
        handlers::notifications::delete_notification,

        // --- Admin ---
        handlers::admin::get_stats,
    ),
    components(
        schemas(
            common::error::ErrorCode,
            common::error::ErrorBody,

            // --- Auth ---
            models::auth::RegisterEmployeePayload,
            models::auth::LoginPayload,
            models::auth::ChangePasswordPayload,
            models::auth::AuthResponse,
            models::auth::MessageResponse,

            // --- Employees ---
            models::employee::Employee,
            models::employee::EmployeeProfile,
            models::employee::UpdateProfilePayload,

            // --- Rides ---
            models::ride::RideStatus,
            models::ride::Ride,
            models::ride::RideSort,
            models::ride::RidePage,
            models::ride::Participant,
            models::ride::CreateRidePayload,
            models::ride::UpdateRidePayload,

            // --- Reservations ---
            models::reservation::ReservationStatus,
            models::reservation::Reservation,
            models::reservation::CreateReservationPayload,

            // --- Notifications ---
            models::notification::NotificationKind,
            models::notification::Notification,
            models::notification::CreateNotificationPayload,

            // --- Reporting ---
            models::stats::AdminStats,
            models::stats::HistoryKind,
            models::stats::HistoryItem,
        )
    ),
    tags(
        (name = "Auth", description = "Registro, login e credenciais"),
        (name = "Employees", description = "Diretório e perfil do funcionário"),
        (name = "Rides", description = "Caronas oferecidas"),
        (name = "Reservations", description = "Pedidos de cadeira e ciclo de aprovação"),
        (name = "Notifications", description = "Avisos gerados pelas reservas"),
        (name = "Admin", description = "Indicadores da plataforma")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}
