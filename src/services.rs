pub mod auth;
pub mod employee_service;
pub mod notification_service;
pub mod reporting_service;
pub mod reservation_service;
pub mod ride_locks;
pub mod ride_service;
