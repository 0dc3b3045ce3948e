pub mod auth;
pub mod employee;
pub mod notification;
pub mod reservation;
pub mod ride;
pub mod stats;
