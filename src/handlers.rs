// src/handlers.rs

pub mod admin;
pub mod auth;
pub mod employees;
pub mod notifications;
pub mod reservations;
pub mod rides;
