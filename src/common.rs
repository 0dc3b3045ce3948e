pub mod datetime;
pub mod error;
pub mod extract;
