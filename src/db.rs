pub mod employee_repo;
pub use employee_repo::EmployeeRepository;
pub mod ride_repo;
pub use ride_repo::RideRepository;
pub mod reservation_repo;
pub use reservation_repo::ReservationRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
pub mod stats_repo;
pub use stats_repo::StatsRepository;

pub mod store;
pub use store::{Datastore, UnitOfWork};

pub mod pg_store;
pub use pg_store::PgDatastore;
pub mod memory;
pub use memory::MemoryDatastore;
