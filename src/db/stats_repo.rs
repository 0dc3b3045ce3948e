// src/db/stats_repo.rs

use async_trait::async_trait;

use crate::{common::error::AppError, db::pg_store::PgUnitOfWork, models::stats::PlatformCounts};

#[async_trait]
pub trait StatsRepository: Send {
    async fn platform_counts(&mut self) -> Result<PlatformCounts, AppError>;
}

#[async_trait]
impl StatsRepository for PgUnitOfWork {
    async fn platform_counts(&mut self) -> Result<PlatformCounts, AppError> {
        // Uma única query: todos os números saem do mesmo snapshot
        let counts = sqlx::query_as::<_, PlatformCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM employees) AS total_employees,
                (SELECT COUNT(*) FROM rides) AS total_rides,
                (SELECT COUNT(*) FROM rides WHERE status <> 'COMPLETED') AS active_rides,
                (SELECT COUNT(*) FROM rides WHERE status = 'COMPLETED') AS completed_rides,
                (SELECT COUNT(*) FROM reservations) AS total_reservations,
                (SELECT COUNT(*) FROM reservations WHERE status = 'PENDING') AS pending_reservations,
                (SELECT COUNT(*) FROM reservations WHERE status = 'CONFIRMED') AS confirmed_reservations,
                (SELECT COUNT(*) FROM reservations WHERE status = 'CANCELLED') AS cancelled_reservations,
                (
                    SELECT COALESCE(SUM(available_seats), 0)::BIGINT
                    FROM rides WHERE status <> 'COMPLETED'
                ) AS open_available_seats,
                (
                    SELECT COALESCE(SUM(r.seats_reserved), 0)::BIGINT
                    FROM reservations r
                    INNER JOIN rides ri ON ri.id = r.ride_id
                    WHERE r.status = 'CONFIRMED' AND ri.status <> 'COMPLETED'
                ) AS open_confirmed_seats
            "#,
        )
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(counts)
    }
}
