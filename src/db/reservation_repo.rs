// src/db/reservation_repo.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::pg_store::PgUnitOfWork,
    models::{reservation::Reservation, ride::Participant},
};

const RESERVATION_COLUMNS: &str =
    "id, employee_id, ride_id, seats_reserved, status, created_at, updated_at";

#[async_trait]
pub trait ReservationRepository: Send {
    async fn find_reservation(&mut self, id: Uuid) -> Result<Option<Reservation>, AppError>;

    // Mais recentes primeiro
    async fn list_reservations(&mut self) -> Result<Vec<Reservation>, AppError>;

    async fn list_reservations_by_employee(&mut self, employee_id: Uuid) -> Result<Vec<Reservation>, AppError>;

    /// Reserva PENDING ou CONFIRMED do par (funcionário, carona), se houver.
    async fn find_active_reservation(
        &mut self,
        employee_id: Uuid,
        ride_id: Uuid,
    ) -> Result<Option<Reservation>, AppError>;

    /// Σ seats_reserved das reservas CONFIRMED da carona.
    async fn confirmed_seats_for_ride(&mut self, ride_id: Uuid) -> Result<i32, AppError>;

    /// Reservas não canceladas da carona com os dados do passageiro.
    async fn list_participants(&mut self, ride_id: Uuid) -> Result<Vec<Participant>, AppError>;

    async fn insert_reservation(&mut self, reservation: &Reservation) -> Result<(), AppError>;

    async fn update_reservation(&mut self, reservation: &Reservation) -> Result<(), AppError>;

    async fn delete_reservation(&mut self, id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
impl ReservationRepository for PgUnitOfWork {
    async fn find_reservation(&mut self, id: Uuid) -> Result<Option<Reservation>, AppError> {
        let sql = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1");
        let reservation = sqlx::query_as::<_, Reservation>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(reservation)
    }

    async fn list_reservations(&mut self) -> Result<Vec<Reservation>, AppError> {
        let sql = format!("SELECT {RESERVATION_COLUMNS} FROM reservations ORDER BY created_at DESC");
        let reservations = sqlx::query_as::<_, Reservation>(&sql)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(reservations)
    }

    async fn list_reservations_by_employee(&mut self, employee_id: Uuid) -> Result<Vec<Reservation>, AppError> {
        let sql = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE employee_id = $1 ORDER BY created_at DESC"
        );
        let reservations = sqlx::query_as::<_, Reservation>(&sql)
            .bind(employee_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(reservations)
    }

    async fn find_active_reservation(
        &mut self,
        employee_id: Uuid,
        ride_id: Uuid,
    ) -> Result<Option<Reservation>, AppError> {
        let sql = format!(
            r#"
            SELECT {RESERVATION_COLUMNS} FROM reservations
            WHERE employee_id = $1 AND ride_id = $2 AND status IN ('PENDING', 'CONFIRMED')
            "#
        );
        let reservation = sqlx::query_as::<_, Reservation>(&sql)
            .bind(employee_id)
            .bind(ride_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(reservation)
    }

    async fn confirmed_seats_for_ride(&mut self, ride_id: Uuid) -> Result<i32, AppError> {
        // SUM de INT4 volta BIGINT no Postgres
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(seats_reserved), 0)::BIGINT
            FROM reservations
            WHERE ride_id = $1 AND status = 'CONFIRMED'
            "#,
        )
            .bind(ride_id)
            .fetch_one(&mut *self.tx)
            .await?;

        i32::try_from(total).map_err(|e| AppError::InternalServerError(e.into()))
    }

    async fn list_participants(&mut self, ride_id: Uuid) -> Result<Vec<Participant>, AppError> {
        let participants = sqlx::query_as::<_, Participant>(
            r#"
            SELECT
                e.id AS employee_id,
                e.name,
                e.email,
                r.seats_reserved,
                r.status AS reservation_status
            FROM reservations r
            INNER JOIN employees e ON e.id = r.employee_id
            WHERE r.ride_id = $1 AND r.status <> 'CANCELLED'
            ORDER BY r.created_at ASC
            "#,
        )
            .bind(ride_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(participants)
    }

    async fn insert_reservation(&mut self, reservation: &Reservation) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO reservations (id, employee_id, ride_id, seats_reserved, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
            .bind(reservation.id)
            .bind(reservation.employee_id)
            .bind(reservation.ride_id)
            .bind(reservation.seats_reserved)
            .bind(reservation.status)
            .bind(reservation.created_at)
            .bind(reservation.updated_at)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::Conflict(
                            "You already have an active reservation for this ride".to_string(),
                        );
                    }
                }
                AppError::DatabaseError(e)
            })?;
        Ok(())
    }

    async fn update_reservation(&mut self, reservation: &Reservation) -> Result<(), AppError> {
        sqlx::query("UPDATE reservations SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(reservation.id)
            .bind(reservation.status)
            .bind(reservation.updated_at)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete_reservation(&mut self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}
