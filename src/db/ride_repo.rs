// src/db/ride_repo.rs

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::pg_store::PgUnitOfWork,
    models::ride::{Ride, RideFilter, RideSort},
};

const RIDE_COLUMNS: &str = r#"
    id, driver_id, origin, destination, departure_time,
    available_seats, total_seats, status, created_at, updated_at
"#;

#[async_trait]
pub trait RideRepository: Send {
    async fn find_ride(&mut self, id: Uuid) -> Result<Option<Ride>, AppError>;

    // Mesma leitura, mas trava a linha até o fim da transação
    async fn find_ride_for_update(&mut self, id: Uuid) -> Result<Option<Ride>, AppError>;

    /// Página pedida + total de itens que casam com o filtro.
    async fn search_rides(&mut self, filter: &RideFilter) -> Result<(Vec<Ride>, i64), AppError>;

    // Ordenado por partida, mais recente primeiro
    async fn list_rides_by_driver(&mut self, driver_id: Uuid) -> Result<Vec<Ride>, AppError>;

    async fn insert_ride(&mut self, ride: &Ride) -> Result<(), AppError>;

    async fn update_ride(&mut self, ride: &Ride) -> Result<(), AppError>;

    /// Remove a carona, as reservas dela e desliga as notificações (ride_id = NULL).
    async fn delete_ride(&mut self, id: Uuid) -> Result<(), AppError>;
}

// Escapa os curingas do LIKE para que a busca seja por substring literal
pub(crate) fn like_pattern(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len() + 2);
    escaped.push('%');
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &RideFilter) {
    builder.push(" WHERE 1 = 1");

    if let Some(origin) = &filter.origin {
        builder.push(" AND origin ILIKE ").push_bind(like_pattern(origin));
    }
    if let Some(destination) = &filter.destination {
        builder.push(" AND destination ILIKE ").push_bind(like_pattern(destination));
    }
    if let Some(driver_id) = filter.driver_id {
        builder.push(" AND driver_id = ").push_bind(driver_id);
    }
    if let Some(from) = filter.date_from {
        builder.push(" AND departure_time >= ").push_bind(from);
    }
    if let Some(to) = filter.date_to {
        builder.push(" AND departure_time <= ").push_bind(to);
    }
}

#[async_trait]
impl RideRepository for PgUnitOfWork {
    async fn find_ride(&mut self, id: Uuid) -> Result<Option<Ride>, AppError> {
        let sql = format!("SELECT {RIDE_COLUMNS} FROM rides WHERE id = $1");
        let ride = sqlx::query_as::<_, Ride>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(ride)
    }

    async fn find_ride_for_update(&mut self, id: Uuid) -> Result<Option<Ride>, AppError> {
        // 'FOR UPDATE' bloqueia a linha: aprovações concorrentes na mesma
        // carona esperam aqui até o commit/rollback desta transação.
        let sql = format!("SELECT {RIDE_COLUMNS} FROM rides WHERE id = $1 FOR UPDATE");
        let ride = sqlx::query_as::<_, Ride>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(ride)
    }

    async fn search_rides(&mut self, filter: &RideFilter) -> Result<(Vec<Ride>, i64), AppError> {
        // 1. Total
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM rides");
        push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&mut *self.tx)
            .await?;

        // 2. Página
        let mut page = QueryBuilder::<Postgres>::new(format!("SELECT {RIDE_COLUMNS} FROM rides"));
        push_filters(&mut page, filter);
        page.push(match filter.sort {
            RideSort::DateAsc => " ORDER BY departure_time ASC, id ASC",
            RideSort::DateDesc => " ORDER BY departure_time DESC, id ASC",
        });
        page.push(" LIMIT ").push_bind(filter.per_page);
        page.push(" OFFSET ").push_bind(filter.offset());

        let items = page
            .build_query_as::<Ride>()
            .fetch_all(&mut *self.tx)
            .await?;

        Ok((items, total))
    }

    async fn list_rides_by_driver(&mut self, driver_id: Uuid) -> Result<Vec<Ride>, AppError> {
        let sql = format!(
            "SELECT {RIDE_COLUMNS} FROM rides WHERE driver_id = $1 ORDER BY departure_time DESC"
        );
        let rides = sqlx::query_as::<_, Ride>(&sql)
            .bind(driver_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rides)
    }

    async fn insert_ride(&mut self, ride: &Ride) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO rides (
                id, driver_id, origin, destination, departure_time,
                available_seats, total_seats, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
            .bind(ride.id)
            .bind(ride.driver_id)
            .bind(&ride.origin)
            .bind(&ride.destination)
            .bind(ride.departure_time)
            .bind(ride.available_seats)
            .bind(ride.total_seats)
            .bind(ride.status)
            .bind(ride.created_at)
            .bind(ride.updated_at)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn update_ride(&mut self, ride: &Ride) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE rides
            SET origin = $2, destination = $3, departure_time = $4,
                available_seats = $5, total_seats = $6, status = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
            .bind(ride.id)
            .bind(&ride.origin)
            .bind(&ride.destination)
            .bind(ride.departure_time)
            .bind(ride.available_seats)
            .bind(ride.total_seats)
            .bind(ride.status)
            .bind(ride.updated_at)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete_ride(&mut self, id: Uuid) -> Result<(), AppError> {
        // As FKs fazem o resto: reservas em CASCADE, notificações em SET NULL
        sqlx::query("DELETE FROM rides WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}
