// src/services/ride_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{Datastore, EmployeeRepository, ReservationRepository, RideRepository, UnitOfWork},
    models::{
        auth::Identity,
        ride::{CreateRidePayload, Participant, Ride, RideFilter, RidePage, UpdateRidePayload},
    },
    services::ride_locks::RideLocks,
};

fn required(value: String, field: &str) -> Result<String, AppError> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(value)
}

// Busca a carona já travada e garante que quem pede é o motorista (404 antes de 403)
async fn driver_ride(uow: &mut dyn UnitOfWork, identity: &Identity, ride_id: Uuid, action: &str) -> Result<Ride, AppError> {
    let ride = uow
        .find_ride_for_update(ride_id)
        .await?
        .ok_or_else(|| AppError::not_found("Ride not found"))?;

    if !ride.is_driver(identity.employee_id) {
        return Err(AppError::forbidden(format!("Only the driver can {action} this ride")));
    }
    Ok(ride)
}

#[derive(Clone)]
pub struct RideService {
    store: Arc<dyn Datastore>,
    locks: RideLocks,
}

impl RideService {
    pub fn new(store: Arc<dyn Datastore>, locks: RideLocks) -> Self {
        Self { store, locks }
    }

    pub async fn create_ride(&self, identity: &Identity, payload: CreateRidePayload) -> Result<Ride, AppError> {
        let origin = required(payload.origin, "origin")?;
        let destination = required(payload.destination, "destination")?;
        let ride = Ride::new(
            identity.employee_id,
            origin,
            destination,
            payload.departure_time,
            payload.available_seats,
        )?;

        let mut uow = self.store.begin().await?;
        if uow.find_employee(identity.employee_id).await?.is_none() {
            return Err(AppError::not_found("Driver not found"));
        }
        uow.insert_ride(&ride).await?;
        uow.commit().await?;

        tracing::info!(
            action = "RIDE_CREATED",
            employee_id = %identity.employee_id,
            ride_id = %ride.id,
            seats = ride.total_seats,
            "Carona criada"
        );
        Ok(ride)
    }

    pub async fn list_rides(&self, filter: RideFilter) -> Result<RidePage, AppError> {
        let mut uow = self.store.begin().await?;
        let (items, total) = uow.search_rides(&filter).await?;
        Ok(RidePage::new(items, &filter, total))
    }

    pub async fn get_ride(&self, ride_id: Uuid) -> Result<Ride, AppError> {
        let mut uow = self.store.begin().await?;
        uow.find_ride(ride_id)
            .await?
            .ok_or_else(|| AppError::not_found("Ride not found"))
    }

    /// Edição do motorista. Um novo `available_seats` é um evento de capacidade:
    /// corre sob a mesma trava das aprovações para não disputar com elas.
    pub async fn update_ride(
        &self,
        identity: &Identity,
        ride_id: Uuid,
        changes: UpdateRidePayload,
    ) -> Result<Ride, AppError> {
        let _guard = self.locks.acquire(ride_id).await?;
        let mut uow = self.store.begin().await?;
        let mut ride = driver_ride(&mut *uow, identity, ride_id, "update").await?;

        if ride.is_completed() {
            return Err(AppError::validation("Cannot update a completed ride"));
        }

        if let Some(origin) = changes.origin {
            ride.origin = required(origin, "origin")?;
        }
        if let Some(destination) = changes.destination {
            ride.destination = required(destination, "destination")?;
        }
        if let Some(departure_time) = changes.departure_time {
            ride.departure_time = departure_time;
        }
        if let Some(seats) = changes.available_seats {
            let confirmed = uow.confirmed_seats_for_ride(ride.id).await?;
            ride.set_available_seats(seats, confirmed)?;
        }
        ride.updated_at = chrono::Utc::now();

        uow.update_ride(&ride).await?;
        uow.commit().await?;

        tracing::info!(
            action = "RIDE_UPDATED",
            employee_id = %identity.employee_id,
            ride_id = %ride.id,
            available_seats = ride.available_seats,
            status = ride.status.as_str(),
            "Carona atualizada"
        );
        Ok(ride)
    }

    pub async fn complete_ride(&self, identity: &Identity, ride_id: Uuid) -> Result<Ride, AppError> {
        let _guard = self.locks.acquire(ride_id).await?;
        let mut uow = self.store.begin().await?;
        let mut ride = driver_ride(&mut *uow, identity, ride_id, "complete").await?;

        ride.complete()?;
        uow.update_ride(&ride).await?;
        uow.commit().await?;

        tracing::info!(
            action = "RIDE_COMPLETED",
            employee_id = %identity.employee_id,
            ride_id = %ride.id,
            "Carona concluída"
        );
        Ok(ride)
    }

    // Remove a carona e suas reservas; notificações ficam, sem a referência
    pub async fn delete_ride(&self, identity: &Identity, ride_id: Uuid) -> Result<(), AppError> {
        let _guard = self.locks.acquire(ride_id).await?;
        let mut uow = self.store.begin().await?;
        let ride = driver_ride(&mut *uow, identity, ride_id, "delete").await?;

        uow.delete_ride(ride.id).await?;
        uow.commit().await?;

        tracing::info!(
            action = "RIDE_DELETED",
            employee_id = %identity.employee_id,
            ride_id = %ride_id,
            "Carona removida"
        );
        Ok(())
    }

    pub async fn participants(&self, identity: &Identity, ride_id: Uuid) -> Result<Vec<Participant>, AppError> {
        let mut uow = self.store.begin().await?;
        let ride = uow
            .find_ride(ride_id)
            .await?
            .ok_or_else(|| AppError::not_found("Ride not found"))?;

        if !ride.is_driver(identity.employee_id) {
            return Err(AppError::forbidden("Only the driver can view participants"));
        }
        uow.list_participants(ride.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::MemoryDatastore,
        models::{
            employee::Employee,
            reservation::{Reservation, ReservationAction},
            ride::RideStatus,
        },
    };
    use chrono::{TimeZone, Utc};

    struct Fixture {
        store: Arc<MemoryDatastore>,
        locks: RideLocks,
        rides: RideService,
        driver: Identity,
    }

    fn identity(employee: &Employee) -> Identity {
        Identity {
            employee_id: employee.id,
            email: employee.email.clone(),
            name: employee.name.clone(),
            department: employee.department.clone(),
        }
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryDatastore::new());
        let driver = Employee::new("Carla".into(), "carla@x.pt".into(), "Ops".into(), "h".into());
        let mut uow = store.begin().await.unwrap();
        uow.insert_employee(&driver).await.unwrap();
        uow.commit().await.unwrap();

        let locks = RideLocks::new();
        Fixture {
            rides: RideService::new(store.clone(), locks.clone()),
            locks,
            store,
            driver: identity(&driver),
        }
    }

    fn payload(seats: i32) -> CreateRidePayload {
        CreateRidePayload {
            origin: "Lisboa".into(),
            destination: "Porto".into(),
            departure_time: Utc.with_ymd_and_hms(2026, 2, 10, 8, 30, 0).unwrap(),
            available_seats: seats,
        }
    }

    // Insere uma reserva já confirmada, descontando as cadeiras da carona
    async fn confirm_seats(store: &MemoryDatastore, ride_id: Uuid, seats: i32) {
        let rider = Employee::new("Rui".into(), format!("{}@x.pt", Uuid::new_v4()), "Eng".into(), "h".into());
        let mut uow = store.begin().await.unwrap();
        uow.insert_employee(&rider).await.unwrap();
        let mut ride = uow.find_ride(ride_id).await.unwrap().unwrap();
        let mut reservation = Reservation::pending(rider.id, ride_id, seats);
        reservation.transition(ReservationAction::Approve).unwrap();
        ride.take_seats(seats).unwrap();
        uow.update_ride(&ride).await.unwrap();
        uow.insert_reservation(&reservation).await.unwrap();
        uow.commit().await.unwrap();
    }

    #[tokio::test]
    async fn create_requires_positive_seats_and_known_driver() {
        let f = fixture().await;
        assert!(matches!(
            f.rides.create_ride(&f.driver, payload(0)).await,
            Err(AppError::Validation(_))
        ));

        let ghost = Identity { employee_id: Uuid::new_v4(), ..f.driver.clone() };
        assert!(matches!(
            f.rides.create_ride(&ghost, payload(2)).await,
            Err(AppError::NotFound(_))
        ));

        let ride = f.rides.create_ride(&f.driver, payload(3)).await.unwrap();
        assert_eq!((ride.available_seats, ride.total_seats, ride.status), (3, 3, RideStatus::Active));
    }

    #[tokio::test]
    async fn only_driver_mutates() {
        let f = fixture().await;
        let ride = f.rides.create_ride(&f.driver, payload(3)).await.unwrap();
        let stranger = Identity { employee_id: Uuid::new_v4(), ..f.driver.clone() };

        let changes = UpdateRidePayload { origin: Some("Sintra".into()), ..Default::default() };
        assert!(matches!(
            f.rides.update_ride(&stranger, ride.id, changes).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(f.rides.complete_ride(&stranger, ride.id).await, Err(AppError::Forbidden(_))));
        assert!(matches!(f.rides.delete_ride(&stranger, ride.id).await, Err(AppError::Forbidden(_))));
        assert!(matches!(f.rides.participants(&stranger, ride.id).await, Err(AppError::Forbidden(_))));

        assert_eq!(f.rides.get_ride(ride.id).await.unwrap().origin, "Lisboa");
    }

    #[tokio::test]
    async fn capacity_update_keeps_invariant() {
        let f = fixture().await;
        let ride = f.rides.create_ride(&f.driver, payload(3)).await.unwrap();
        confirm_seats(&f.store, ride.id, 3).await;
        assert_eq!(f.rides.get_ride(ride.id).await.unwrap().status, RideStatus::Full);

        // Valor negativo: recusado e nada muda
        let negative = UpdateRidePayload { available_seats: Some(-1), ..Default::default() };
        assert!(matches!(
            f.rides.update_ride(&f.driver, ride.id, negative).await,
            Err(AppError::Validation(_))
        ));

        let huge = UpdateRidePayload { available_seats: Some(i32::MAX), ..Default::default() };
        assert!(matches!(
            f.rides.update_ride(&f.driver, ride.id, huge).await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(f.rides.get_ride(ride.id).await.unwrap().total_seats, 3);

        let raise = UpdateRidePayload { available_seats: Some(5), ..Default::default() };
        let updated = f.rides.update_ride(&f.driver, ride.id, raise).await.unwrap();
        assert_eq!(updated.available_seats, 5);
        assert_eq!(updated.total_seats, 8);
        assert_eq!(updated.status, RideStatus::Active);
    }

    #[tokio::test]
    async fn completed_ride_is_terminal() {
        let f = fixture().await;
        let ride = f.rides.create_ride(&f.driver, payload(2)).await.unwrap();

        let done = f.rides.complete_ride(&f.driver, ride.id).await.unwrap();
        assert_eq!(done.status, RideStatus::Completed);

        assert!(matches!(f.rides.complete_ride(&f.driver, ride.id).await, Err(AppError::Validation(_))));
        let changes = UpdateRidePayload { destination: Some("Braga".into()), ..Default::default() };
        assert!(matches!(
            f.rides.update_ride(&f.driver, ride.id, changes).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn delete_removes_ride_and_missing_is_not_found() {
        let f = fixture().await;
        let ride = f.rides.create_ride(&f.driver, payload(2)).await.unwrap();
        f.rides.delete_ride(&f.driver, ride.id).await.unwrap();

        assert!(matches!(f.rides.get_ride(ride.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(f.rides.delete_ride(&f.driver, ride.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn unknown_rides_leave_no_lock_entries() {
        let f = fixture().await;
        for _ in 0..50 {
            let changes = UpdateRidePayload { origin: Some("Sintra".into()), ..Default::default() };
            assert!(matches!(
                f.rides.update_ride(&f.driver, Uuid::new_v4(), changes).await,
                Err(AppError::NotFound(_))
            ));
            assert!(matches!(
                f.rides.complete_ride(&f.driver, Uuid::new_v4()).await,
                Err(AppError::NotFound(_))
            ));
            assert!(matches!(
                f.rides.delete_ride(&f.driver, Uuid::new_v4()).await,
                Err(AppError::NotFound(_))
            ));
        }
        assert_eq!(f.locks.tracked(), 0);

        let ride = f.rides.create_ride(&f.driver, payload(2)).await.unwrap();
        f.rides.complete_ride(&f.driver, ride.id).await.unwrap();
        f.rides.delete_ride(&f.driver, ride.id).await.unwrap();
        assert_eq!(f.locks.tracked(), 0);
    }
}
