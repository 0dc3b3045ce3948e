// src/services/reservation_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{Datastore, EmployeeRepository, NotificationRepository, ReservationRepository, RideRepository},
    models::{
        auth::Identity,
        reservation::{CreateReservationPayload, Reservation, ReservationAction, ReservationStatus},
    },
    services::{notification_service as notify, ride_locks::RideLocks},
};

// O motor de reservas.
//
// Toda transição segue o mesmo roteiro:
//   1. trava a carona (RideLocks)
//   2. abre a unidade de trabalho e relê reserva + carona (FOR UPDATE no Postgres)
//   3. valida: 404, depois 403, depois estado/capacidade
//   4. escreve reserva, contadores da carona e notificações
//   5. commit
// Qualquer `?` entre 2 e 5 descarta a unidade de trabalho inteira.
#[derive(Clone)]
pub struct ReservationService {
    store: Arc<dyn Datastore>,
    locks: RideLocks,
}

impl ReservationService {
    pub fn new(store: Arc<dyn Datastore>, locks: RideLocks) -> Self {
        Self { store, locks }
    }

    pub async fn create_reservation(
        &self,
        identity: &Identity,
        payload: CreateReservationPayload,
    ) -> Result<Reservation, AppError> {
        if payload.seats_reserved <= 0 {
            return Err(AppError::validation("seats_reserved must be greater than 0"));
        }

        let _guard = self.locks.acquire(payload.ride_id).await?;
        let mut uow = self.store.begin().await?;

        // 1. Existência
        let ride = uow
            .find_ride_for_update(payload.ride_id)
            .await?
            .ok_or_else(|| AppError::not_found("Ride not found"))?;
        let rider = uow
            .find_employee(identity.employee_id)
            .await?
            .ok_or_else(|| AppError::not_found("Employee not found"))?;

        // 2. Permissão: só se reserva para si mesmo
        if payload.employee_id.is_some_and(|id| id != rider.id) {
            return Err(AppError::forbidden("You can only create reservations for yourself"));
        }

        // 3. Estado e capacidade (nenhuma cadeira é descontada aqui)
        if ride.is_driver(rider.id) {
            return Err(AppError::validation("You cannot reserve a seat on your own ride"));
        }
        ride.ensure_bookable(payload.seats_reserved)?;
        if uow.find_active_reservation(rider.id, ride.id).await?.is_some() {
            return Err(AppError::validation("You already have an active reservation for this ride"));
        }

        // 4. Escritas
        let reservation = Reservation::pending(rider.id, ride.id, payload.seats_reserved);
        uow.insert_reservation(&reservation).await?;
        uow.insert_notification(&notify::request_pending(rider.id, &ride)).await?;
        uow.insert_notification(&notify::new_request(&ride, &rider.name, reservation.seats_reserved))
            .await?;

        // 5. Commit
        uow.commit().await?;

        tracing::info!(
            action = "RESERVATION_REQUESTED",
            employee_id = %rider.id,
            reservation_id = %reservation.id,
            ride_id = %ride.id,
            seats = reservation.seats_reserved,
            "Reserva solicitada"
        );
        Ok(reservation)
    }

    pub async fn list_reservations(&self) -> Result<Vec<Reservation>, AppError> {
        let mut uow = self.store.begin().await?;
        uow.list_reservations().await
    }

    // Visível ao passageiro e ao motorista da carona
    pub async fn get_reservation(&self, identity: &Identity, id: Uuid) -> Result<Reservation, AppError> {
        let mut uow = self.store.begin().await?;
        let reservation = uow
            .find_reservation(id)
            .await?
            .ok_or_else(|| AppError::not_found("Reservation not found"))?;
        let ride = uow
            .find_ride(reservation.ride_id)
            .await?
            .ok_or_else(|| AppError::not_found("Ride not found"))?;

        if reservation.employee_id != identity.employee_id && !ride.is_driver(identity.employee_id) {
            return Err(AppError::forbidden("You are not allowed to view this reservation"));
        }
        Ok(reservation)
    }

    pub async fn approve(&self, identity: &Identity, id: Uuid) -> Result<Reservation, AppError> {
        self.transition(identity, id, ReservationAction::Approve).await
    }

    pub async fn reject(&self, identity: &Identity, id: Uuid) -> Result<Reservation, AppError> {
        self.transition(identity, id, ReservationAction::Reject).await
    }

    pub async fn cancel(&self, identity: &Identity, id: Uuid) -> Result<Reservation, AppError> {
        self.transition(identity, id, ReservationAction::Cancel).await
    }

    /// Exclusão administrativa: ignora a máquina de estados, mas devolve as
    /// cadeiras se a reserva estava CONFIRMED.
    pub async fn delete_reservation(&self, identity: &Identity, id: Uuid) -> Result<(), AppError> {
        let ride_id = self.ride_of(id).await?;
        let _guard = self.locks.acquire(ride_id).await?;
        let mut uow = self.store.begin().await?;

        let reservation = uow
            .find_reservation(id)
            .await?
            .ok_or_else(|| AppError::not_found("Reservation not found"))?;
        let mut ride = uow
            .find_ride_for_update(reservation.ride_id)
            .await?
            .ok_or_else(|| AppError::not_found("Ride not found"))?;

        if reservation.employee_id != identity.employee_id && !ride.is_driver(identity.employee_id) {
            return Err(AppError::forbidden("You are not allowed to delete this reservation"));
        }

        let held = reservation.held_seats();
        if held > 0 {
            ride.release_seats(held);
            uow.update_ride(&ride).await?;
        }
        uow.delete_reservation(reservation.id).await?;
        uow.commit().await?;

        tracing::info!(
            action = "RESERVATION_DELETED",
            employee_id = %identity.employee_id,
            reservation_id = %id,
            ride_id = %ride.id,
            seats_restored = held,
            "Reserva removida"
        );
        Ok(())
    }

    // Leitura sem trava só para descobrir qual carona travar
    async fn ride_of(&self, reservation_id: Uuid) -> Result<Uuid, AppError> {
        let mut uow = self.store.begin().await?;
        uow.find_reservation(reservation_id)
            .await?
            .map(|r| r.ride_id)
            .ok_or_else(|| AppError::not_found("Reservation not found"))
    }

    async fn transition(
        &self,
        identity: &Identity,
        id: Uuid,
        action: ReservationAction,
    ) -> Result<Reservation, AppError> {
        let ride_id = self.ride_of(id).await?;
        let _guard = self.locks.acquire(ride_id).await?;
        let mut uow = self.store.begin().await?;

        // 1. Releitura sob a trava
        let mut reservation = uow
            .find_reservation(id)
            .await?
            .ok_or_else(|| AppError::not_found("Reservation not found"))?;
        let mut ride = uow
            .find_ride_for_update(reservation.ride_id)
            .await?
            .ok_or_else(|| AppError::not_found("Ride not found"))?;

        // 2. Permissão
        match action {
            ReservationAction::Approve | ReservationAction::Reject if !ride.is_driver(identity.employee_id) => {
                return Err(AppError::forbidden("Only the driver can approve or reject reservations"));
            }
            ReservationAction::Cancel if reservation.employee_id != identity.employee_id => {
                return Err(AppError::forbidden("Only the passenger who made the reservation can cancel it"));
            }
            _ => {}
        }

        // 3. Máquina de estados + contadores da carona
        let previous = reservation.transition(action)?;
        let notification = match action {
            ReservationAction::Approve => {
                // Recheca a capacidade: outras aprovações podem ter acontecido
                ride.take_seats(reservation.seats_reserved)?;
                uow.update_ride(&ride).await?;
                notify::approved(reservation.employee_id, &ride)
            }
            ReservationAction::Reject => notify::rejected(reservation.employee_id, &ride),
            ReservationAction::Cancel => {
                if previous == ReservationStatus::Confirmed {
                    ride.release_seats(reservation.seats_reserved);
                    uow.update_ride(&ride).await?;
                }
                // Nome atual do diretório, não o do token
                let rider_name = uow
                    .find_employee(reservation.employee_id)
                    .await?
                    .map(|rider| rider.name)
                    .unwrap_or_else(|| identity.name.clone());
                notify::cancelled(&ride, &rider_name, reservation.seats_reserved)
            }
        };

        // 4. Escritas + commit
        uow.update_reservation(&reservation).await?;
        uow.insert_notification(&notification).await?;
        uow.commit().await?;

        tracing::info!(
            action = action_tag(action),
            employee_id = %identity.employee_id,
            reservation_id = %reservation.id,
            ride_id = %ride.id,
            from = previous.as_str(),
            to = reservation.status.as_str(),
            available_seats = ride.available_seats,
            "Transição de reserva"
        );
        Ok(reservation)
    }
}

fn action_tag(action: ReservationAction) -> &'static str {
    match action {
        ReservationAction::Approve => "RESERVATION_APPROVED",
        ReservationAction::Reject => "RESERVATION_REJECTED",
        ReservationAction::Cancel => "RESERVATION_CANCELLED",
    }
}
