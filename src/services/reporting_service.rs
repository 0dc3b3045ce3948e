// src/services/reporting_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{Datastore, ReservationRepository, RideRepository, StatsRepository},
    models::{
        auth::Identity,
        stats::{AdminStats, HistoryItem},
    },
};

#[derive(Clone)]
pub struct ReportingService {
    store: Arc<dyn Datastore>,
}

impl ReportingService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }

    /// Linha do tempo: caronas oferecidas + reservas feitas, partida mais recente primeiro.
    pub async fn history(&self, identity: &Identity) -> Result<Vec<HistoryItem>, AppError> {
        let mut uow = self.store.begin().await?;

        let mut items: Vec<HistoryItem> = uow
            .list_rides_by_driver(identity.employee_id)
            .await?
            .iter()
            .map(HistoryItem::driven)
            .collect();

        for reservation in uow.list_reservations_by_employee(identity.employee_id).await? {
            // A reserva sempre aponta para uma carona existente (FK em cascata)
            if let Some(ride) = uow.find_ride(reservation.ride_id).await? {
                items.push(HistoryItem::booked(
                    &ride,
                    reservation.id,
                    reservation.status,
                    reservation.seats_reserved,
                ));
            }
        }

        items.sort_by(|a, b| b.departure_time.cmp(&a.departure_time));
        Ok(items)
    }

    pub async fn platform_stats(&self) -> Result<AdminStats, AppError> {
        let mut uow = self.store.begin().await?;
        let counts = uow.platform_counts().await?;
        Ok(AdminStats::from(counts))
    }
}
