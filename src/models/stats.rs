// src/models/stats.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{
    reservation::ReservationStatus,
    ride::{Ride, RideStatus},
};

// Contagens brutas vindas do repositório (uma "foto" consistente)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct PlatformCounts {
    pub total_employees: i64,
    pub total_rides: i64,
    pub active_rides: i64,
    pub completed_rides: i64,
    pub total_reservations: i64,
    pub pending_reservations: i64,
    pub confirmed_reservations: i64,
    pub cancelled_reservations: i64,
    // Somente caronas não COMPLETED
    pub open_available_seats: i64,
    pub open_confirmed_seats: i64,
}

impl PlatformCounts {
    /// confirmadas / (confirmadas + livres) * 100, em 2 casas; 0 sem denominador.
    pub fn occupancy_rate(&self) -> Decimal {
        let denominator = self.open_confirmed_seats + self.open_available_seats;
        if denominator == 0 {
            return Decimal::ZERO;
        }

        (Decimal::from(self.open_confirmed_seats) * Decimal::ONE_HUNDRED / Decimal::from(denominator))
            .round_dp(2)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStats {
    pub total_employees: i64,
    pub total_rides: i64,
    pub active_rides: i64,
    pub completed_rides: i64,
    pub total_reservations: i64,
    pub pending_reservations: i64,
    pub confirmed_reservations: i64,
    pub cancelled_reservations: i64,
    #[schema(value_type = f64, example = 66.67)]
    pub average_occupancy_rate: Decimal,
}

impl From<PlatformCounts> for AdminStats {
    fn from(counts: PlatformCounts) -> Self {
        Self {
            total_employees: counts.total_employees,
            total_rides: counts.total_rides,
            active_rides: counts.active_rides,
            completed_rides: counts.completed_rides,
            total_reservations: counts.total_reservations,
            pending_reservations: counts.pending_reservations,
            confirmed_reservations: counts.confirmed_reservations,
            cancelled_reservations: counts.cancelled_reservations,
            average_occupancy_rate: counts.occupancy_rate(),
        }
    }
}

// --- Linha do tempo do funcionário ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryKind {
    DriverRide,
    Reservation,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistoryItem {
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    pub ride_id: Uuid,
    pub reservation_id: Option<Uuid>,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub status: RideStatus,
    pub reservation_status: Option<ReservationStatus>,
    pub seats_reserved: Option<i32>,
}

impl HistoryItem {
    pub fn driven(ride: &Ride) -> Self {
        Self {
            kind: HistoryKind::DriverRide,
            ride_id: ride.id,
            reservation_id: None,
            origin: ride.origin.clone(),
            destination: ride.destination.clone(),
            departure_time: ride.departure_time,
            status: ride.status,
            reservation_status: None,
            seats_reserved: None,
        }
    }

    pub fn booked(ride: &Ride, reservation_id: Uuid, status: ReservationStatus, seats: i32) -> Self {
        Self {
            kind: HistoryKind::Reservation,
            reservation_id: Some(reservation_id),
            reservation_status: Some(status),
            seats_reserved: Some(seats),
            ..Self::driven(ride)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn occupancy_is_zero_without_seats() {
        assert_eq!(PlatformCounts::default().occupancy_rate(), Decimal::ZERO);
    }

    #[test]
    fn occupancy_rounds_to_two_places() {
        let counts = PlatformCounts { open_confirmed_seats: 2, open_available_seats: 1, ..Default::default() };
        assert_eq!(counts.occupancy_rate(), Decimal::from_str("66.67").unwrap());

        let full = PlatformCounts { open_confirmed_seats: 4, open_available_seats: 0, ..Default::default() };
        assert_eq!(full.occupancy_rate(), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn rate_serializes_as_number() {
        let stats = AdminStats::from(PlatformCounts {
            open_confirmed_seats: 1,
            open_available_seats: 3,
            ..Default::default()
        });
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["average_occupancy_rate"], serde_json::json!(25.0));
    }
}
