// src/models/reservation.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "reservation_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Rejected,
}

// Transições disparadas por atores externos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationAction {
    Approve,
    Reject,
    Cancel,
}

impl ReservationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
            ReservationStatus::Rejected => "REJECTED",
        }
    }

    /// PENDING ou CONFIRMED: conta para a regra de uma reserva ativa por (funcionário, carona).
    pub fn is_active(self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Confirmed)
    }

    /// Máquina de estados. Nenhum estado terminal reabre.
    pub fn apply(self, action: ReservationAction) -> Result<ReservationStatus, AppError> {
        use ReservationAction::*;
        use ReservationStatus::*;

        match (self, action) {
            (Pending, Approve) => Ok(Confirmed),
            (Pending, Reject) => Ok(Rejected),
            (Pending | Confirmed, Cancel) => Ok(Cancelled),
            (current, Approve) => Err(AppError::validation(format!(
                "Only PENDING reservations can be approved (current status: {})",
                current.as_str()
            ))),
            (current, Reject) => Err(AppError::validation(format!(
                "Only PENDING reservations can be rejected (current status: {})",
                current.as_str()
            ))),
            (current, Cancel) => Err(AppError::validation(format!(
                "Reservation is already {}",
                current.as_str()
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reservation {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub ride_id: Uuid,
    // Fixo desde a criação.
    #[schema(example = 1)]
    pub seats_reserved: i32,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn pending(employee_id: Uuid, ride_id: Uuid, seats_reserved: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            employee_id,
            ride_id,
            seats_reserved,
            status: ReservationStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Cadeiras já descontadas da carona (só reservas CONFIRMED).
    pub fn held_seats(&self) -> i32 {
        if self.status == ReservationStatus::Confirmed {
            self.seats_reserved
        } else {
            0
        }
    }

    /// Aplica a transição e devolve o status anterior.
    pub fn transition(&mut self, action: ReservationAction) -> Result<ReservationStatus, AppError> {
        let previous = self.status;
        self.status = previous.apply(action)?;
        self.updated_at = Utc::now();
        Ok(previous)
    }
}

fn default_seats() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReservationPayload {
    pub ride_id: Uuid,
    // Opcional; se vier, precisa ser o próprio funcionário autenticado.
    pub employee_id: Option<Uuid>,
    #[serde(default = "default_seats")]
    #[schema(example = 1, default = 1)]
    pub seats_reserved: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReservationAction::*;
    use ReservationStatus::*;

    #[test]
    fn pending_moves_forward() {
        assert_eq!(Pending.apply(Approve).unwrap(), Confirmed);
        assert_eq!(Pending.apply(Reject).unwrap(), Rejected);
        assert_eq!(Pending.apply(Cancel).unwrap(), Cancelled);
        assert_eq!(Confirmed.apply(Cancel).unwrap(), Cancelled);
    }

    #[test]
    fn terminal_and_repeated_actions_are_validation_errors() {
        let illegal = [
            (Confirmed, Approve),
            (Confirmed, Reject),
            (Cancelled, Approve),
            (Cancelled, Reject),
            (Cancelled, Cancel),
            (Rejected, Approve),
            (Rejected, Reject),
            (Rejected, Cancel),
        ];
        for (status, action) in illegal {
            let err = status.apply(action).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{status:?} + {action:?}");
        }
    }

    #[test]
    fn only_confirmed_holds_seats() {
        let mut reservation = Reservation::pending(Uuid::new_v4(), Uuid::new_v4(), 2);
        assert_eq!(reservation.held_seats(), 0);

        let previous = reservation.transition(Approve).unwrap();
        assert_eq!(previous, Pending);
        assert_eq!(reservation.held_seats(), 2);

        reservation.transition(Cancel).unwrap();
        assert_eq!(reservation.held_seats(), 0);
    }

    #[test]
    fn failed_transition_keeps_status() {
        let mut reservation = Reservation::pending(Uuid::new_v4(), Uuid::new_v4(), 1);
        reservation.transition(Reject).unwrap();
        assert!(reservation.transition(Approve).is_err());
        assert_eq!(reservation.status, Rejected);
    }

    #[test]
    fn seats_default_to_one() {
        let payload: CreateReservationPayload =
            serde_json::from_value(serde_json::json!({ "ride_id": Uuid::new_v4() })).unwrap();
        assert_eq!(payload.seats_reserved, 1);
        assert!(payload.employee_id.is_none());
    }
}
