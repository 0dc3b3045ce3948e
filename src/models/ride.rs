// src/models/ride.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::common::{datetime, error::AppError};
use crate::models::reservation::ReservationStatus;

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "ride_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    Active,
    Full,
    Completed,
}

impl RideStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RideStatus::Active => "ACTIVE",
            RideStatus::Full => "FULL",
            RideStatus::Completed => "COMPLETED",
        }
    }
}

// ---
// Ride (a "Carona")
// ---
// `total_seats` é a capacidade no último evento que a definiu (criação ou PUT do motorista).
// Invariante: available_seats + Σ(seats_reserved CONFIRMED) == total_seats.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Ride {
    pub id: Uuid,
    pub driver_id: Uuid,
    #[schema(example = "Lisboa - Sede")]
    pub origin: String,
    #[schema(example = "Porto - Escritório Norte")]
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    #[schema(example = 3)]
    pub available_seats: i32,
    #[schema(example = 4)]
    pub total_seats: i32,
    pub status: RideStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ride {
    pub fn new(
        driver_id: Uuid,
        origin: String,
        destination: String,
        departure_time: DateTime<Utc>,
        seats: i32,
    ) -> Result<Self, AppError> {
        if seats <= 0 {
            return Err(AppError::validation("available_seats must be greater than 0"));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            driver_id,
            origin,
            destination,
            departure_time,
            available_seats: seats,
            total_seats: seats,
            status: RideStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_completed(&self) -> bool {
        self.status == RideStatus::Completed
    }

    pub fn is_driver(&self, employee_id: Uuid) -> bool {
        self.driver_id == employee_id
    }

    /// Checagem de teto de capacidade feita no pedido (PENDING): nenhuma
    /// cadeira é descontada aqui.
    pub fn ensure_bookable(&self, seats: i32) -> Result<(), AppError> {
        match self.status {
            RideStatus::Completed => Err(AppError::validation("Cannot book a completed ride")),
            RideStatus::Full => Err(AppError::validation("Ride is full")),
            RideStatus::Active if seats > self.available_seats => {
                Err(AppError::validation("Not enough available seats"))
            }
            RideStatus::Active => Ok(()),
        }
    }

    /// Desconta cadeiras na confirmação. Em 0 a carona passa a FULL.
    pub fn take_seats(&mut self, seats: i32) -> Result<(), AppError> {
        if self.is_completed() {
            return Err(AppError::validation("Ride is already completed"));
        }
        if seats > self.available_seats {
            return Err(AppError::validation(format!(
                "Not enough available seats (requested {seats}, available {})",
                self.available_seats
            )));
        }

        self.available_seats -= seats;
        if self.available_seats == 0 {
            self.status = RideStatus::Full;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Devolve cadeiras de uma reserva confirmada. Nunca reabre uma carona COMPLETED.
    pub fn release_seats(&mut self, seats: i32) {
        self.available_seats += seats;
        if self.status == RideStatus::Full && self.available_seats > 0 {
            self.status = RideStatus::Active;
        }
        self.updated_at = Utc::now();
    }

    /// Novo valor de cadeiras livres vindo do motorista (evento de capacidade).
    pub fn set_available_seats(&mut self, new_available: i32, confirmed_seats: i32) -> Result<(), AppError> {
        if self.is_completed() {
            return Err(AppError::validation("Cannot update a completed ride"));
        }
        if new_available < 0 {
            return Err(AppError::validation("available_seats cannot be negative"));
        }
        if new_available < confirmed_seats {
            return Err(AppError::validation(format!(
                "Cannot set seats below already reserved amount ({confirmed_seats})"
            )));
        }

        let total_seats = new_available
            .checked_add(confirmed_seats)
            .ok_or_else(|| AppError::validation("available_seats is too large"))?;

        self.available_seats = new_available;
        self.total_seats = total_seats;
        self.status = if new_available == 0 { RideStatus::Full } else { RideStatus::Active };
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), AppError> {
        if self.is_completed() {
            return Err(AppError::validation("Ride is already completed"));
        }
        self.status = RideStatus::Completed;
        self.updated_at = Utc::now();
        Ok(())
    }
}

// --- Payloads ---

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRidePayload {
    #[schema(example = "Lisboa - Sede")]
    pub origin: String,
    #[schema(example = "Porto - Escritório Norte")]
    pub destination: String,
    #[serde(deserialize_with = "datetime::flexible::deserialize")]
    #[schema(value_type = String, example = "2026-02-10T08:30:00")]
    pub departure_time: DateTime<Utc>,
    #[schema(example = 3)]
    pub available_seats: i32,
}

// Todos os campos opcionais: só o que vier é alterado.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateRidePayload {
    pub origin: Option<String>,
    pub destination: Option<String>,
    #[serde(default, deserialize_with = "datetime::flexible::option::deserialize")]
    #[schema(value_type = Option<String>, example = "2026-02-10T09:00:00")]
    pub departure_time: Option<DateTime<Utc>>,
    #[schema(example = 2)]
    pub available_seats: Option<i32>,
}

// --- Busca / Paginação ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RideSort {
    #[default]
    DateAsc,
    DateDesc,
}

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 50;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RideListQuery {
    /// Trecho da origem (case-insensitive)
    pub origin: Option<String>,
    /// Trecho do destino (case-insensitive)
    pub destination: Option<String>,
    pub driver_id: Option<Uuid>,
    /// ISO 8601
    pub date_from: Option<String>,
    /// ISO 8601
    pub date_to: Option<String>,
    /// `date_asc` (padrão) ou `date_desc`
    #[param(value_type = Option<String>)]
    pub sort_by: Option<RideSort>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

// Filtro já validado, pronto para o repositório.
#[derive(Debug, Clone, Default)]
pub struct RideFilter {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub driver_id: Option<Uuid>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub sort: RideSort,
    pub page: i64,
    pub per_page: i64,
}

impl RideFilter {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn matches(&self, ride: &Ride) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            needle
                .as_ref()
                .is_none_or(|n| haystack.to_lowercase().contains(&n.to_lowercase()))
        }

        contains(&ride.origin, &self.origin)
            && contains(&ride.destination, &self.destination)
            && self.driver_id.is_none_or(|id| ride.driver_id == id)
            && self.date_from.is_none_or(|from| ride.departure_time >= from)
            && self.date_to.is_none_or(|to| ride.departure_time <= to)
    }
}

impl TryFrom<RideListQuery> for RideFilter {
    type Error = AppError;

    fn try_from(query: RideListQuery) -> Result<Self, Self::Error> {
        let page = query.page.unwrap_or(1);
        let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE);

        if page < 1 {
            return Err(AppError::validation("page must be >= 1"));
        }
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(AppError::validation(format!("per_page must be between 1 and {MAX_PER_PAGE}")));
        }

        let parse = |raw: Option<String>, name: &str| -> Result<Option<DateTime<Utc>>, AppError> {
            match raw.filter(|r| !r.trim().is_empty()) {
                Some(r) => datetime::parse_datetime(&r).map(Some).ok_or_else(|| {
                    AppError::validation(format!(
                        "Invalid {name} format. Use ISO datetime (e.g., 2026-02-10T10:00:00)"
                    ))
                }),
                None => Ok(None),
            }
        };

        let date_from = parse(query.date_from, "date_from")?;
        let date_to = parse(query.date_to, "date_to")?;

        if let (Some(from), Some(to)) = (date_from, date_to) {
            if from > to {
                return Err(AppError::validation("date_from cannot be later than date_to"));
            }
        }

        let non_blank = |s: Option<String>| s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Ok(Self {
            origin: non_blank(query.origin),
            destination: non_blank(query.destination),
            driver_id: query.driver_id,
            date_from,
            date_to,
            sort: query.sort_by.unwrap_or_default(),
            page,
            per_page,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RidePage {
    pub items: Vec<Ride>,
    pub page: i64,
    pub per_page: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

impl RidePage {
    pub fn new(items: Vec<Ride>, filter: &RideFilter, total_items: i64) -> Self {
        let total_pages = (total_items + filter.per_page - 1) / filter.per_page;
        Self {
            items,
            page: filter.page,
            per_page: filter.per_page,
            total_items,
            total_pages,
        }
    }
}

// Participante = JOIN explícito Reservation x Employee.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Participant {
    pub employee_id: Uuid,
    pub name: String,
    pub email: String,
    pub seats_reserved: i32,
    pub reservation_status: ReservationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ride(seats: i32) -> Ride {
        let departure = Utc.with_ymd_and_hms(2026, 2, 10, 8, 30, 0).unwrap();
        Ride::new(Uuid::new_v4(), "A".into(), "B".into(), departure, seats).unwrap()
    }

    #[test]
    fn new_ride_requires_positive_seats() {
        let departure = Utc::now();
        let err = Ride::new(Uuid::new_v4(), "A".into(), "B".into(), departure, 0).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn taking_last_seats_marks_full_and_release_reactivates() {
        let mut r = ride(3);
        r.take_seats(2).unwrap();
        assert_eq!((r.available_seats, r.status), (1, RideStatus::Active));

        r.take_seats(1).unwrap();
        assert_eq!((r.available_seats, r.status), (0, RideStatus::Full));

        r.release_seats(2);
        assert_eq!((r.available_seats, r.status), (2, RideStatus::Active));
        assert_eq!(r.total_seats, 3);
    }

    #[test]
    fn cannot_overdraw_seats() {
        let mut r = ride(1);
        assert!(r.take_seats(2).is_err());
        assert_eq!(r.available_seats, 1);
    }

    #[test]
    fn release_never_reopens_completed() {
        let mut r = ride(2);
        r.take_seats(2).unwrap();
        r.complete().unwrap();
        r.release_seats(2);
        assert_eq!(r.status, RideStatus::Completed);
        assert_eq!(r.available_seats, 2);
    }

    #[test]
    fn completing_twice_fails() {
        let mut r = ride(2);
        r.complete().unwrap();
        assert!(matches!(r.complete(), Err(AppError::Validation(_))));
    }

    #[test]
    fn capacity_update_respects_confirmed_seats() {
        let mut r = ride(4);
        r.take_seats(4).unwrap();
        assert_eq!(r.status, RideStatus::Full);

        assert!(r.set_available_seats(1, 4).is_err());
        r.set_available_seats(5, 4).unwrap();
        assert_eq!((r.available_seats, r.total_seats, r.status), (5, 9, RideStatus::Active));
    }

    #[test]
    fn capacity_update_rejects_overflowing_total() {
        let mut r = ride(2);
        r.take_seats(1).unwrap();

        let err = r.set_available_seats(i32::MAX, 1).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!((r.available_seats, r.total_seats, r.status), (1, 2, RideStatus::Active));

        // Sem cadeiras confirmadas o teto ainda cabe
        let mut empty = ride(1);
        empty.set_available_seats(i32::MAX, 0).unwrap();
        assert_eq!(empty.total_seats, i32::MAX);
    }

    #[test]
    fn bookable_checks_status_and_ceiling() {
        let mut r = ride(3);
        assert!(r.ensure_bookable(3).is_ok());
        assert!(r.ensure_bookable(5).is_err());
        r.take_seats(3).unwrap();
        assert!(r.ensure_bookable(1).is_err());
    }

    #[test]
    fn query_validation() {
        let ok = RideFilter::try_from(RideListQuery::default()).unwrap();
        assert_eq!((ok.page, ok.per_page, ok.sort), (1, DEFAULT_PER_PAGE, RideSort::DateAsc));

        let bad_page = RideListQuery { page: Some(0), ..Default::default() };
        assert!(RideFilter::try_from(bad_page).is_err());

        let bad_per_page = RideListQuery { per_page: Some(51), ..Default::default() };
        assert!(RideFilter::try_from(bad_per_page).is_err());

        let bad_date = RideListQuery { date_from: Some("yesterday".into()), ..Default::default() };
        assert!(RideFilter::try_from(bad_date).is_err());

        let inverted = RideListQuery {
            date_from: Some("2026-02-11T00:00:00".into()),
            date_to: Some("2026-02-10T00:00:00".into()),
            ..Default::default()
        };
        assert!(RideFilter::try_from(inverted).is_err());
    }

    #[test]
    fn filter_matches_substrings_case_insensitively() {
        let r = ride(2);
        let filter = RideFilter {
            origin: Some("a".into()),
            destination: Some("b".into()),
            page: 1,
            per_page: 10,
            ..Default::default()
        };
        assert!(filter.matches(&r));

        let other = RideFilter { origin: Some("zzz".into()), ..filter };
        assert!(!other.matches(&r));
    }

    #[test]
    fn page_count_rounds_up() {
        let filter = RideFilter { page: 1, per_page: 10, ..Default::default() };
        assert_eq!(RidePage::new(vec![], &filter, 21).total_pages, 3);
        assert_eq!(RidePage::new(vec![], &filter, 0).total_pages, 0);
    }
}
