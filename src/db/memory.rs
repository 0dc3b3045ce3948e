// src/db/memory.rs

// Armazenamento em memória: usado em desenvolvimento sem Postgres e nos testes.
// Cada unidade de trabalho acumula as escritas num "overlay" e só as aplica
// nas tabelas compartilhadas no commit. Descartar o overlay = rollback.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard};
#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        Datastore, EmployeeRepository, NotificationRepository, ReservationRepository, RideRepository,
        StatsRepository, UnitOfWork,
    },
    models::{
        employee::Employee,
        notification::Notification,
        reservation::{Reservation, ReservationStatus},
        ride::{Participant, Ride, RideFilter, RideSort, RideStatus},
        stats::PlatformCounts,
    },
};

#[derive(Debug, Clone, Default)]
struct Tables {
    employees: HashMap<Uuid, Employee>,
    rides: HashMap<Uuid, Ride>,
    reservations: HashMap<Uuid, Reservation>,
    notifications: HashMap<Uuid, Notification>,
}

// `None` = linha apagada nesta unidade de trabalho
#[derive(Debug, Default)]
struct Staged {
    employees: HashMap<Uuid, Option<Employee>>,
    rides: HashMap<Uuid, Option<Ride>>,
    reservations: HashMap<Uuid, Option<Reservation>>,
    notifications: HashMap<Uuid, Option<Notification>>,
}

fn poisoned<T>(_: T) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("memory store lock poisoned"))
}

fn lookup<T: Clone>(committed: &HashMap<Uuid, T>, staged: &HashMap<Uuid, Option<T>>, id: &Uuid) -> Option<T> {
    match staged.get(id) {
        Some(entry) => entry.clone(),
        None => committed.get(id).cloned(),
    }
}

fn merged<T: Clone>(committed: &HashMap<Uuid, T>, staged: &HashMap<Uuid, Option<T>>) -> Vec<T> {
    let mut rows: Vec<T> = committed
        .iter()
        .filter(|(id, _)| !staged.contains_key(id))
        .map(|(_, row)| row.clone())
        .collect();
    rows.extend(staged.values().flatten().cloned());
    rows
}

fn apply<T>(table: &mut HashMap<Uuid, T>, staged: HashMap<Uuid, Option<T>>) {
    for (id, entry) in staged {
        match entry {
            Some(row) => {
                table.insert(id, row);
            }
            None => {
                table.remove(&id);
            }
        }
    }
}

impl Tables {
    // Mesmas garantias que o schema do Postgres dá
    fn enforce_constraints(&mut self) -> Result<(), AppError> {
        // 1. FKs: reservas em CASCADE, notificações em SET NULL
        let rides = &self.rides;
        self.reservations.retain(|_, r| rides.contains_key(&r.ride_id));
        for notification in self.notifications.values_mut() {
            if notification.ride_id.is_some_and(|id| !rides.contains_key(&id)) {
                notification.ride_id = None;
            }
        }

        // 2. UNIQUE(email)
        let mut emails = HashSet::new();
        if !self.employees.values().all(|e| emails.insert(e.email.as_str())) {
            return Err(AppError::EmailAlreadyExists);
        }

        // 3. Uma reserva ativa por (funcionário, carona)
        let mut pairs = HashSet::new();
        let unique_active = self
            .reservations
            .values()
            .filter(|r| r.status.is_active())
            .all(|r| pairs.insert((r.employee_id, r.ride_id)));
        if !unique_active {
            return Err(AppError::Conflict(
                "You already have an active reservation for this ride".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryDatastore {
    tables: Arc<RwLock<Tables>>,
    #[cfg(test)]
    fail_next_commit: Arc<AtomicBool>,
}

impl MemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    // Faz o próximo commit falhar (testes de rollback)
    #[cfg(test)]
    pub(crate) fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Datastore for MemoryDatastore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError> {
        Ok(Box::new(MemoryUnitOfWork {
            tables: Arc::clone(&self.tables),
            staged: Staged::default(),
            #[cfg(test)]
            fail_commit: Arc::clone(&self.fail_next_commit),
        }))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

pub struct MemoryUnitOfWork {
    tables: Arc<RwLock<Tables>>,
    staged: Staged,
    #[cfg(test)]
    fail_commit: Arc<AtomicBool>,
}

impl MemoryUnitOfWork {
    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, AppError> {
        self.tables.read().map_err(poisoned)
    }

    fn all_rides(&self) -> Result<Vec<Ride>, AppError> {
        let tables = self.read()?;
        Ok(merged(&tables.rides, &self.staged.rides))
    }

    fn all_reservations(&self) -> Result<Vec<Reservation>, AppError> {
        let tables = self.read()?;
        Ok(merged(&tables.reservations, &self.staged.reservations))
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        #[cfg(test)]
        if self.fail_commit.swap(false, Ordering::SeqCst) {
            return Err(AppError::InternalServerError(anyhow::anyhow!("simulated commit failure")));
        }

        let MemoryUnitOfWork { tables, staged, .. } = *self;

        let mut guard = tables.write().map_err(poisoned)?;
        let mut next = guard.clone();
        apply(&mut next.employees, staged.employees);
        apply(&mut next.rides, staged.rides);
        apply(&mut next.reservations, staged.reservations);
        apply(&mut next.notifications, staged.notifications);
        next.enforce_constraints()?;

        *guard = next;
        Ok(())
    }
}

#[async_trait]
impl EmployeeRepository for MemoryUnitOfWork {
    async fn find_employee(&mut self, id: Uuid) -> Result<Option<Employee>, AppError> {
        let tables = self.read()?;
        Ok(lookup(&tables.employees, &self.staged.employees, &id))
    }

    async fn find_employee_by_email(&mut self, email: &str) -> Result<Option<Employee>, AppError> {
        let tables = self.read()?;
        Ok(merged(&tables.employees, &self.staged.employees)
            .into_iter()
            .find(|e| e.email == email))
    }

    async fn list_employees(&mut self) -> Result<Vec<Employee>, AppError> {
        let tables = self.read()?;
        let mut employees = merged(&tables.employees, &self.staged.employees);
        employees.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(employees)
    }

    async fn insert_employee(&mut self, employee: &Employee) -> Result<(), AppError> {
        let taken = {
            let tables = self.read()?;
            merged(&tables.employees, &self.staged.employees)
                .iter()
                .any(|e| e.email == employee.email)
        };
        if taken {
            return Err(AppError::EmailAlreadyExists);
        }

        self.staged.employees.insert(employee.id, Some(employee.clone()));
        Ok(())
    }

    async fn update_employee(&mut self, employee: &Employee) -> Result<(), AppError> {
        self.staged.employees.insert(employee.id, Some(employee.clone()));
        Ok(())
    }

    async fn update_password(
        &mut self,
        id: Uuid,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let current = {
            let tables = self.read()?;
            lookup(&tables.employees, &self.staged.employees, &id)
        };
        if let Some(mut employee) = current {
            employee.password_hash = password_hash.to_string();
            employee.updated_at = updated_at;
            self.staged.employees.insert(id, Some(employee));
        }
        Ok(())
    }

    async fn count_employee_activity(&mut self, id: Uuid) -> Result<(i64, i64), AppError> {
        let offered = self.all_rides()?.iter().filter(|r| r.driver_id == id).count();
        let booked = self.all_reservations()?.iter().filter(|r| r.employee_id == id).count();
        Ok((offered as i64, booked as i64))
    }
}

#[async_trait]
impl RideRepository for MemoryUnitOfWork {
    async fn find_ride(&mut self, id: Uuid) -> Result<Option<Ride>, AppError> {
        let tables = self.read()?;
        Ok(lookup(&tables.rides, &self.staged.rides, &id))
    }

    // Aqui não há trava de linha: a serialização por carona é feita pelo RideLocks
    async fn find_ride_for_update(&mut self, id: Uuid) -> Result<Option<Ride>, AppError> {
        self.find_ride(id).await
    }

    async fn search_rides(&mut self, filter: &RideFilter) -> Result<(Vec<Ride>, i64), AppError> {
        let mut rides: Vec<Ride> = self
            .all_rides()?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();

        rides.sort_by(|a, b| {
            let by_date = match filter.sort {
                RideSort::DateAsc => a.departure_time.cmp(&b.departure_time),
                RideSort::DateDesc => b.departure_time.cmp(&a.departure_time),
            };
            by_date.then(a.id.cmp(&b.id))
        });

        let total = rides.len() as i64;
        let page = rides
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.per_page as usize)
            .collect();
        Ok((page, total))
    }

    async fn list_rides_by_driver(&mut self, driver_id: Uuid) -> Result<Vec<Ride>, AppError> {
        let mut rides: Vec<Ride> = self
            .all_rides()?
            .into_iter()
            .filter(|r| r.driver_id == driver_id)
            .collect();
        rides.sort_by(|a, b| b.departure_time.cmp(&a.departure_time));
        Ok(rides)
    }

    async fn insert_ride(&mut self, ride: &Ride) -> Result<(), AppError> {
        self.staged.rides.insert(ride.id, Some(ride.clone()));
        Ok(())
    }

    async fn update_ride(&mut self, ride: &Ride) -> Result<(), AppError> {
        self.staged.rides.insert(ride.id, Some(ride.clone()));
        Ok(())
    }

    async fn delete_ride(&mut self, id: Uuid) -> Result<(), AppError> {
        let (reservations, notifications) = {
            let tables = self.read()?;
            (
                merged(&tables.reservations, &self.staged.reservations),
                merged(&tables.notifications, &self.staged.notifications),
            )
        };

        for reservation in reservations.into_iter().filter(|r| r.ride_id == id) {
            self.staged.reservations.insert(reservation.id, None);
        }
        for mut notification in notifications.into_iter().filter(|n| n.ride_id == Some(id)) {
            notification.ride_id = None;
            self.staged.notifications.insert(notification.id, Some(notification));
        }
        self.staged.rides.insert(id, None);
        Ok(())
    }
}

#[async_trait]
impl ReservationRepository for MemoryUnitOfWork {
    async fn find_reservation(&mut self, id: Uuid) -> Result<Option<Reservation>, AppError> {
        let tables = self.read()?;
        Ok(lookup(&tables.reservations, &self.staged.reservations, &id))
    }

    async fn list_reservations(&mut self) -> Result<Vec<Reservation>, AppError> {
        let mut reservations = self.all_reservations()?;
        reservations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reservations)
    }

    async fn list_reservations_by_employee(&mut self, employee_id: Uuid) -> Result<Vec<Reservation>, AppError> {
        let mut reservations: Vec<Reservation> = self
            .all_reservations()?
            .into_iter()
            .filter(|r| r.employee_id == employee_id)
            .collect();
        reservations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reservations)
    }

    async fn find_active_reservation(
        &mut self,
        employee_id: Uuid,
        ride_id: Uuid,
    ) -> Result<Option<Reservation>, AppError> {
        Ok(self
            .all_reservations()?
            .into_iter()
            .find(|r| r.employee_id == employee_id && r.ride_id == ride_id && r.status.is_active()))
    }

    async fn confirmed_seats_for_ride(&mut self, ride_id: Uuid) -> Result<i32, AppError> {
        Ok(self
            .all_reservations()?
            .iter()
            .filter(|r| r.ride_id == ride_id)
            .map(Reservation::held_seats)
            .sum())
    }

    async fn list_participants(&mut self, ride_id: Uuid) -> Result<Vec<Participant>, AppError> {
        let mut reservations: Vec<Reservation> = self
            .all_reservations()?
            .into_iter()
            .filter(|r| r.ride_id == ride_id && r.status != ReservationStatus::Cancelled)
            .collect();
        reservations.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let tables = self.read()?;
        let participants = reservations
            .into_iter()
            .filter_map(|r| {
                lookup(&tables.employees, &self.staged.employees, &r.employee_id).map(|e| Participant {
                    employee_id: e.id,
                    name: e.name,
                    email: e.email,
                    seats_reserved: r.seats_reserved,
                    reservation_status: r.status,
                })
            })
            .collect();
        Ok(participants)
    }

    async fn insert_reservation(&mut self, reservation: &Reservation) -> Result<(), AppError> {
        self.staged.reservations.insert(reservation.id, Some(reservation.clone()));
        Ok(())
    }

    async fn update_reservation(&mut self, reservation: &Reservation) -> Result<(), AppError> {
        self.staged.reservations.insert(reservation.id, Some(reservation.clone()));
        Ok(())
    }

    async fn delete_reservation(&mut self, id: Uuid) -> Result<(), AppError> {
        self.staged.reservations.insert(id, None);
        Ok(())
    }
}

#[async_trait]
impl NotificationRepository for MemoryUnitOfWork {
    async fn find_notification(&mut self, id: Uuid) -> Result<Option<Notification>, AppError> {
        let tables = self.read()?;
        Ok(lookup(&tables.notifications, &self.staged.notifications, &id))
    }

    async fn list_notifications_for_employee(&mut self, employee_id: Uuid) -> Result<Vec<Notification>, AppError> {
        let tables = self.read()?;
        let mut notifications: Vec<Notification> = merged(&tables.notifications, &self.staged.notifications)
            .into_iter()
            .filter(|n| n.employee_id == employee_id)
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn insert_notification(&mut self, notification: &Notification) -> Result<(), AppError> {
        self.staged.notifications.insert(notification.id, Some(notification.clone()));
        Ok(())
    }

    async fn update_notification(&mut self, notification: &Notification) -> Result<(), AppError> {
        self.staged.notifications.insert(notification.id, Some(notification.clone()));
        Ok(())
    }

    async fn delete_notification(&mut self, id: Uuid) -> Result<(), AppError> {
        self.staged.notifications.insert(id, None);
        Ok(())
    }
}

#[async_trait]
impl StatsRepository for MemoryUnitOfWork {
    async fn platform_counts(&mut self) -> Result<PlatformCounts, AppError> {
        let tables = self.read()?;
        let employees = merged(&tables.employees, &self.staged.employees);
        let rides = merged(&tables.rides, &self.staged.rides);
        let reservations = merged(&tables.reservations, &self.staged.reservations);

        let count_rides = |status: RideStatus| rides.iter().filter(|r| r.status == status).count() as i64;
        let count_reservations =
            |status: ReservationStatus| reservations.iter().filter(|r| r.status == status).count() as i64;

        let open_rides: HashSet<Uuid> = rides.iter().filter(|r| !r.is_completed()).map(|r| r.id).collect();

        Ok(PlatformCounts {
            total_employees: employees.len() as i64,
            total_rides: rides.len() as i64,
            active_rides: open_rides.len() as i64,
            completed_rides: count_rides(RideStatus::Completed),
            total_reservations: reservations.len() as i64,
            pending_reservations: count_reservations(ReservationStatus::Pending),
            confirmed_reservations: count_reservations(ReservationStatus::Confirmed),
            cancelled_reservations: count_reservations(ReservationStatus::Cancelled),
            open_available_seats: rides
                .iter()
                .filter(|r| !r.is_completed())
                .map(|r| i64::from(r.available_seats))
                .sum(),
            open_confirmed_seats: reservations
                .iter()
                .filter(|r| open_rides.contains(&r.ride_id))
                .map(|r| i64::from(r.held_seats()))
                .sum(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notification::NotificationKind;
    use chrono::Utc;

    fn employee(email: &str) -> Employee {
        Employee::new("Ana".into(), email.into(), "Eng".into(), "hash".into())
    }

    #[tokio::test]
    async fn writes_are_invisible_until_commit() {
        let store = MemoryDatastore::new();
        let ana = employee("ana@x.pt");

        let mut uow = store.begin().await.unwrap();
        uow.insert_employee(&ana).await.unwrap();
        // A própria transação enxerga o que escreveu
        assert!(uow.find_employee(ana.id).await.unwrap().is_some());

        let mut other = store.begin().await.unwrap();
        assert!(other.find_employee(ana.id).await.unwrap().is_none());

        uow.commit().await.unwrap();
        let mut after = store.begin().await.unwrap();
        assert!(after.find_employee(ana.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn dropping_the_unit_of_work_rolls_back() {
        let store = MemoryDatastore::new();
        let ana = employee("ana@x.pt");

        {
            let mut uow = store.begin().await.unwrap();
            uow.insert_employee(&ana).await.unwrap();
        }

        let mut uow = store.begin().await.unwrap();
        assert!(uow.find_employee(ana.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn password_update_keeps_concurrent_profile_edit() {
        let store = MemoryDatastore::new();
        let ana = employee("ana@x.pt");
        let mut uow = store.begin().await.unwrap();
        uow.insert_employee(&ana).await.unwrap();
        uow.commit().await.unwrap();

        // Perfil gravado depois da leitura feita para trocar a senha
        let mut profile = ana.clone();
        profile.car_model = Some("Renault Clio".into());
        let mut uow = store.begin().await.unwrap();
        uow.update_employee(&profile).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        uow.update_password(ana.id, "new-hash", Utc::now()).await.unwrap();
        uow.commit().await.unwrap();

        let stored = store.begin().await.unwrap().find_employee(ana.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "new-hash");
        assert_eq!(stored.car_model.as_deref(), Some("Renault Clio"));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_at_commit() {
        let store = MemoryDatastore::new();

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();
        first.insert_employee(&employee("dup@x.pt")).await.unwrap();
        second.insert_employee(&employee("dup@x.pt")).await.unwrap();

        first.commit().await.unwrap();
        let err = second.commit().await.unwrap_err();
        assert!(matches!(err, AppError::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn second_active_reservation_for_pair_conflicts() {
        let store = MemoryDatastore::new();
        let rider = Uuid::new_v4();
        let ride = Uuid::new_v4();

        let mut first = store.begin().await.unwrap();
        first.insert_reservation(&Reservation::pending(rider, ride, 1)).await.unwrap();
        let mut second = store.begin().await.unwrap();
        second.insert_reservation(&Reservation::pending(rider, ride, 1)).await.unwrap();

        // Sem a carona, a FK apagaria as reservas; então cria a carona junto
        let driver = Uuid::new_v4();
        let mut r = Ride::new(driver, "A".into(), "B".into(), Utc::now(), 3).unwrap();
        r.id = ride;
        let mut setup = store.begin().await.unwrap();
        setup.insert_ride(&r).await.unwrap();
        setup.commit().await.unwrap();

        first.commit().await.unwrap();
        assert!(matches!(second.commit().await, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn deleting_ride_cascades() {
        let store = MemoryDatastore::new();
        let driver = employee("driver@x.pt");
        let rider = employee("rider@x.pt");
        let ride = Ride::new(driver.id, "A".into(), "B".into(), Utc::now(), 3).unwrap();
        let reservation = Reservation::pending(rider.id, ride.id, 1);
        let notification = Notification::new(rider.id, Some(ride.id), NotificationKind::Info, "hi".into());

        let mut uow = store.begin().await.unwrap();
        uow.insert_employee(&driver).await.unwrap();
        uow.insert_employee(&rider).await.unwrap();
        uow.insert_ride(&ride).await.unwrap();
        uow.insert_reservation(&reservation).await.unwrap();
        uow.insert_notification(&notification).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        uow.delete_ride(ride.id).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        assert!(uow.find_ride(ride.id).await.unwrap().is_none());
        assert!(uow.find_reservation(reservation.id).await.unwrap().is_none());
        let kept = uow.find_notification(notification.id).await.unwrap().unwrap();
        assert_eq!(kept.ride_id, None);
    }

    #[tokio::test]
    async fn forced_commit_failure_keeps_tables_untouched() {
        let store = MemoryDatastore::new();
        store.fail_next_commit();

        let mut uow = store.begin().await.unwrap();
        uow.insert_employee(&employee("ana@x.pt")).await.unwrap();
        assert!(uow.commit().await.is_err());

        let mut uow = store.begin().await.unwrap();
        assert!(uow.list_employees().await.unwrap().is_empty());
    }
}
