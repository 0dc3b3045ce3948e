// src/services/employee_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{Datastore, EmployeeRepository, ReservationRepository, RideRepository},
    models::{
        auth::Identity,
        employee::{Employee, EmployeeProfile, UpdateProfilePayload},
        reservation::Reservation,
        ride::Ride,
    },
};

#[derive(Clone)]
pub struct EmployeeService {
    store: Arc<dyn Datastore>,
}

impl EmployeeService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }

    pub async fn list_employees(&self) -> Result<Vec<Employee>, AppError> {
        let mut uow = self.store.begin().await?;
        uow.list_employees().await
    }

    pub async fn profile(&self, identity: &Identity) -> Result<EmployeeProfile, AppError> {
        let mut uow = self.store.begin().await?;
        let employee = uow
            .find_employee(identity.employee_id)
            .await?
            .ok_or_else(|| AppError::not_found("Employee not found"))?;
        let (rides_offered_count, bookings_count) = uow.count_employee_activity(employee.id).await?;

        Ok(EmployeeProfile {
            employee,
            rides_offered_count,
            bookings_count,
        })
    }

    // Só o próprio funcionário altera o perfil: o id vem da identidade, nunca do corpo
    pub async fn update_profile(
        &self,
        identity: &Identity,
        changes: UpdateProfilePayload,
    ) -> Result<Employee, AppError> {
        let mut uow = self.store.begin().await?;
        let mut employee = uow
            .find_employee(identity.employee_id)
            .await?
            .ok_or_else(|| AppError::not_found("Employee not found"))?;

        employee.apply_profile(changes);
        uow.update_employee(&employee).await?;
        uow.commit().await?;

        tracing::info!(action = "PROFILE_UPDATED", employee_id = %employee.id, "Perfil atualizado");
        Ok(employee)
    }

    pub async fn my_rides(&self, identity: &Identity) -> Result<Vec<Ride>, AppError> {
        let mut uow = self.store.begin().await?;
        uow.list_rides_by_driver(identity.employee_id).await
    }

    pub async fn my_reservations(&self, identity: &Identity) -> Result<Vec<Reservation>, AppError> {
        let mut uow = self.store.begin().await?;
        uow.list_reservations_by_employee(identity.employee_id).await
    }
}
