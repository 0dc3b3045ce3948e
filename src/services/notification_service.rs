// src/services/notification_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{Datastore, EmployeeRepository, NotificationRepository, RideRepository, UnitOfWork},
    models::{
        auth::Identity,
        notification::{CreateNotificationPayload, Notification, NotificationKind},
        ride::Ride,
    },
};

// --- Mensagens emitidas pelo motor de reservas ---

fn route(ride: &Ride) -> String {
    format!("{} → {}", ride.origin, ride.destination)
}

pub fn request_pending(rider_id: Uuid, ride: &Ride) -> Notification {
    Notification::new(
        rider_id,
        Some(ride.id),
        NotificationKind::Info,
        format!("Your reservation request for {} is pending approval", route(ride)),
    )
}

pub fn new_request(ride: &Ride, rider_name: &str, seats: i32) -> Notification {
    Notification::new(
        ride.driver_id,
        Some(ride.id),
        NotificationKind::Request,
        format!("{rider_name} requested {seats} seat(s) on your ride {}", route(ride)),
    )
}

pub fn approved(rider_id: Uuid, ride: &Ride) -> Notification {
    Notification::new(
        rider_id,
        Some(ride.id),
        NotificationKind::Approval,
        format!("Your reservation for {} has been approved", route(ride)),
    )
}

pub fn rejected(rider_id: Uuid, ride: &Ride) -> Notification {
    Notification::new(
        rider_id,
        Some(ride.id),
        NotificationKind::Rejection,
        format!("Your reservation for {} has been rejected", route(ride)),
    )
}

pub fn cancelled(ride: &Ride, rider_name: &str, seats: i32) -> Notification {
    Notification::new(
        ride.driver_id,
        Some(ride.id),
        NotificationKind::Cancellation,
        format!("{rider_name} cancelled a reservation of {seats} seat(s) on your ride {}", route(ride)),
    )
}

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn Datastore>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }

    pub async fn create_notification(
        &self,
        identity: &Identity,
        payload: CreateNotificationPayload,
    ) -> Result<Notification, AppError> {
        let mut uow = self.store.begin().await?;

        if uow.find_employee(payload.employee_id).await?.is_none() {
            return Err(AppError::not_found("Employee not found"));
        }
        if let Some(ride_id) = payload.ride_id {
            if uow.find_ride(ride_id).await?.is_none() {
                return Err(AppError::not_found("Ride not found"));
            }
        }

        let notification = Notification::new(payload.employee_id, payload.ride_id, payload.kind, payload.message);
        uow.insert_notification(&notification).await?;
        uow.commit().await?;

        tracing::info!(
            action = "NOTIFICATION_CREATED",
            employee_id = %identity.employee_id,
            notification_id = %notification.id,
            recipient_id = %notification.employee_id,
            "Notificação criada"
        );
        Ok(notification)
    }

    // Apenas o dono lista as próprias notificações
    pub async fn list_for_employee(&self, identity: &Identity, employee_id: Uuid) -> Result<Vec<Notification>, AppError> {
        if identity.employee_id != employee_id {
            return Err(AppError::forbidden("You can only view your own notifications"));
        }

        let mut uow = self.store.begin().await?;
        if uow.find_employee(employee_id).await?.is_none() {
            return Err(AppError::not_found("Employee not found"));
        }
        uow.list_notifications_for_employee(employee_id).await
    }

    pub async fn mark_read(&self, identity: &Identity, id: Uuid) -> Result<Notification, AppError> {
        let mut uow = self.store.begin().await?;
        let mut notification = owned_notification(&mut *uow, identity, id).await?;

        notification.is_read = true;
        uow.update_notification(&notification).await?;
        uow.commit().await?;
        Ok(notification)
    }

    pub async fn delete_notification(&self, identity: &Identity, id: Uuid) -> Result<(), AppError> {
        let mut uow = self.store.begin().await?;
        let notification = owned_notification(&mut *uow, identity, id).await?;

        uow.delete_notification(notification.id).await?;
        uow.commit().await?;

        tracing::info!(
            action = "NOTIFICATION_DELETED",
            employee_id = %identity.employee_id,
            notification_id = %id,
            "Notificação removida"
        );
        Ok(())
    }
}

// 404 antes de 403
async fn owned_notification(
    uow: &mut dyn UnitOfWork,
    identity: &Identity,
    id: Uuid,
) -> Result<Notification, AppError> {
    let notification = uow
        .find_notification(id)
        .await?
        .ok_or_else(|| AppError::not_found("Notification not found"))?;

    if notification.employee_id != identity.employee_id {
        return Err(AppError::forbidden("You can only manage your own notifications"));
    }
    Ok(notification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn messages_carry_route_and_recipient() {
        let driver = Uuid::new_v4();
        let rider = Uuid::new_v4();
        let ride = Ride::new(driver, "Lisboa".into(), "Porto".into(), Utc::now(), 3).unwrap();

        let to_driver = new_request(&ride, "Bruno", 2);
        assert_eq!(to_driver.employee_id, driver);
        assert_eq!(to_driver.kind, NotificationKind::Request);
        assert!(to_driver.message.contains("Bruno requested 2 seat(s)"));
        assert!(to_driver.message.contains("Lisboa → Porto"));

        let to_rider = approved(rider, &ride);
        assert_eq!((to_rider.employee_id, to_rider.kind), (rider, NotificationKind::Approval));
        assert_eq!(to_rider.ride_id, Some(ride.id));
        assert!(!to_rider.is_read);

        assert_eq!(request_pending(rider, &ride).kind, NotificationKind::Info);
        assert_eq!(rejected(rider, &ride).kind, NotificationKind::Rejection);
        assert_eq!(cancelled(&ride, "Bruno", 1).employee_id, driver);
    }
}
