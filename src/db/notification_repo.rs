// src/db/notification_repo.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{common::error::AppError, db::pg_store::PgUnitOfWork, models::notification::Notification};

const NOTIFICATION_COLUMNS: &str = "id, employee_id, ride_id, message, kind, is_read, created_at";

#[async_trait]
pub trait NotificationRepository: Send {
    async fn find_notification(&mut self, id: Uuid) -> Result<Option<Notification>, AppError>;

    // Mais recentes primeiro
    async fn list_notifications_for_employee(&mut self, employee_id: Uuid) -> Result<Vec<Notification>, AppError>;

    async fn insert_notification(&mut self, notification: &Notification) -> Result<(), AppError>;

    // Só `is_read` muda depois da criação
    async fn update_notification(&mut self, notification: &Notification) -> Result<(), AppError>;

    async fn delete_notification(&mut self, id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
impl NotificationRepository for PgUnitOfWork {
    async fn find_notification(&mut self, id: Uuid) -> Result<Option<Notification>, AppError> {
        let sql = format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = $1");
        let notification = sqlx::query_as::<_, Notification>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(notification)
    }

    async fn list_notifications_for_employee(&mut self, employee_id: Uuid) -> Result<Vec<Notification>, AppError> {
        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE employee_id = $1 ORDER BY created_at DESC"
        );
        let notifications = sqlx::query_as::<_, Notification>(&sql)
            .bind(employee_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(notifications)
    }

    async fn insert_notification(&mut self, notification: &Notification) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, employee_id, ride_id, message, kind, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
            .bind(notification.id)
            .bind(notification.employee_id)
            .bind(notification.ride_id)
            .bind(&notification.message)
            .bind(notification.kind)
            .bind(notification.is_read)
            .bind(notification.created_at)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn update_notification(&mut self, notification: &Notification) -> Result<(), AppError> {
        sqlx::query("UPDATE notifications SET is_read = $2 WHERE id = $1")
            .bind(notification.id)
            .bind(notification.is_read)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete_notification(&mut self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}
