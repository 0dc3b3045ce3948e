// src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Request,
    Approval,
    Rejection,
    Cancellation,
    #[default]
    Info,
}

// Imutável depois de criada, exceto `is_read`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub ride_id: Option<Uuid>,
    #[schema(example = "Your reservation for Lisboa → Porto has been approved")]
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(employee_id: Uuid, ride_id: Option<Uuid>, kind: NotificationKind, message: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            ride_id,
            message,
            kind,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateNotificationPayload {
    pub employee_id: Uuid,
    pub ride_id: Option<Uuid>,
    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: NotificationKind,
}
