// src/models/employee.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Representa um funcionário vindo do banco de dados
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    pub id: Uuid,
    #[schema(example = "Ana Ribeiro")]
    pub name: String,
    #[schema(example = "ana.ribeiro@empresa.pt")]
    pub email: String,
    #[schema(example = "Engenharia")]
    pub department: String,

    #[serde(skip_serializing, default)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    // Perfil de carona
    pub phone_number: Option<String>,
    pub car_model: Option<String>,
    pub car_plate: Option<String>,
    pub car_color: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn new(name: String, email: String, department: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            department,
            password_hash,
            phone_number: None,
            car_model: None,
            car_plate: None,
            car_color: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_profile(&mut self, changes: UpdateProfilePayload) {
        if let Some(phone) = changes.phone_number {
            self.phone_number = Some(phone);
        }
        if let Some(model) = changes.car_model {
            self.car_model = Some(model);
        }
        if let Some(plate) = changes.car_plate {
            self.car_plate = Some(plate);
        }
        if let Some(color) = changes.car_color {
            self.car_color = Some(color);
        }
        self.updated_at = Utc::now();
    }
}

// Perfil com estatísticas de carona
#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeProfile {
    #[serde(flatten)]
    pub employee: Employee,
    pub rides_offered_count: i64,
    pub bookings_count: i64,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfilePayload {
    #[validate(length(max = 20, message = "phone_number must have at most 20 characters"))]
    #[schema(example = "+351 912 345 678")]
    pub phone_number: Option<String>,
    #[validate(length(max = 100, message = "car_model must have at most 100 characters"))]
    #[schema(example = "Renault Clio")]
    pub car_model: Option<String>,
    #[validate(length(max = 20, message = "car_plate must have at most 20 characters"))]
    #[schema(example = "AA-00-BB")]
    pub car_plate: Option<String>,
    #[validate(length(max = 50, message = "car_color must have at most 50 characters"))]
    #[schema(example = "Cinza")]
    pub car_color: Option<String>,
}
