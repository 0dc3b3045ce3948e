// src/db/employee_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{common::error::AppError, db::pg_store::PgUnitOfWork, models::employee::Employee};

const EMPLOYEE_COLUMNS: &str = r#"
    id, name, email, department, password_hash,
    phone_number, car_model, car_plate, car_color,
    created_at, updated_at
"#;

// Responsável por todas as interações com a tabela 'employees'
#[async_trait]
pub trait EmployeeRepository: Send {
    async fn find_employee(&mut self, id: Uuid) -> Result<Option<Employee>, AppError>;

    // O e-mail já chega normalizado (minúsculo)
    async fn find_employee_by_email(&mut self, email: &str) -> Result<Option<Employee>, AppError>;

    // Ordenado por nome
    async fn list_employees(&mut self) -> Result<Vec<Employee>, AppError>;

    async fn insert_employee(&mut self, employee: &Employee) -> Result<(), AppError>;

    async fn update_employee(&mut self, employee: &Employee) -> Result<(), AppError>;

    // Só a senha: não sobrescreve o perfil gravado por outra requisição
    async fn update_password(
        &mut self,
        id: Uuid,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// (caronas oferecidas, reservas feitas) em qualquer status.
    async fn count_employee_activity(&mut self, id: Uuid) -> Result<(i64, i64), AppError>;
}

// Traduz a violação de unicidade do e-mail para o erro de domínio
fn map_email_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() && db_err.constraint() == Some("employees_email_key") {
            return AppError::EmailAlreadyExists;
        }
    }
    AppError::DatabaseError(e)
}

#[async_trait]
impl EmployeeRepository for PgUnitOfWork {
    async fn find_employee(&mut self, id: Uuid) -> Result<Option<Employee>, AppError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1");
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(employee)
    }

    async fn find_employee_by_email(&mut self, email: &str) -> Result<Option<Employee>, AppError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE email = $1");
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(email)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(employee)
    }

    async fn list_employees(&mut self) -> Result<Vec<Employee>, AppError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY name ASC, created_at ASC");
        let employees = sqlx::query_as::<_, Employee>(&sql)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(employees)
    }

    async fn insert_employee(&mut self, employee: &Employee) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO employees (
                id, name, email, department, password_hash,
                phone_number, car_model, car_plate, car_color,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
            .bind(employee.id)
            .bind(&employee.name)
            .bind(&employee.email)
            .bind(&employee.department)
            .bind(&employee.password_hash)
            .bind(&employee.phone_number)
            .bind(&employee.car_model)
            .bind(&employee.car_plate)
            .bind(&employee.car_color)
            .bind(employee.created_at)
            .bind(employee.updated_at)
            .execute(&mut *self.tx)
            .await
            .map_err(map_email_conflict)?;
        Ok(())
    }

    async fn update_employee(&mut self, employee: &Employee) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE employees
            SET name = $2, email = $3, department = $4, password_hash = $5,
                phone_number = $6, car_model = $7, car_plate = $8, car_color = $9,
                updated_at = $10
            WHERE id = $1
            "#,
        )
            .bind(employee.id)
            .bind(&employee.name)
            .bind(&employee.email)
            .bind(&employee.department)
            .bind(&employee.password_hash)
            .bind(&employee.phone_number)
            .bind(&employee.car_model)
            .bind(&employee.car_plate)
            .bind(&employee.car_color)
            .bind(employee.updated_at)
            .execute(&mut *self.tx)
            .await
            .map_err(map_email_conflict)?;
        Ok(())
    }

    async fn update_password(
        &mut self,
        id: Uuid,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE employees SET password_hash = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .bind(updated_at)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn count_employee_activity(&mut self, id: Uuid) -> Result<(i64, i64), AppError> {
        let counts: (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM rides WHERE driver_id = $1),
                (SELECT COUNT(*) FROM reservations WHERE employee_id = $1)
            "#,
        )
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(counts)
    }
}
