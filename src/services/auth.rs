// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::{Datastore, EmployeeRepository},
    models::{
        auth::{AuthResponse, ChangePasswordPayload, Claims, Identity, LoginPayload, RegisterEmployeePayload},
        employee::Employee,
    },
};

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Datastore>,
    jwt_secret: String,
    token_ttl: chrono::Duration,
    bcrypt_cost: u32,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AuthService {
    pub fn new(store: Arc<dyn Datastore>, jwt_secret: String, token_ttl_hours: i64, bcrypt_cost: u32) -> Self {
        Self {
            store,
            jwt_secret,
            token_ttl: chrono::Duration::hours(token_ttl_hours),
            bcrypt_cost,
        }
    }

    pub async fn register_employee(&self, payload: RegisterEmployeePayload) -> Result<Employee, AppError> {
        let email = normalize_email(&payload.email);

        // 1. Hashing fora da transação (não toca no banco)
        let password_hash = self.hash_password(payload.password).await?;

        // 2. Cria o funcionário
        let mut uow = self.store.begin().await?;
        if uow.find_employee_by_email(&email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        let employee = Employee::new(
            payload.name.trim().to_string(),
            email,
            payload.department.trim().to_string(),
            password_hash,
        );
        uow.insert_employee(&employee).await?;
        uow.commit().await?;

        tracing::info!(
            action = "EMPLOYEE_REGISTERED",
            employee_id = %employee.id,
            department = %employee.department,
            "Novo funcionário registrado"
        );
        Ok(employee)
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<AuthResponse, AppError> {
        let email = normalize_email(&payload.email);

        let mut uow = self.store.begin().await?;
        let employee = uow
            .find_employee_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;
        drop(uow);

        if !self.verify_password(payload.password, employee.password_hash.clone()).await? {
            return Err(AppError::InvalidCredentials);
        }

        let access_token = self.create_token(&employee)?;
        tracing::info!(action = "USER_LOGIN", employee_id = %employee.id, "Login efetuado");

        Ok(AuthResponse {
            access_token,
            token_type: "Bearer".to_string(),
            employee,
        })
    }

    pub fn validate_token(&self, token: &str) -> Result<Identity, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(Identity::from(token_data.claims))
    }

    pub async fn current_employee(&self, identity: &Identity) -> Result<Employee, AppError> {
        let mut uow = self.store.begin().await?;
        uow.find_employee(identity.employee_id)
            .await?
            .ok_or_else(|| AppError::not_found("Employee not found"))
    }

    pub async fn change_password(&self, identity: &Identity, payload: ChangePasswordPayload) -> Result<(), AppError> {
        let employee = self.current_employee(identity).await?;

        if !self
            .verify_password(payload.current_password, employee.password_hash.clone())
            .await?
        {
            return Err(AppError::Unauthorized("Current password is incorrect".to_string()));
        }

        let password_hash = self.hash_password(payload.new_password).await?;

        let mut uow = self.store.begin().await?;
        uow.update_password(employee.id, &password_hash, Utc::now()).await?;
        uow.commit().await?;

        tracing::info!(action = "PASSWORD_CHANGED", employee_id = %employee.id, "Senha alterada");
        Ok(())
    }

    // bcrypt é CPU-bound: roda em um thread separado
    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let cost = self.bcrypt_cost;
        let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    async fn verify_password(&self, password: String, password_hash: String) -> Result<bool, AppError> {
        let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
        Ok(valid)
    }

    pub fn create_token(&self, employee: &Employee) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            sub: employee.id,
            email: employee.email.clone(),
            name: employee.name.clone(),
            department: employee.department.clone(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDatastore;

    fn service() -> AuthService {
        AuthService::new(Arc::new(MemoryDatastore::new()), "test-secret".into(), 24, 4)
    }

    fn register_payload(email: &str) -> RegisterEmployeePayload {
        RegisterEmployeePayload {
            name: "Ana Ribeiro".into(),
            email: email.into(),
            password: "segredo123".into(),
            department: "Engenharia".into(),
        }
    }

    #[tokio::test]
    async fn register_then_login_yields_identity_token() {
        let auth = service();
        let employee = auth.register_employee(register_payload("Ana@Empresa.pt")).await.unwrap();
        assert_eq!(employee.email, "ana@empresa.pt");
        assert_ne!(employee.password_hash, "segredo123");

        let response = auth
            .login(LoginPayload { email: "ANA@empresa.pt".into(), password: "segredo123".into() })
            .await
            .unwrap();
        assert_eq!(response.token_type, "Bearer");

        let identity = auth.validate_token(&response.access_token).unwrap();
        assert_eq!(identity.employee_id, employee.id);
        assert_eq!(identity.department, "Engenharia");
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let auth = service();
        auth.register_employee(register_payload("dup@empresa.pt")).await.unwrap();
        let err = auth.register_employee(register_payload("DUP@empresa.pt")).await.unwrap_err();
        assert!(matches!(err, AppError::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let auth = service();
        auth.register_employee(register_payload("ana@empresa.pt")).await.unwrap();
        let err = auth
            .login(LoginPayload { email: "ana@empresa.pt".into(), password: "errada".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));

        let err = auth
            .login(LoginPayload { email: "ninguem@empresa.pt".into(), password: "x".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn tampered_or_foreign_tokens_are_rejected() {
        let auth = service();
        let employee = auth.register_employee(register_payload("ana@empresa.pt")).await.unwrap();

        let other = AuthService::new(Arc::new(MemoryDatastore::new()), "other-secret".into(), 24, 4);
        let foreign = other.create_token(&employee).unwrap();
        assert!(matches!(auth.validate_token(&foreign), Err(AppError::InvalidToken)));
        assert!(matches!(auth.validate_token("not-a-jwt"), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn change_password_checks_current() {
        let auth = service();
        let employee = auth.register_employee(register_payload("ana@empresa.pt")).await.unwrap();
        let identity = Identity {
            employee_id: employee.id,
            email: employee.email.clone(),
            name: employee.name.clone(),
            department: employee.department.clone(),
        };

        let err = auth
            .change_password(
                &identity,
                ChangePasswordPayload { current_password: "errada".into(), new_password: "novasenha".into() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        auth.change_password(
            &identity,
            ChangePasswordPayload { current_password: "segredo123".into(), new_password: "novasenha".into() },
        )
        .await
        .unwrap();

        assert!(auth
            .login(LoginPayload { email: "ana@empresa.pt".into(), password: "novasenha".into() })
            .await
            .is_ok());
    }
}
