// src/config.rs

use std::{env, sync::Arc};

use anyhow::{bail, Context};

use crate::{
    db::{Datastore, MemoryDatastore, PgDatastore},
    services::{
        auth::AuthService, employee_service::EmployeeService, notification_service::NotificationService,
        reporting_service::ReportingService, reservation_service::ReservationService, ride_locks::RideLocks,
        ride_service::RideService,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub storage: StorageBackend,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub bind_address: String,
    pub db_max_connections: u32,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Separado de `from_env` para poder ser testado sem mexer no ambiente do processo
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .context("JWT_SECRET deve ser definido")?;
        let database_url = lookup("DATABASE_URL").filter(|s| !s.is_empty());

        let storage = match lookup("STORAGE_BACKEND").map(|s| s.to_lowercase()).as_deref() {
            Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => bail!("STORAGE_BACKEND inválido: {other} (use postgres ou memory)"),
            None if database_url.is_some() => StorageBackend::Postgres,
            None => StorageBackend::Memory,
        };
        if storage == StorageBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL deve ser definida quando STORAGE_BACKEND=postgres");
        }

        fn number<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T> {
            match raw {
                Some(value) => value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("{key} inválido: {value}")),
                None => Ok(default),
            }
        }

        let jwt_expiration_hours = number(lookup("JWT_EXPIRATION_HOURS"), "JWT_EXPIRATION_HOURS", 24)?;
        if jwt_expiration_hours <= 0 {
            bail!("JWT_EXPIRATION_HOURS deve ser positivo");
        }

        Ok(Self {
            database_url,
            storage,
            jwt_secret,
            jwt_expiration_hours,
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections: number(lookup("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5)?,
            bcrypt_cost: number(lookup("BCRYPT_COST"), "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Datastore>,
    pub auth_service: AuthService,
    pub employee_service: EmployeeService,
    pub ride_service: RideService,
    pub reservation_service: ReservationService,
    pub notification_service: NotificationService,
    pub reporting_service: ReportingService,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn Datastore> = match (config.storage, &config.database_url) {
            (StorageBackend::Postgres, Some(url)) => {
                let pg = PgDatastore::connect(url, config.db_max_connections)
                    .await
                    .context("Falha ao conectar ao banco de dados")?;
                pg.migrate().await?;
                Arc::new(pg)
            }
            (StorageBackend::Postgres, None) => bail!("DATABASE_URL deve ser definida"),
            (StorageBackend::Memory, _) => {
                tracing::warn!("⚠️ Usando armazenamento em memória: os dados somem ao reiniciar");
                Arc::new(MemoryDatastore::new())
            }
        };

        Ok(Self::with_store(store, config))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_store(store: Arc<dyn Datastore>, config: &AppConfig) -> Self {
        // Motor de reservas e registro de caronas compartilham as travas por carona
        let locks = RideLocks::new();

        Self {
            auth_service: AuthService::new(
                store.clone(),
                config.jwt_secret.clone(),
                config.jwt_expiration_hours,
                config.bcrypt_cost,
            ),
            employee_service: EmployeeService::new(store.clone()),
            ride_service: RideService::new(store.clone(), locks.clone()),
            reservation_service: ReservationService::new(store.clone(), locks),
            notification_service: NotificationService::new(store.clone()),
            reporting_service: ReportingService::new(store.clone()),
            store,
        }
    }

    /// Estado em memória, usado pelos testes de integração.
    pub fn in_memory(jwt_secret: &str) -> Self {
        let config = AppConfig {
            database_url: None,
            storage: StorageBackend::Memory,
            jwt_secret: jwt_secret.to_string(),
            jwt_expiration_hours: 24,
            bind_address: "127.0.0.1:0".to_string(),
            db_max_connections: 1,
            bcrypt_cost: 4,
        };
        Self::with_store(Arc::new(MemoryDatastore::new()), &config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_database_use_memory() {
        let cfg = config(&[("JWT_SECRET", "s")]).unwrap();
        assert_eq!(cfg.storage, StorageBackend::Memory);
        assert_eq!(cfg.bind_address, "0.0.0.0:3000");
        assert_eq!(cfg.jwt_expiration_hours, 24);
        assert_eq!(cfg.db_max_connections, 5);
        assert_eq!(cfg.bcrypt_cost, bcrypt::DEFAULT_COST);
    }

    #[test]
    fn database_url_selects_postgres() {
        let cfg = config(&[("JWT_SECRET", "s"), ("DATABASE_URL", "postgres://localhost/carpool")]).unwrap();
        assert_eq!(cfg.storage, StorageBackend::Postgres);

        let forced = config(&[
            ("JWT_SECRET", "s"),
            ("DATABASE_URL", "postgres://localhost/carpool"),
            ("STORAGE_BACKEND", "memory"),
        ])
        .unwrap();
        assert_eq!(forced.storage, StorageBackend::Memory);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        assert!(config(&[]).is_err());
        assert!(config(&[("JWT_SECRET", "s"), ("STORAGE_BACKEND", "postgres")]).is_err());
        assert!(config(&[("JWT_SECRET", "s"), ("STORAGE_BACKEND", "redis")]).is_err());
        assert!(config(&[("JWT_SECRET", "s"), ("JWT_EXPIRATION_HOURS", "abc")]).is_err());
        assert!(config(&[("JWT_SECRET", "s"), ("JWT_EXPIRATION_HOURS", "0")]).is_err());
    }
}
