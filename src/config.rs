// src/config.rs

use std::{env, fmt::Display, str::FromStr, sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::{
    db::{IdentityStore, MemoryStore, PatientRepository, PatientStore, UserRepository},
    services::{AuthService, PatientService, TokenService},
};

const MIN_JWT_SECRET_BYTES: usize = 32;
// 365 dias
const MAX_JWT_EXPIRATION_MS: i64 = 365 * 24 * 60 * 60 * 1000;

/// Configuração lida das variáveis de ambiente (e do `.env`, se existir).
#[derive(Clone)]
pub struct Config {
    /// `None` = armazenamento em memória.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiration_ms: i64,
    pub bcrypt_cost: u32,
    pub server_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub db_statement_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let config = Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            jwt_secret,
            jwt_expiration_ms: var_or("JWT_EXPIRATION_MS", 86_400_000)?,
            bcrypt_cost: var_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            server_addr: var_or("SERVER_ADDR", "0.0.0.0:3000".to_string())?,
            db_max_connections: var_or("DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout_secs: var_or("DB_ACQUIRE_TIMEOUT_SECS", 3)?,
            db_statement_timeout_ms: var_or("DB_STATEMENT_TIMEOUT_MS", 5_000)?,
        };
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            bail!("JWT_SECRET deve ter pelo menos {MIN_JWT_SECRET_BYTES} bytes");
        }
        if !(1..=MAX_JWT_EXPIRATION_MS).contains(&self.jwt_expiration_ms) {
            bail!("JWT_EXPIRATION_MS deve estar entre 1 e {MAX_JWT_EXPIRATION_MS}");
        }
        Ok(())
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.jwt_expiration_ms)
    }
}

fn var_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("Valor inválido para {key}: {e}")),
        Err(_) => Ok(default),
    }
}

/// Grafo de dependências compartilhado pelos handlers e pelo middleware.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub patient_service: PatientService,
    pub token_service: TokenService,
    pub identity_store: Arc<dyn IdentityStore>,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let Some(database_url) = &config.database_url else {
            tracing::warn!("⚠️ DATABASE_URL não definida: usando armazenamento em memória (dados não persistem)");
            return Ok(Self::in_memory(config));
        };

        let connect_options = PgConnectOptions::from_str(database_url)
            .context("DATABASE_URL inválida")?
            .options([("statement_timeout", config.db_statement_timeout_ms.to_string())]);

        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
            .connect_with(connect_options)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        sqlx::migrate!().run(&db_pool).await?;

        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        let users = Arc::new(UserRepository::new(db_pool.clone()));
        let patients = Arc::new(PatientRepository::new(db_pool));
        Ok(Self::from_stores(config, users, patients))
    }

    /// Estado completo sobre um `MemoryStore` novo. Usado nos testes.
    pub fn in_memory(config: &Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::from_stores(config, store.clone(), store)
    }

    fn from_stores(
        config: &Config,
        identity_store: Arc<dyn IdentityStore>,
        patient_store: Arc<dyn PatientStore>,
    ) -> Self {
        let token_service = TokenService::new(&config.jwt_secret, config.token_ttl());
        let auth_service = AuthService::new(
            identity_store.clone(),
            token_service.clone(),
            config.bcrypt_cost,
        );
        let patient_service = PatientService::new(patient_store);

        Self {
            auth_service,
            patient_service,
            token_service,
            identity_store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> Config {
        Config {
            database_url: None,
            jwt_secret: secret.into(),
            jwt_expiration_ms: 86_400_000,
            bcrypt_cost: 4,
            server_addr: "127.0.0.1:0".into(),
            db_max_connections: 5,
            db_acquire_timeout_secs: 3,
            db_statement_timeout_ms: 5_000,
        }
    }

    #[test]
    fn short_secrets_are_refused() {
        assert!(config("curto").check().is_err());
        assert!(config("test-secret-key-for-testing-purposes-only-32-bytes").check().is_ok());
    }

    #[test]
    fn ttl_must_be_positive_and_bounded() {
        let mut cfg = config("test-secret-key-for-testing-purposes-only-32-bytes");
        cfg.jwt_expiration_ms = 0;
        assert!(cfg.check().is_err());
        cfg.jwt_expiration_ms = i64::MAX;
        assert!(cfg.check().is_err());
        cfg.jwt_expiration_ms = MAX_JWT_EXPIRATION_MS;
        assert!(cfg.check().is_ok());
    }

    #[test]
    fn ttl_comes_from_milliseconds() {
        let cfg = config("test-secret-key-for-testing-purposes-only-32-bytes");
        assert_eq!(cfg.token_ttl(), chrono::Duration::hours(24));
    }

    #[tokio::test]
    async fn missing_database_url_falls_back_to_memory() {
        let cfg = config("test-secret-key-for-testing-purposes-only-32-bytes");
        let state = AppState::new(&cfg).await.unwrap();
        assert!(!state.identity_store.email_exists("ninguem@x.com").await.unwrap());
    }
}
