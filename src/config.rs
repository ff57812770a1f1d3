// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{DelegateRepository, RequestRepository, UserRepository},
    services::{
        auth::AuthService,
        pricing::{PricingEngine, SystemClock},
        request_service::RequestService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: {raw}"))?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self { database_url, jwt_secret, bind_addr, db_max_connections })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub pricing: PricingEngine,
    pub auth_service: AuthService,
    pub request_service: RequestService,
    pub delegate_repo: DelegateRepository,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, config.jwt_secret.clone()))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(db_pool: PgPool, jwt_secret: String) -> Self {
        let pricing = PricingEngine::new(Arc::new(SystemClock));

        let user_repo = UserRepository::new(db_pool.clone());
        let request_repo = RequestRepository::new(db_pool.clone());
        let delegate_repo = DelegateRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), jwt_secret, db_pool.clone());
        let request_service = RequestService::new(
            request_repo,
            user_repo,
            delegate_repo.clone(),
            pricing.clone(),
            db_pool.clone(),
        );

        Self {
            db_pool,
            pricing,
            auth_service,
            request_service,
            delegate_repo,
        }
    }
}
