// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        CooperadoRepository, FaturaRepository, FinanceRepository, PagamentoRepository,
        SettingsRepository, UsinaRepository,
    },
    services::{
        document_service::DocumentService, fatura_service::FaturaService,
        finance_service::FinanceService, pagamento_service::PagamentoService,
    },
};

/// Variáveis de ambiente lidas na inicialização.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_audience: Option<String>,
    pub server_addr: String,
    pub database_max_connections: u32,
    pub fonts_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let database_max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(v) => v.parse().context("DATABASE_MAX_CONNECTIONS deve ser um número")?,
            Err(_) => 5,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_audience: env::var("JWT_AUDIENCE").ok().filter(|a| !a.is_empty()),
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            database_max_connections,
            fonts_dir: env::var("FONTS_DIR").unwrap_or_else(|_| "./fonts".to_string()),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub jwt_audience: Option<String>,

    // Repositórios usados direto pelos handlers de cadastro
    pub cooperado_repo: CooperadoRepository,
    pub usina_repo: UsinaRepository,
    pub fatura_repo: FaturaRepository,
    pub finance_repo: FinanceRepository,
    pub settings_repo: SettingsRepository,

    pub fatura_service: FaturaService,
    pub pagamento_service: PagamentoService,
    pub finance_service: FinanceService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar no banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, config))
    }

    /// Monta o estado sobre uma pool já criada.
    pub fn from_pool(db_pool: PgPool, config: &Config) -> Self {
        // --- Monta o gráfico de dependências ---
        let cooperado_repo = CooperadoRepository::new();
        let usina_repo = UsinaRepository::new();
        let fatura_repo = FaturaRepository::new();
        let pagamento_repo = PagamentoRepository::new(db_pool.clone());
        let finance_repo = FinanceRepository::new();
        let settings_repo = SettingsRepository::new();

        let fatura_service = FaturaService::new(fatura_repo.clone(), cooperado_repo.clone());
        let pagamento_service = PagamentoService::new(
            pagamento_repo.clone(),
            usina_repo.clone(),
            Arc::new(pagamento_repo.clone()),
        );
        let finance_service = FinanceService::new(finance_repo.clone());
        let document_service = DocumentService::new(
            config.fonts_dir.clone(),
            fatura_repo.clone(),
            cooperado_repo.clone(),
            pagamento_repo,
            usina_repo.clone(),
            settings_repo.clone(),
        );

        Self {
            db_pool,
            jwt_secret: config.jwt_secret.clone(),
            jwt_audience: config.jwt_audience.clone(),
            cooperado_repo,
            usina_repo,
            fatura_repo,
            finance_repo,
            settings_repo,
            fatura_service,
            pagamento_service,
            finance_service,
            document_service,
        }
    }
}
