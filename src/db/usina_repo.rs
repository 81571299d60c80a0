// src/db/usina_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::usina::{Investidor, Usina},
};

#[derive(Clone, Default)]
pub struct UsinaRepository;

impl UsinaRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  INVESTIDORES
    // =========================================================================

    pub async fn create_investidor<'e, E>(
        &self,
        executor: E,
        nome: &str,
        documento: &str,
        email: Option<&str>,
        telefone: Option<&str>,
    ) -> Result<Investidor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let investidor = sqlx::query_as::<_, Investidor>(
            r#"
            INSERT INTO investidores (nome, documento, email, telefone)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(nome)
        .bind(documento)
        .bind(email)
        .bind(telefone)
        .fetch_one(executor)
        .await?;

        Ok(investidor)
    }

    pub async fn list_investidores<'e, E>(&self, executor: E) -> Result<Vec<Investidor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let investidores =
            sqlx::query_as::<_, Investidor>("SELECT * FROM investidores ORDER BY nome ASC")
                .fetch_all(executor)
                .await?;

        Ok(investidores)
    }

    // =========================================================================
    //  USINAS
    // =========================================================================

    pub async fn create_usina<'e, E>(
        &self,
        executor: E,
        nome: &str,
        investidor_id: Option<Uuid>,
        numero_uc: Option<&str>,
        potencia_kwp: Option<Decimal>,
        valor_kwh: Decimal,
    ) -> Result<Usina, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Usina>(
            r#"
            INSERT INTO usinas (nome, investidor_id, numero_uc, potencia_kwp, valor_kwh)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(nome)
        .bind(investidor_id)
        .bind(numero_uc)
        .bind(potencia_kwp)
        .bind(valor_kwh)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_foreign_key_violation() {
                    return AppError::ResourceNotFound(format!(
                        "Investidor {}",
                        investidor_id.map(|id| id.to_string()).unwrap_or_default()
                    ));
                }
            }
            e.into()
        })
    }

    pub async fn list_usinas<'e, E>(&self, executor: E) -> Result<Vec<Usina>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usinas = sqlx::query_as::<_, Usina>("SELECT * FROM usinas ORDER BY nome ASC")
            .fetch_all(executor)
            .await?;

        Ok(usinas)
    }

    pub async fn get_usina<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Usina>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usina = sqlx::query_as::<_, Usina>("SELECT * FROM usinas WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(usina)
    }
}
