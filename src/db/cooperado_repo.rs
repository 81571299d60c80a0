// src/db/cooperado_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::cooperado::{Cooperado, TipoPessoa, UnidadeBeneficiaria},
};

#[derive(Clone, Default)]
pub struct CooperadoRepository;

impl CooperadoRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  COOPERADOS
    // =========================================================================

    pub async fn create_cooperado<'e, E>(
        &self,
        executor: E,
        nome: &str,
        documento: &str,
        tipo_pessoa: TipoPessoa,
        email: Option<&str>,
        telefone: Option<&str>,
    ) -> Result<Cooperado, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Cooperado>(
            r#"
            INSERT INTO cooperados (nome, documento, tipo_pessoa, email, telefone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(nome)
        .bind(documento)
        .bind(tipo_pessoa)
        .bind(email)
        .bind(telefone)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // Documento duplicado é erro de negócio, não 500
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "Já existe um cooperado com o documento '{}'.",
                        documento
                    ));
                }
            }
            e.into()
        })
    }

    /// Lista cooperados, filtrando por nome ou documento quando `busca` vem preenchida.
    pub async fn list_cooperados<'e, E>(
        &self,
        executor: E,
        busca: Option<&str>,
    ) -> Result<Vec<Cooperado>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let cooperados = sqlx::query_as::<_, Cooperado>(
            r#"
            SELECT * FROM cooperados
            WHERE $1::text IS NULL
               OR nome ILIKE '%' || $1 || '%'
               OR documento LIKE '%' || $1 || '%'
            ORDER BY nome ASC
            "#,
        )
        .bind(busca)
        .fetch_all(executor)
        .await?;

        Ok(cooperados)
    }

    pub async fn get_cooperado<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Cooperado>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let cooperado = sqlx::query_as::<_, Cooperado>("SELECT * FROM cooperados WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(cooperado)
    }

    /// Atualiza só os campos enviados.
    pub async fn update_cooperado<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        nome: Option<&str>,
        email: Option<&str>,
        telefone: Option<&str>,
        ativo: Option<bool>,
    ) -> Result<Option<Cooperado>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let cooperado = sqlx::query_as::<_, Cooperado>(
            r#"
            UPDATE cooperados
            SET nome = COALESCE($2, nome),
                email = COALESCE($3, email),
                telefone = COALESCE($4, telefone),
                ativo = COALESCE($5, ativo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(nome)
        .bind(email)
        .bind(telefone)
        .bind(ativo)
        .fetch_optional(executor)
        .await?;

        Ok(cooperado)
    }

    // =========================================================================
    //  UNIDADES BENEFICIÁRIAS
    // =========================================================================

    pub async fn create_unidade<'e, E>(
        &self,
        executor: E,
        cooperado_id: Uuid,
        numero_uc: &str,
        apelido: Option<&str>,
        endereco: Option<&str>,
        percentual_desconto: Decimal,
    ) -> Result<UnidadeBeneficiaria, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, UnidadeBeneficiaria>(
            r#"
            INSERT INTO unidades_beneficiarias (
                cooperado_id, numero_uc, apelido, endereco, percentual_desconto
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(cooperado_id)
        .bind(numero_uc)
        .bind(apelido)
        .bind(endereco)
        .bind(percentual_desconto)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "A UC '{}' já está cadastrada.",
                        numero_uc
                    ));
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::ResourceNotFound(format!("Cooperado {}", cooperado_id));
                }
            }
            e.into()
        })
    }

    pub async fn list_unidades<'e, E>(
        &self,
        executor: E,
        cooperado_id: Uuid,
    ) -> Result<Vec<UnidadeBeneficiaria>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let unidades = sqlx::query_as::<_, UnidadeBeneficiaria>(
            "SELECT * FROM unidades_beneficiarias WHERE cooperado_id = $1 ORDER BY numero_uc ASC",
        )
        .bind(cooperado_id)
        .fetch_all(executor)
        .await?;

        Ok(unidades)
    }

    pub async fn get_unidade<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<UnidadeBeneficiaria>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let unidade = sqlx::query_as::<_, UnidadeBeneficiaria>(
            "SELECT * FROM unidades_beneficiarias WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(unidade)
    }
}
