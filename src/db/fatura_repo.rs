// src/db/fatura_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::fatura::{
        CalculoFaturaTemplate, CalculoResultado, Fatura, FaturaStatus, FormulasCalculo, NovaFatura,
    },
};

#[derive(Clone, Default)]
pub struct FaturaRepository;

impl FaturaRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  TEMPLATES DE CÁLCULO
    // =========================================================================

    pub async fn create_template<'e, E>(
        &self,
        executor: E,
        nome: &str,
        formulas: &FormulasCalculo,
    ) -> Result<CalculoFaturaTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let template = sqlx::query_as::<_, CalculoFaturaTemplate>(
            r#"
            INSERT INTO calculo_fatura_templates (nome, formula_valor_desconto, formula_valor_assinatura)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(nome)
        .bind(&formulas.formula_valor_desconto)
        .bind(&formulas.formula_valor_assinatura)
        .fetch_one(executor)
        .await?;

        Ok(template)
    }

    pub async fn list_templates<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<CalculoFaturaTemplate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let templates = sqlx::query_as::<_, CalculoFaturaTemplate>(
            "SELECT * FROM calculo_fatura_templates ORDER BY is_padrao DESC, nome ASC",
        )
        .fetch_all(executor)
        .await?;

        Ok(templates)
    }

    pub async fn get_template<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<CalculoFaturaTemplate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let template = sqlx::query_as::<_, CalculoFaturaTemplate>(
            "SELECT * FROM calculo_fatura_templates WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(template)
    }

    pub async fn get_template_padrao<'e, E>(
        &self,
        executor: E,
    ) -> Result<Option<CalculoFaturaTemplate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let template = sqlx::query_as::<_, CalculoFaturaTemplate>(
            "SELECT * FROM calculo_fatura_templates WHERE is_padrao LIMIT 1",
        )
        .fetch_optional(executor)
        .await?;

        Ok(template)
    }

    /// Marca `id` como padrão e desmarca o anterior, na mesma transação.
    pub async fn set_template_padrao<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<CalculoFaturaTemplate>, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        sqlx::query(
            "UPDATE calculo_fatura_templates SET is_padrao = FALSE, updated_at = NOW() WHERE is_padrao AND id <> $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let template = sqlx::query_as::<_, CalculoFaturaTemplate>(
            "UPDATE calculo_fatura_templates SET is_padrao = TRUE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        // Sem template, nada muda (o drop da transação faz rollback)
        if template.is_some() {
            tx.commit().await?;
        }

        Ok(template)
    }

    // =========================================================================
    //  FATURAS
    // =========================================================================

    pub async fn create_fatura<'e, E>(
        &self,
        executor: E,
        nova: &NovaFatura,
        percentual_desconto: Decimal,
        calculo: &CalculoResultado,
    ) -> Result<Fatura, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Fatura>(
            r#"
            INSERT INTO faturas (
                unidade_beneficiaria_id, mes_referencia,
                total_fatura, iluminacao_publica, outros_valores, fatura_concessionaria,
                consumo_kwh, saldo_energia_kwh, percentual_desconto,
                valor_desconto, valor_assinatura, economia,
                data_vencimento
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(nova.unidade_beneficiaria_id)
        .bind(nova.mes_referencia)
        .bind(nova.total_fatura)
        .bind(nova.iluminacao_publica)
        .bind(nova.outros_valores)
        .bind(nova.fatura_concessionaria)
        .bind(nova.consumo_kwh)
        .bind(nova.saldo_energia_kwh)
        .bind(percentual_desconto)
        .bind(calculo.valor_desconto)
        .bind(calculo.valor_assinatura)
        .bind(calculo.economia)
        .bind(nova.data_vencimento)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Já existe fatura para esta unidade neste mês.".to_string(),
                    );
                }
            }
            e.into()
        })
    }

    pub async fn list_faturas<'e, E>(
        &self,
        executor: E,
        mes_referencia: Option<NaiveDate>,
        status: Option<FaturaStatus>,
        unidade_beneficiaria_id: Option<Uuid>,
    ) -> Result<Vec<Fatura>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let faturas = sqlx::query_as::<_, Fatura>(
            r#"
            SELECT * FROM faturas
            WHERE ($1::date IS NULL OR mes_referencia = $1)
              AND ($2::fatura_status IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR unidade_beneficiaria_id = $3)
            ORDER BY mes_referencia DESC, created_at DESC
            "#,
        )
        .bind(mes_referencia)
        .bind(status)
        .bind(unidade_beneficiaria_id)
        .fetch_all(executor)
        .await?;

        Ok(faturas)
    }

    pub async fn get_fatura<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Fatura>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let fatura = sqlx::query_as::<_, Fatura>("SELECT * FROM faturas WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(fatura)
    }

    pub async fn update_valores<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        calculo: &CalculoResultado,
    ) -> Result<Fatura, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let fatura = sqlx::query_as::<_, Fatura>(
            r#"
            UPDATE faturas
            SET valor_desconto = $2,
                valor_assinatura = $3,
                economia = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(calculo.valor_desconto)
        .bind(calculo.valor_assinatura)
        .bind(calculo.economia)
        .fetch_one(executor)
        .await?;

        Ok(fatura)
    }

    pub async fn set_arquivo<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        arquivo_path: &str,
    ) -> Result<Option<Fatura>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let fatura = sqlx::query_as::<_, Fatura>(
            "UPDATE faturas SET arquivo_path = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(arquivo_path)
        .fetch_optional(executor)
        .await?;

        Ok(fatura)
    }

    /// Chama a função do banco, que valida a transição e grava o histórico.
    pub async fn update_fatura_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        novo_status: FaturaStatus,
        observacao: Option<&str>,
    ) -> Result<Fatura, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let fatura = sqlx::query_as::<_, Fatura>("SELECT * FROM update_fatura_status($1, $2, $3)")
            .bind(id)
            .bind(novo_status)
            .bind(observacao)
            .fetch_one(executor)
            .await?;

        Ok(fatura)
    }
}
