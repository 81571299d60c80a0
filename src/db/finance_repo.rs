// src/db/finance_repo.rs

use sqlx::{Postgres, Executor};
use uuid::Uuid;
use rust_decimal::Decimal;
use chrono::NaiveDate;
use crate::{
    common::error::AppError,
    models::finance::{ContaBancaria, Lancamento, LancamentoStatus, LancamentoTipo, NovoLancamento},
};

#[derive(Clone, Default)]
pub struct FinanceRepository;

impl FinanceRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  CONTAS BANCÁRIAS
    // =========================================================================

    pub async fn create_conta<'e, E>(
        &self,
        executor: E,
        nome: &str,
        banco: Option<&str>,
        agencia: Option<&str>,
        conta: Option<&str>,
        saldo_inicial: Decimal,
    ) -> Result<ContaBancaria, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let conta = sqlx::query_as::<_, ContaBancaria>(
            r#"
            INSERT INTO contas_bancarias (nome, banco, agencia, conta, saldo_atual)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
            .bind(nome)
            .bind(banco)
            .bind(agencia)
            .bind(conta)
            .bind(saldo_inicial)
            .fetch_one(executor)
            .await?;

        Ok(conta)
    }

    pub async fn get_all_contas<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<ContaBancaria>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contas = sqlx::query_as::<_, ContaBancaria>(
            "SELECT * FROM contas_bancarias ORDER BY nome ASC",
        )
            .fetch_all(executor)
            .await?;

        Ok(contas)
    }

    /// Soma `delta` ao saldo (negativo para saídas).
    pub async fn ajustar_saldo<'e, E>(
        &self,
        executor: E,
        conta_id: Uuid,
        delta: Decimal,
    ) -> Result<ContaBancaria, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let conta = sqlx::query_as::<_, ContaBancaria>(
            "UPDATE contas_bancarias SET saldo_atual = saldo_atual + $2 WHERE id = $1 RETURNING *",
        )
            .bind(conta_id)
            .bind(delta)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Conta bancária {}", conta_id)))?;

        Ok(conta)
    }

    // =========================================================================
    //  LANÇAMENTOS
    // =========================================================================

    pub async fn create_lancamento<'e, E>(
        &self,
        executor: E,
        novo: &NovoLancamento,
    ) -> Result<Lancamento, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lancamento = sqlx::query_as::<_, Lancamento>(
            r#"
            INSERT INTO lancamentos (
                descricao, tipo, valor, conta_id,
                fatura_id, pagamento_usina_id, data_vencimento
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
            .bind(&novo.descricao)
            .bind(novo.tipo)
            .bind(novo.valor)
            .bind(novo.conta_id)
            .bind(novo.fatura_id)
            .bind(novo.pagamento_usina_id)
            .bind(novo.data_vencimento)
            .fetch_one(executor)
            .await?;

        Ok(lancamento)
    }

    pub async fn list_lancamentos<'e, E>(
        &self,
        executor: E,
        tipo: Option<LancamentoTipo>,
        status: Option<LancamentoStatus>,
        vencimento_de: Option<NaiveDate>,
        vencimento_ate: Option<NaiveDate>,
    ) -> Result<Vec<Lancamento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lancamentos = sqlx::query_as::<_, Lancamento>(
            r#"
            SELECT * FROM lancamentos
            WHERE ($1::lancamento_tipo IS NULL OR tipo = $1)
              AND ($2::lancamento_status IS NULL OR status = $2)
              AND ($3::date IS NULL OR data_vencimento >= $3)
              AND ($4::date IS NULL OR data_vencimento <= $4)
            ORDER BY data_vencimento ASC, created_at ASC
            "#,
        )
            .bind(tipo)
            .bind(status)
            .bind(vencimento_de)
            .bind(vencimento_ate)
            .fetch_all(executor)
            .await?;

        Ok(lancamentos)
    }

    /// Busca o lançamento com lock de linha, para mudar status e saldo juntos.
    pub async fn get_lancamento_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Lancamento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lancamento = sqlx::query_as::<_, Lancamento>(
            "SELECT * FROM lancamentos WHERE id = $1 FOR UPDATE",
        )
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(lancamento)
    }

    pub async fn update_lancamento_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: LancamentoStatus,
        conta_id: Option<Uuid>,
        data_pagamento: Option<NaiveDate>,
    ) -> Result<Lancamento, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lancamento = sqlx::query_as::<_, Lancamento>(
            r#"
            UPDATE lancamentos
            SET status = $2,
                conta_id = COALESCE($3, conta_id),
                data_pagamento = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(status)
            .bind(conta_id)
            .bind(data_pagamento)
            .fetch_one(executor)
            .await?;

        Ok(lancamento)
    }
}
