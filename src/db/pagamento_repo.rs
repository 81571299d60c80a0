// src/db/pagamento_repo.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::pagamento::{FormaEnvio, NovoPagamento, PagamentoStatus, PagamentoUsina},
    services::pagamento_service::PagamentoStatusGateway,
};

#[derive(Clone)]
pub struct PagamentoRepository {
    pool: PgPool,
}

impl PagamentoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_pagamento<'e, E>(
        &self,
        executor: E,
        novo: &NovoPagamento,
    ) -> Result<PagamentoUsina, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PagamentoUsina>(
            r#"
            INSERT INTO pagamentos_usina (
                usina_id, mes_referencia, geracao_kwh,
                tusd_fio_b, valor_tusd_fio_b, valor_concessionaria, valor_total,
                data_vencimento
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(novo.usina_id)
        .bind(novo.mes_referencia)
        .bind(novo.geracao_kwh)
        .bind(novo.tusd_fio_b)
        .bind(novo.valor_tusd_fio_b)
        .bind(novo.valor_concessionaria)
        .bind(novo.valor_total)
        .bind(novo.data_vencimento)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Já existe pagamento para esta usina neste mês.".to_string(),
                    );
                }
            }
            e.into()
        })
    }

    pub async fn list_pagamentos<'e, E>(
        &self,
        executor: E,
        usina_id: Option<Uuid>,
        mes_referencia: Option<NaiveDate>,
        status: Option<PagamentoStatus>,
    ) -> Result<Vec<PagamentoUsina>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pagamentos = sqlx::query_as::<_, PagamentoUsina>(
            r#"
            SELECT * FROM pagamentos_usina
            WHERE ($1::uuid IS NULL OR usina_id = $1)
              AND ($2::date IS NULL OR mes_referencia = $2)
              AND ($3::pagamento_status IS NULL OR status = $3)
            ORDER BY mes_referencia DESC, created_at DESC
            "#,
        )
        .bind(usina_id)
        .bind(mes_referencia)
        .bind(status)
        .fetch_all(executor)
        .await?;

        Ok(pagamentos)
    }

    pub async fn get_pagamento<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<PagamentoUsina>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pagamento =
            sqlx::query_as::<_, PagamentoUsina>("SELECT * FROM pagamentos_usina WHERE id = $1")
                .bind(id)
                .fetch_optional(executor)
                .await?;

        Ok(pagamento)
    }
}

#[async_trait]
impl PagamentoStatusGateway for PagamentoRepository {
    async fn update_pagamento_status(
        &self,
        pagamento_id: Uuid,
        new_status: PagamentoStatus,
        send_method: Option<FormaEnvio>,
    ) -> Result<PagamentoUsina, AppError> {
        // A função valida a transição e acrescenta a entrada no histórico
        let pagamento = sqlx::query_as::<_, PagamentoUsina>(
            "SELECT * FROM update_pagamento_status($1, $2, $3)",
        )
        .bind(pagamento_id)
        .bind(new_status)
        .bind(send_method.map(|m| m.as_str()))
        .fetch_one(&self.pool)
        .await?;

        Ok(pagamento)
    }
}
