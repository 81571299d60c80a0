// src/services/finance_service.rs

use chrono::{NaiveDate, Utc};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::FinanceRepository,
    models::finance::{Lancamento, LancamentoStatus, NovoLancamento},
};

#[derive(Clone)]
pub struct FinanceService {
    repo: FinanceRepository,
}

impl FinanceService {
    pub fn new(repo: FinanceRepository) -> Self {
        Self { repo }
    }

    pub async fn create_lancamento<'e, E>(
        &self,
        executor: E,
        novo: NovoLancamento,
    ) -> Result<Lancamento, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if novo.valor.is_sign_negative() {
            return Err(AppError::BusinessRule("O valor do lançamento não pode ser negativo.".into()));
        }

        self.repo.create_lancamento(executor, &novo).await.map_err(|e| match e {
            AppError::DatabaseError(ref db) if db
                .as_database_error()
                .is_some_and(|d| d.is_foreign_key_violation()) =>
            {
                AppError::ResourceNotFound("Conta, fatura ou pagamento vinculado".into())
            }
            other => other,
        })
    }

    /// Baixa o lançamento e movimenta o saldo da conta na mesma transação.
    pub async fn pagar_lancamento<'e, E>(
        &self,
        executor: E,
        lancamento_id: Uuid,
        conta_id: Option<Uuid>,
        data_pagamento: Option<NaiveDate>,
    ) -> Result<Lancamento, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let lancamento = self.repo
            .get_lancamento_for_update(&mut *tx, lancamento_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Lançamento {}", lancamento_id)))?;

        verificar_pendente(&lancamento)?;

        let conta_id = conta_id.or(lancamento.conta_id).ok_or_else(|| {
            AppError::BusinessRule("Informe a conta bancária para baixar o lançamento.".into())
        })?;

        let conta = self.repo
            .ajustar_saldo(&mut *tx, conta_id, lancamento.tipo.efeito_no_saldo(lancamento.valor))
            .await?;

        let pago = self.repo
            .update_lancamento_status(
                &mut *tx,
                lancamento_id,
                LancamentoStatus::Pago,
                Some(conta_id),
                Some(data_pagamento.unwrap_or_else(|| Utc::now().date_naive())),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "✅ Lançamento {} baixado na conta '{}' (saldo {})",
            pago.id,
            conta.nome,
            conta.saldo_atual
        );

        Ok(pago)
    }

    pub async fn cancelar_lancamento<'e, E>(
        &self,
        executor: E,
        lancamento_id: Uuid,
    ) -> Result<Lancamento, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let lancamento = self.repo
            .get_lancamento_for_update(&mut *tx, lancamento_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Lançamento {}", lancamento_id)))?;

        verificar_pendente(&lancamento)?;

        let cancelado = self.repo
            .update_lancamento_status(&mut *tx, lancamento_id, LancamentoStatus::Cancelado, None, None)
            .await?;

        tx.commit().await?;
        Ok(cancelado)
    }
}

/// Só lançamentos pendentes mudam de status.
fn verificar_pendente(lancamento: &Lancamento) -> Result<(), AppError> {
    match lancamento.status {
        LancamentoStatus::Pendente => Ok(()),
        LancamentoStatus::Pago => Err(AppError::BusinessRule("Lançamento já está pago.".into())),
        LancamentoStatus::Cancelado => {
            Err(AppError::BusinessRule("Lançamento está cancelado.".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::finance::LancamentoTipo;
    use rust_decimal_macros::dec;

    fn lancamento(status: LancamentoStatus) -> Lancamento {
        Lancamento {
            id: Uuid::new_v4(),
            descricao: "Assinatura UC 3001234567 - 09/2026".into(),
            tipo: LancamentoTipo::Receita,
            status,
            valor: dec!(416),
            conta_id: None,
            fatura_id: None,
            pagamento_usina_id: None,
            data_vencimento: NaiveDate::from_ymd_opt(2026, 10, 10).unwrap(),
            data_pagamento: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn only_pending_entries_can_change() {
        assert!(verificar_pendente(&lancamento(LancamentoStatus::Pendente)).is_ok());
        assert!(matches!(
            verificar_pendente(&lancamento(LancamentoStatus::Pago)),
            Err(AppError::BusinessRule(_))
        ));
        assert!(matches!(
            verificar_pendente(&lancamento(LancamentoStatus::Cancelado)),
            Err(AppError::BusinessRule(_))
        ));
    }
}
