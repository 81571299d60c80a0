// src/services/pagamento_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, format::primeiro_dia_do_mes},
    db::{PagamentoRepository, UsinaRepository},
    models::pagamento::{FormaEnvio, HistoricoPagamento, NovoPagamento, PagamentoStatus, PagamentoUsina},
};

/// Operação remota que muda o status de um pagamento.
///
/// Quem implementa garante a regra de transição e acrescenta a entrada no
/// histórico de forma atômica. Do lado da aplicação não validamos nada.
#[async_trait]
pub trait PagamentoStatusGateway: Send + Sync {
    async fn update_pagamento_status(
        &self,
        pagamento_id: Uuid,
        new_status: PagamentoStatus,
        send_method: Option<FormaEnvio>,
    ) -> Result<PagamentoUsina, AppError>;
}

/// Valores de um novo pagamento que não vieram prontos na requisição.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValoresPagamento {
    pub valor_tusd_fio_b: Decimal,
    pub valor_total: Decimal,
}

/// `valor_tusd_fio_b = geracao * tusd_fio_b`;
/// `valor_total = geracao * valor_kwh - valor_tusd_fio_b - valor_concessionaria`.
pub fn calcular_valores_pagamento(
    geracao_kwh: Decimal,
    tusd_fio_b: Decimal,
    valor_kwh: Decimal,
    valor_concessionaria: Decimal,
) -> ValoresPagamento {
    let valor_tusd_fio_b = geracao_kwh.saturating_mul(tusd_fio_b).round_dp(2);
    let bruto = geracao_kwh.saturating_mul(valor_kwh);
    let valor_total = bruto
        .saturating_sub(valor_tusd_fio_b)
        .saturating_sub(valor_concessionaria)
        .round_dp(2);

    ValoresPagamento { valor_tusd_fio_b, valor_total }
}

/// Entrada para criar o pagamento do mês de uma usina.
#[derive(Debug, Clone)]
pub struct DadosPagamento {
    pub usina_id: Uuid,
    pub mes_referencia: chrono::NaiveDate,
    pub geracao_kwh: Decimal,
    pub tusd_fio_b: Decimal,
    pub valor_concessionaria: Decimal,
    /// Quando informado, substitui o valor calculado.
    pub valor_total: Option<Decimal>,
    pub data_vencimento: Option<chrono::NaiveDate>,
}

#[derive(Clone)]
pub struct PagamentoService {
    repo: PagamentoRepository,
    usina_repo: UsinaRepository,
    gateway: Arc<dyn PagamentoStatusGateway>,
}

impl PagamentoService {
    pub fn new(
        repo: PagamentoRepository,
        usina_repo: UsinaRepository,
        gateway: Arc<dyn PagamentoStatusGateway>,
    ) -> Self {
        Self { repo, usina_repo, gateway }
    }

    pub async fn create_pagamento<'e, E>(
        &self,
        executor: E,
        dados: DadosPagamento,
    ) -> Result<PagamentoUsina, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let usina = self.usina_repo
            .get_usina(&mut *tx, dados.usina_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Usina {}", dados.usina_id)))?;

        let calculado = calcular_valores_pagamento(
            dados.geracao_kwh,
            dados.tusd_fio_b,
            usina.valor_kwh,
            dados.valor_concessionaria,
        );

        let novo = NovoPagamento {
            usina_id: usina.id,
            mes_referencia: primeiro_dia_do_mes(dados.mes_referencia),
            geracao_kwh: dados.geracao_kwh,
            tusd_fio_b: dados.tusd_fio_b,
            valor_tusd_fio_b: calculado.valor_tusd_fio_b,
            valor_concessionaria: dados.valor_concessionaria,
            valor_total: dados.valor_total.unwrap_or(calculado.valor_total),
            data_vencimento: dados.data_vencimento,
        };

        let pagamento = self.repo.create_pagamento(&mut *tx, &novo).await?;
        tx.commit().await?;

        tracing::info!("💰 Pagamento {} criado para a usina {}", pagamento.id, usina.nome);
        Ok(pagamento)
    }

    pub async fn get_pagamento<'e, E>(
        &self,
        executor: E,
        pagamento_id: Uuid,
    ) -> Result<PagamentoUsina, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .get_pagamento(executor, pagamento_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Pagamento {}", pagamento_id)))
    }

    pub async fn list_pagamentos<'e, E>(
        &self,
        executor: E,
        usina_id: Option<Uuid>,
        mes_referencia: Option<chrono::NaiveDate>,
        status: Option<PagamentoStatus>,
    ) -> Result<Vec<PagamentoUsina>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .list_pagamentos(executor, usina_id, mes_referencia.map(primeiro_dia_do_mes), status)
            .await
    }

    // --- TRANSIÇÃO ---

    /// Pede a mudança de status ao banco e devolve o registro atualizado,
    /// já com a nova entrada no histórico.
    pub async fn atualizar_status(
        &self,
        pagamento_id: Uuid,
        novo_status: PagamentoStatus,
        forma_envio: Option<FormaEnvio>,
    ) -> Result<PagamentoUsina, AppError> {
        let pagamento = self.gateway
            .update_pagamento_status(pagamento_id, novo_status, forma_envio)
            .await?;

        tracing::info!(
            "🔁 Pagamento {} agora está {:?} ({} mudanças no histórico)",
            pagamento.id,
            pagamento.status,
            pagamento.historico_status.0.len()
        );

        Ok(pagamento)
    }

    pub async fn historico<'e, E>(
        &self,
        executor: E,
        pagamento_id: Uuid,
    ) -> Result<Vec<HistoricoPagamento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pagamento = self.get_pagamento(executor, pagamento_id).await?;
        Ok(pagamento.historico_status.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use sqlx::{postgres::PgPoolOptions, types::Json};
    use std::{collections::HashMap, sync::Mutex};

    /// Gateway em memória: aceita qualquer transição e grava o histórico
    /// como a função do banco faria.
    #[derive(Default)]
    struct GatewayEmMemoria {
        pagamentos: Mutex<HashMap<Uuid, PagamentoUsina>>,
        chamadas: Mutex<Vec<(Uuid, PagamentoStatus, Option<FormaEnvio>)>>,
    }

    #[async_trait]
    impl PagamentoStatusGateway for GatewayEmMemoria {
        async fn update_pagamento_status(
            &self,
            pagamento_id: Uuid,
            new_status: PagamentoStatus,
            send_method: Option<FormaEnvio>,
        ) -> Result<PagamentoUsina, AppError> {
            self.chamadas.lock().unwrap().push((pagamento_id, new_status, send_method));

            let mut pagamentos = self.pagamentos.lock().unwrap();
            let pagamento = pagamentos
                .get_mut(&pagamento_id)
                .ok_or_else(|| AppError::ResourceNotFound(format!("Pagamento {}", pagamento_id)))?;

            if pagamento.status == PagamentoStatus::Paga {
                return Err(AppError::BusinessRule("Transição de status inválida".into()));
            }

            pagamento.historico_status.0.push(HistoricoPagamento {
                data: Utc::now(),
                status_anterior: pagamento.status,
                novo_status: new_status,
                forma_envio: send_method,
            });
            pagamento.status = new_status;
            Ok(pagamento.clone())
        }
    }

    fn pagamento_pendente() -> PagamentoUsina {
        PagamentoUsina {
            id: Uuid::new_v4(),
            usina_id: Uuid::new_v4(),
            mes_referencia: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            geracao_kwh: dec!(12500),
            tusd_fio_b: dec!(0.085),
            valor_tusd_fio_b: dec!(1062.50),
            valor_concessionaria: dec!(95.40),
            valor_total: dec!(4467.10),
            status: PagamentoStatus::Pendente,
            data_vencimento: None,
            data_pagamento: None,
            historico_status: Json(Vec::new()),
            created_at: None,
            updated_at: None,
        }
    }

    fn service_com(gateway: Arc<GatewayEmMemoria>) -> PagamentoService {
        // Pool preguiçoso: os testes de transição não tocam no banco
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/cooperativa_teste")
            .unwrap();
        PagamentoService::new(PagamentoRepository::new(pool), UsinaRepository::new(), gateway)
    }

    #[tokio::test]
    async fn status_change_goes_through_gateway_and_appends_history() {
        let gateway = Arc::new(GatewayEmMemoria::default());
        let pagamento = pagamento_pendente();
        let id = pagamento.id;
        gateway.pagamentos.lock().unwrap().insert(id, pagamento);

        let service = service_com(gateway.clone());

        let enviado = service
            .atualizar_status(id, PagamentoStatus::Enviada, Some(FormaEnvio::Email))
            .await
            .unwrap();
        assert_eq!(enviado.status, PagamentoStatus::Enviada);
        assert_eq!(enviado.historico_status.0.len(), 1);

        let pago = service
            .atualizar_status(id, PagamentoStatus::Paga, None)
            .await
            .unwrap();
        let historico = &pago.historico_status.0;
        assert_eq!(historico.len(), 2);
        assert_eq!(historico[0].status_anterior, PagamentoStatus::Pendente);
        assert_eq!(historico[0].novo_status, PagamentoStatus::Enviada);
        assert_eq!(historico[0].forma_envio, Some(FormaEnvio::Email));
        assert_eq!(historico[1].status_anterior, PagamentoStatus::Enviada);
        assert_eq!(historico[1].novo_status, PagamentoStatus::Paga);

        assert_eq!(gateway.chamadas.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn gateway_rejections_are_propagated_untouched() {
        let gateway = Arc::new(GatewayEmMemoria::default());
        let mut pagamento = pagamento_pendente();
        pagamento.status = PagamentoStatus::Paga;
        let id = pagamento.id;
        gateway.pagamentos.lock().unwrap().insert(id, pagamento);

        let service = service_com(gateway);
        let err = service
            .atualizar_status(id, PagamentoStatus::Pendente, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn unknown_payment_is_not_found() {
        let service = service_com(Arc::new(GatewayEmMemoria::default()));
        let err = service
            .atualizar_status(Uuid::new_v4(), PagamentoStatus::Enviada, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound(_)));
    }

    #[test]
    fn payment_values_deduct_tusd_and_utility_invoice() {
        let v = calcular_valores_pagamento(dec!(12500), dec!(0.085), dec!(0.45), dec!(95.40));
        assert_eq!(v.valor_tusd_fio_b, dec!(1062.50));
        // 12500 * 0.45 = 5625 ; 5625 - 1062.50 - 95.40
        assert_eq!(v.valor_total, dec!(4467.10));
    }
}
