// src/models/pagamento.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "pagamento_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PagamentoStatus {
    Pendente,
    Enviada,
    Reenviada,
    Atrasada,
    Paga,
    Cancelada,
    Corrigida,
}

/// Como o demonstrativo foi enviado ao investidor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FormaEnvio {
    Email,
    Whatsapp,
}

impl FormaEnvio {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormaEnvio::Email => "email",
            FormaEnvio::Whatsapp => "whatsapp",
        }
    }
}

/// Entrada do histórico, gravada pela função `update_pagamento_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoricoPagamento {
    pub data: DateTime<Utc>,
    pub status_anterior: PagamentoStatus,
    pub novo_status: PagamentoStatus,
    pub forma_envio: Option<FormaEnvio>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagamentoUsina {
    pub id: Uuid,
    pub usina_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2026-09-01")]
    pub mes_referencia: NaiveDate,

    #[schema(example = "12500.00")]
    pub geracao_kwh: Decimal,

    /// Tarifa TUSD Fio B (R$/kWh).
    #[schema(example = "0.085000")]
    pub tusd_fio_b: Decimal,

    #[schema(example = "1062.50")]
    pub valor_tusd_fio_b: Decimal,

    #[schema(example = "95.40")]
    pub valor_concessionaria: Decimal,

    #[schema(example = "4467.10")]
    pub valor_total: Decimal,

    pub status: PagamentoStatus,

    #[schema(value_type = Option<String>, format = Date)]
    pub data_vencimento: Option<NaiveDate>,

    #[schema(value_type = Option<String>, format = Date)]
    pub data_pagamento: Option<NaiveDate>,

    #[schema(value_type = Vec<HistoricoPagamento>)]
    pub historico_status: Json<Vec<HistoricoPagamento>>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NovoPagamento {
    pub usina_id: Uuid,
    pub mes_referencia: NaiveDate,
    pub geracao_kwh: Decimal,
    pub tusd_fio_b: Decimal,
    pub valor_tusd_fio_b: Decimal,
    pub valor_concessionaria: Decimal,
    pub valor_total: Decimal,
    pub data_vencimento: Option<NaiveDate>,
}
