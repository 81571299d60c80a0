// src/models/finance.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use sqlx::FromRow;
use chrono::{DateTime, Utc, NaiveDate};
use rust_decimal::Decimal;
use utoipa::ToSchema;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lancamento_tipo", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LancamentoTipo {
    Receita, // Entrada
    Despesa, // Saída
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lancamento_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LancamentoStatus {
    Pendente,
    Pago,
    Cancelado,
}

impl LancamentoTipo {
    /// Efeito do lançamento no saldo da conta.
    pub fn efeito_no_saldo(&self, valor: Decimal) -> Decimal {
        match self {
            LancamentoTipo::Receita => valor,
            LancamentoTipo::Despesa => -valor,
        }
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContaBancaria {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(example = "Conta Movimento")]
    pub nome: String,

    #[schema(example = "Banco do Brasil")]
    pub banco: Option<String>,

    #[schema(example = "1234-5")]
    pub agencia: Option<String>,

    #[schema(example = "98765-0")]
    pub conta: Option<String>,

    #[schema(example = "1500.50")]
    pub saldo_atual: Decimal,

    pub ativo: bool,

    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lancamento {
    pub id: Uuid,

    #[schema(example = "Assinatura UC 3001234567 - 09/2026")]
    pub descricao: String,

    pub tipo: LancamentoTipo,
    pub status: LancamentoStatus,

    #[schema(example = "416.00")]
    pub valor: Decimal,

    // Vínculos
    pub conta_id: Option<Uuid>,
    pub fatura_id: Option<Uuid>,
    pub pagamento_usina_id: Option<Uuid>,

    // Datas
    #[schema(value_type = String, format = Date, example = "2026-10-10")]
    pub data_vencimento: NaiveDate,
    #[schema(value_type = Option<String>, format = Date, example = "2026-10-08")]
    pub data_pagamento: Option<NaiveDate>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NovoLancamento {
    pub descricao: String,
    pub tipo: LancamentoTipo,
    pub valor: Decimal,
    pub conta_id: Option<Uuid>,
    pub fatura_id: Option<Uuid>,
    pub pagamento_usina_id: Option<Uuid>,
    pub data_vencimento: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn revenue_increases_and_expense_decreases_balance() {
        assert_eq!(LancamentoTipo::Receita.efeito_no_saldo(dec!(416)), dec!(416));
        assert_eq!(LancamentoTipo::Despesa.efeito_no_saldo(dec!(416)), dec!(-416));
    }
}
