// src/models/fatura.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "fatura_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FaturaStatus {
    Pendente,
    Enviada,
    Reenviada,
    Corrigida,
    Atrasada,
    Paga,
}

// --- Templates de cálculo ---

/// As duas fórmulas de um template. `formula_valor_assinatura` pode usar
/// `valor_desconto`, já calculado pela primeira.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormulasCalculo {
    #[schema(example = "(total_fatura - iluminacao_publica - outros_valores) * percentual_desconto / 100")]
    pub formula_valor_desconto: String,

    #[schema(example = "total_fatura - valor_desconto - fatura_concessionaria")]
    pub formula_valor_assinatura: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculoFaturaTemplate {
    pub id: Uuid,

    #[schema(example = "Padrão cooperativa")]
    pub nome: String,

    #[sqlx(flatten)]
    #[serde(flatten)]
    pub formulas: FormulasCalculo,

    /// Template usado quando a fatura não indica outro.
    pub is_padrao: bool,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// --- Fatura ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoricoFatura {
    pub data: DateTime<Utc>,
    pub status_anterior: FaturaStatus,
    pub novo_status: FaturaStatus,
    pub observacao: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Fatura {
    pub id: Uuid,
    pub unidade_beneficiaria_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2026-09-01")]
    pub mes_referencia: NaiveDate,

    // Valores da concessionária
    #[schema(example = "1000.00")]
    pub total_fatura: Decimal,
    #[schema(example = "50.00")]
    pub iluminacao_publica: Decimal,
    #[schema(example = "30.00")]
    pub outros_valores: Decimal,
    #[schema(example = "400.00")]
    pub fatura_concessionaria: Decimal,

    // Energia
    #[schema(example = "850.00")]
    pub consumo_kwh: Decimal,
    #[schema(example = "120.00")]
    pub saldo_energia_kwh: Decimal,

    // Herdado da unidade beneficiária no momento do cálculo
    #[schema(example = "20.00")]
    pub percentual_desconto: Decimal,

    // Calculados
    #[schema(example = "184.00")]
    pub valor_desconto: Decimal,
    #[schema(example = "416.00")]
    pub valor_assinatura: Decimal,
    #[schema(example = "184.00")]
    pub economia: Decimal,

    pub status: FaturaStatus,

    /// Caminho do PDF da concessionária no storage.
    #[schema(example = "faturas/2026-09/uc-123456.pdf")]
    pub arquivo_path: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "2026-10-10")]
    pub data_vencimento: Option<NaiveDate>,

    #[schema(value_type = Vec<HistoricoFatura>)]
    pub historico_status: Json<Vec<HistoricoFatura>>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Dados de entrada de uma fatura, lidos da conta da concessionária.
#[derive(Debug, Clone)]
pub struct NovaFatura {
    pub unidade_beneficiaria_id: Uuid,
    pub mes_referencia: NaiveDate,
    pub total_fatura: Decimal,
    pub iluminacao_publica: Decimal,
    pub outros_valores: Decimal,
    pub fatura_concessionaria: Decimal,
    pub consumo_kwh: Decimal,
    pub saldo_energia_kwh: Decimal,
    pub data_vencimento: Option<NaiveDate>,
}

// --- Cálculo ---

/// Variáveis disponíveis para as fórmulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BaseCalculo {
    #[schema(example = "1000.00")]
    pub total_fatura: Decimal,
    #[schema(example = "50.00")]
    pub iluminacao_publica: Decimal,
    #[schema(example = "30.00")]
    pub outros_valores: Decimal,
    #[schema(example = "400.00")]
    pub fatura_concessionaria: Decimal,
    #[schema(example = "20")]
    pub percentual_desconto: Decimal,
}

impl From<&Fatura> for BaseCalculo {
    fn from(fatura: &Fatura) -> Self {
        Self {
            total_fatura: fatura.total_fatura,
            iluminacao_publica: fatura.iluminacao_publica,
            outros_valores: fatura.outros_valores,
            fatura_concessionaria: fatura.fatura_concessionaria,
            percentual_desconto: fatura.percentual_desconto,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum CampoFormula {
    ValorDesconto,
    ValorAssinatura,
}

/// Aviso exibido ao usuário quando uma fórmula do template falhou e o
/// método padrão foi usado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvisoCalculo {
    pub campo: CampoFormula,
    #[schema(example = "Erro na fórmula de valor do desconto. Usando método padrão.")]
    pub mensagem: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculoResultado {
    #[schema(example = "184.00")]
    pub valor_desconto: Decimal,
    #[schema(example = "416.00")]
    pub valor_assinatura: Decimal,
    #[schema(example = "184.00")]
    pub economia: Decimal,
    pub avisos: Vec<AvisoCalculo>,
}

/// Fatura gravada junto com os avisos do cálculo que a produziu.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FaturaCalculada {
    pub fatura: Fatura,
    pub avisos: Vec<AvisoCalculo>,
}
