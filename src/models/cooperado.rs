// src/models/cooperado.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_pessoa", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TipoPessoa {
    Fisica,
    Juridica,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cooperado {
    pub id: Uuid,

    #[schema(example = "Maria da Silva")]
    pub nome: String,

    /// CPF ou CNPJ, só dígitos.
    #[schema(example = "12345678901")]
    pub documento: String,

    pub tipo_pessoa: TipoPessoa,

    #[schema(example = "maria@email.com")]
    pub email: Option<String>,

    #[schema(example = "(11) 99999-8888")]
    pub telefone: Option<String>,

    pub ativo: bool,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Unidade consumidora (conta da concessionária) que recebe o desconto.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnidadeBeneficiaria {
    pub id: Uuid,
    pub cooperado_id: Uuid,

    #[schema(example = "3001234567")]
    pub numero_uc: String,

    #[schema(example = "Casa")]
    pub apelido: Option<String>,

    #[schema(example = "Rua das Flores, 123 - Centro")]
    pub endereco: Option<String>,

    #[schema(example = "20.00")]
    pub percentual_desconto: Decimal,

    pub ativo: bool,

    pub created_at: Option<DateTime<Utc>>,
}
