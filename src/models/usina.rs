// src/models/usina.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Investidor {
    pub id: Uuid,

    #[schema(example = "Solar Invest Ltda")]
    pub nome: String,

    #[schema(example = "12345678000199")]
    pub documento: String,

    pub email: Option<String>,
    pub telefone: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Usina {
    pub id: Uuid,

    #[schema(example = "Usina Sol Nascente")]
    pub nome: String,

    pub investidor_id: Option<Uuid>,

    /// UC da usina na concessionária.
    #[schema(example = "3009876543")]
    pub numero_uc: Option<String>,

    #[schema(example = "75.00")]
    pub potencia_kwp: Option<Decimal>,

    /// Valor pago ao investidor por kWh gerado.
    #[schema(example = "0.4500")]
    pub valor_kwh: Decimal,

    pub ativo: bool,

    pub created_at: Option<DateTime<Utc>>,
}
