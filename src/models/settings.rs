// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Dados da cooperativa usados nos PDFs e nas telas de configuração.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CooperativaSettings {
    #[schema(example = "Cooperativa Energia Solidária")]
    pub nome: Option<String>,

    #[schema(example = "12.345.678/0001-99")]
    pub cnpj: Option<String>,

    #[schema(example = "Rua das Flores, 123 - Centro")]
    pub endereco: Option<String>,

    #[schema(example = "(11) 99999-8888")]
    pub telefone: Option<String>,

    #[schema(example = "contato@cooperativa.coop.br")]
    pub email: Option<String>,

    #[schema(example = "12.345.678/0001-99")]
    pub chave_pix: Option<String>,

    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[schema(example = "Cooperativa Energia Solidária")]
    pub nome: Option<String>,

    #[schema(example = "12.345.678/0001-99")]
    pub cnpj: Option<String>,

    #[schema(example = "Av. Paulista, 1000")]
    pub endereco: Option<String>,

    pub telefone: Option<String>,
    pub email: Option<String>,

    #[schema(example = "chave@pix.com.br")]
    pub chave_pix: Option<String>,
}
