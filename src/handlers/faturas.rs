// src/handlers/faturas.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::get_connection, error::AppError},
    config::AppState,
    handlers::validate_not_negative,
    middleware::auth::AuthenticatedUser,
    models::fatura::{Fatura, FaturaCalculada, FaturaStatus, NovaFatura},
};

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFaturaPayload {
    pub unidade_beneficiaria_id: Uuid,

    /// Qualquer dia do mês; gravamos o primeiro.
    #[schema(value_type = String, format = Date, example = "2026-09-01")]
    pub mes_referencia: NaiveDate,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "1000.00")]
    pub total_fatura: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub iluminacao_publica: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub outros_valores: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub fatura_concessionaria: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub consumo_kwh: Decimal,

    #[serde(default)]
    pub saldo_energia_kwh: Decimal,

    #[schema(value_type = Option<String>, format = Date)]
    pub data_vencimento: Option<NaiveDate>,

    /// Template a usar no lugar do padrão.
    pub template_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecalcularPayload {
    pub template_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetArquivoPayload {
    #[validate(length(min = 1, message = "O caminho do arquivo é obrigatório."))]
    #[schema(example = "faturas/2026-09/uc-3001234567.pdf")]
    pub arquivo_path: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFaturaStatusPayload {
    pub status: FaturaStatus,
    pub observacao: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListFaturasQuery {
    /// Mês de referência (qualquer dia do mês).
    #[param(value_type = Option<String>, format = Date)]
    pub mes_referencia: Option<NaiveDate>,
    pub status: Option<FaturaStatus>,
    pub unidade_beneficiaria_id: Option<Uuid>,
}

// ---
// Handlers
// ---
#[utoipa::path(
    post,
    path = "/api/faturas",
    tag = "Faturas",
    request_body = CreateFaturaPayload,
    responses(
        (status = 201, description = "Fatura criada com os valores calculados", body = FaturaCalculada),
        (status = 404, description = "Unidade ou template não encontrado"),
        (status = 409, description = "Já existe fatura da unidade no mês")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_fatura(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateFaturaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state, &user).await?;

    let nova = NovaFatura {
        unidade_beneficiaria_id: payload.unidade_beneficiaria_id,
        mes_referencia: payload.mes_referencia,
        total_fatura: payload.total_fatura,
        iluminacao_publica: payload.iluminacao_publica,
        outros_valores: payload.outros_valores,
        fatura_concessionaria: payload.fatura_concessionaria,
        consumo_kwh: payload.consumo_kwh,
        saldo_energia_kwh: payload.saldo_energia_kwh,
        data_vencimento: payload.data_vencimento,
    };

    let criada = app_state.fatura_service
        .create_fatura(&mut *conn, nova, payload.template_id)
        .await?;

    Ok((StatusCode::CREATED, Json(criada)))
}

#[utoipa::path(
    get,
    path = "/api/faturas",
    tag = "Faturas",
    params(ListFaturasQuery),
    responses(
        (status = 200, description = "Faturas filtradas", body = Vec<Fatura>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_faturas(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListFaturasQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state, &user).await?;

    let faturas = app_state.fatura_service
        .list_faturas(&mut *conn, query.mes_referencia, query.status, query.unidade_beneficiaria_id)
        .await?;

    Ok((StatusCode::OK, Json(faturas)))
}

#[utoipa::path(
    get,
    path = "/api/faturas/{id}",
    tag = "Faturas",
    params(("id" = Uuid, Path, description = "ID da fatura")),
    responses(
        (status = 200, description = "Fatura", body = Fatura),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_fatura(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state, &user).await?;
    let fatura = app_state.fatura_service.get_fatura(&mut *conn, id).await?;
    Ok((StatusCode::OK, Json(fatura)))
}

#[utoipa::path(
    post,
    path = "/api/faturas/{id}/recalcular",
    tag = "Faturas",
    request_body = RecalcularPayload,
    params(("id" = Uuid, Path, description = "ID da fatura")),
    responses(
        (status = 200, description = "Valores recalculados", body = FaturaCalculada),
        (status = 422, description = "Fatura já paga")
    ),
    security(("api_jwt" = []))
)]
pub async fn recalcular_fatura(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<RecalcularPayload>>,
) -> Result<impl IntoResponse, AppError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let mut conn = get_connection(&app_state, &user).await?;

    let recalculada = app_state.fatura_service
        .recalcular(&mut *conn, id, payload.template_id)
        .await?;

    Ok((StatusCode::OK, Json(recalculada)))
}

#[utoipa::path(
    put,
    path = "/api/faturas/{id}/arquivo",
    tag = "Faturas",
    request_body = SetArquivoPayload,
    params(("id" = Uuid, Path, description = "ID da fatura")),
    responses(
        (status = 200, description = "Referência do arquivo gravada", body = Fatura)
    ),
    security(("api_jwt" = []))
)]
pub async fn set_arquivo(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetArquivoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state, &user).await?;

    let fatura = app_state.fatura_service
        .set_arquivo(&mut *conn, id, &payload.arquivo_path)
        .await?;

    Ok((StatusCode::OK, Json(fatura)))
}

#[utoipa::path(
    put,
    path = "/api/faturas/{id}/status",
    tag = "Faturas",
    request_body = UpdateFaturaStatusPayload,
    params(("id" = Uuid, Path, description = "ID da fatura")),
    responses(
        (status = 200, description = "Status alterado e registrado no histórico", body = Fatura),
        (status = 404, description = "Não encontrada"),
        (status = 422, description = "Transição recusada pelo banco")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_fatura_status(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFaturaStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state, &user).await?;

    let fatura = app_state.fatura_service
        .atualizar_status(&mut *conn, id, payload.status, payload.observacao.as_deref())
        .await?;

    Ok((StatusCode::OK, Json(fatura)))
}
