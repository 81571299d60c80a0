// src/handlers/pagamentos.rs

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
    models::pagamento::{FormaEnvio, HistoricoPagamento, PagamentoStatus, PagamentoUsina},
    services::pagamento_service::DadosPagamento,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePagamentoPayload {
    pub usina_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2026-09-01")]
    pub mes_referencia: NaiveDate,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "12500")]
    pub geracao_kwh: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    #[schema(example = "0.085")]
    pub tusd_fio_b: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    #[schema(example = "95.40")]
    pub valor_concessionaria: Decimal,

    /// Sobrescreve o valor calculado a partir do kWh da usina.
    pub valor_total: Option<Decimal>,

    #[schema(value_type = Option<String>, format = Date)]
    pub data_vencimento: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePagamentoStatusPayload {
    pub status: PagamentoStatus,
    pub forma_envio: Option<FormaEnvio>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListPagamentosQuery {
    pub usina_id: Option<Uuid>,
    #[param(value_type = Option<String>, format = Date)]
    pub mes_referencia: Option<NaiveDate>,
    pub status: Option<PagamentoStatus>,
}

#[utoipa::path(
    post,
    path = "/api/pagamentos",
    tag = "Pagamentos",
    request_body = CreatePagamentoPayload,
    responses(
        (status = 201, description = "Pagamento da usina criado", body = PagamentoUsina),
        (status = 404, description = "Usina não encontrada"),
        (status = 409, description = "Já existe pagamento da usina no mês")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_pagamento(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreatePagamentoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state, &user).await?;

    let dados = DadosPagamento {
        usina_id: payload.usina_id,
        mes_referencia: payload.mes_referencia,
        geracao_kwh: payload.geracao_kwh,
        tusd_fio_b: payload.tusd_fio_b,
        valor_concessionaria: payload.valor_concessionaria,
        valor_total: payload.valor_total,
        data_vencimento: payload.data_vencimento,
    };

    let pagamento = app_state.pagamento_service
        .create_pagamento(&mut *conn, dados)
        .await?;

    Ok((StatusCode::CREATED, Json(pagamento)))
}

#[utoipa::path(
    get,
    path = "/api/pagamentos",
    tag = "Pagamentos",
    params(ListPagamentosQuery),
    responses(
        (status = 200, description = "Pagamentos filtrados", body = Vec<PagamentoUsina>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_pagamentos(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListPagamentosQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state, &user).await?;

    let pagamentos = app_state.pagamento_service
        .list_pagamentos(&mut *conn, query.usina_id, query.mes_referencia, query.status)
        .await?;

    Ok((StatusCode::OK, Json(pagamentos)))
}

#[utoipa::path(
    get,
    path = "/api/pagamentos/{id}",
    tag = "Pagamentos",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Pagamento", body = PagamentoUsina),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_pagamento(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state, &user).await?;
    let pagamento = app_state.pagamento_service.get_pagamento(&mut *conn, id).await?;
    Ok((StatusCode::OK, Json(pagamento)))
}

#[utoipa::path(
    put,
    path = "/api/pagamentos/{id}/status",
    tag = "Pagamentos",
    request_body = UpdatePagamentoStatusPayload,
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Status alterado; histórico atualizado", body = PagamentoUsina),
        (status = 404, description = "Não encontrado"),
        (status = 422, description = "Transição recusada pelo banco")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_pagamento_status(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePagamentoStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let pagamento = app_state.pagamento_service
        .atualizar_status(id, payload.status, payload.forma_envio)
        .await?;

    Ok((StatusCode::OK, Json(pagamento)))
}

#[utoipa::path(
    get,
    path = "/api/pagamentos/{id}/historico",
    tag = "Pagamentos",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Mudanças de status, da mais antiga para a mais nova", body = Vec<HistoricoPagamento>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_historico(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state, &user).await?;
    let historico = app_state.pagamento_service.historico(&mut *conn, id).await?;
    Ok((StatusCode::OK, Json(historico)))
}
