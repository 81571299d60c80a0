// src/handlers/finance.rs

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
    models::finance::{ContaBancaria, Lancamento, LancamentoStatus, LancamentoTipo, NovoLancamento},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContaPayload {
    #[validate(length(min = 1, message = "O nome da conta é obrigatório."))]
    #[schema(example = "Conta Movimento")]
    pub nome: String,
    pub banco: Option<String>,
    pub agencia: Option<String>,
    pub conta: Option<String>,
    #[serde(default)]
    pub saldo_inicial: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLancamentoPayload {
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub descricao: String,

    pub tipo: LancamentoTipo,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "416.00")]
    pub valor: Decimal,

    pub conta_id: Option<Uuid>,
    pub fatura_id: Option<Uuid>,
    pub pagamento_usina_id: Option<Uuid>,

    #[schema(value_type = String, format = Date, example = "2026-10-10")]
    pub data_vencimento: NaiveDate,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagarLancamentoPayload {
    /// Conta de onde sai/entra o dinheiro; obrigatória se o lançamento não tiver uma.
    pub conta_id: Option<Uuid>,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_pagamento: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListLancamentosQuery {
    pub tipo: Option<LancamentoTipo>,
    pub status: Option<LancamentoStatus>,
    #[param(value_type = Option<String>, format = Date)]
    pub vencimento_de: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub vencimento_ate: Option<NaiveDate>,
}

// --- CONTAS ---

#[utoipa::path(
    post,
    path = "/api/finance/contas",
    tag = "Financeiro",
    request_body = CreateContaPayload,
    responses((status = 201, description = "Conta criada", body = ContaBancaria)),
    security(("api_jwt" = []))
)]
pub async fn create_conta(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateContaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state, &user).await?;

    let conta = app_state.finance_repo
        .create_conta(
            &mut *conn,
            payload.nome.trim(),
            payload.banco.as_deref(),
            payload.agencia.as_deref(),
            payload.conta.as_deref(),
            payload.saldo_inicial,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(conta)))
}

#[utoipa::path(
    get,
    path = "/api/finance/contas",
    tag = "Financeiro",
    responses((status = 200, description = "Contas bancárias", body = Vec<ContaBancaria>)),
    security(("api_jwt" = []))
)]
pub async fn list_contas(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state, &user).await?;
    let contas = app_state.finance_repo.get_all_contas(&mut *conn).await?;
    Ok((StatusCode::OK, Json(contas)))
}

// --- LANÇAMENTOS ---

#[utoipa::path(
    post,
    path = "/api/finance/lancamentos",
    tag = "Financeiro",
    request_body = CreateLancamentoPayload,
    responses(
        (status = 201, description = "Lançamento criado", body = Lancamento),
        (status = 404, description = "Vínculo inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lancamento(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateLancamentoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state, &user).await?;

    let novo = NovoLancamento {
        descricao: payload.descricao.trim().to_string(),
        tipo: payload.tipo,
        valor: payload.valor,
        conta_id: payload.conta_id,
        fatura_id: payload.fatura_id,
        pagamento_usina_id: payload.pagamento_usina_id,
        data_vencimento: payload.data_vencimento,
    };

    let lancamento = app_state.finance_service
        .create_lancamento(&mut *conn, novo)
        .await?;

    Ok((StatusCode::CREATED, Json(lancamento)))
}

#[utoipa::path(
    get,
    path = "/api/finance/lancamentos",
    tag = "Financeiro",
    params(ListLancamentosQuery),
    responses((status = 200, description = "Lançamentos por vencimento", body = Vec<Lancamento>)),
    security(("api_jwt" = []))
)]
pub async fn list_lancamentos(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListLancamentosQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state, &user).await?;

    let lancamentos = app_state.finance_repo
        .list_lancamentos(
            &mut *conn,
            query.tipo,
            query.status,
            query.vencimento_de,
            query.vencimento_ate,
        )
        .await?;

    Ok((StatusCode::OK, Json(lancamentos)))
}

#[utoipa::path(
    post,
    path = "/api/finance/lancamentos/{id}/pagar",
    tag = "Financeiro",
    request_body = PagarLancamentoPayload,
    params(("id" = Uuid, Path, description = "ID do lançamento")),
    responses(
        (status = 200, description = "Lançamento baixado e saldo atualizado", body = Lancamento),
        (status = 422, description = "Lançamento não está pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn pagar_lancamento(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<PagarLancamentoPayload>>,
) -> Result<impl IntoResponse, AppError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let mut conn = get_connection(&app_state, &user).await?;

    let pago = app_state.finance_service
        .pagar_lancamento(&mut *conn, id, payload.conta_id, payload.data_pagamento)
        .await?;

    Ok((StatusCode::OK, Json(pago)))
}

#[utoipa::path(
    post,
    path = "/api/finance/lancamentos/{id}/cancelar",
    tag = "Financeiro",
    params(("id" = Uuid, Path, description = "ID do lançamento")),
    responses(
        (status = 200, description = "Lançamento cancelado", body = Lancamento),
        (status = 422, description = "Lançamento não está pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancelar_lancamento(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state, &user).await?;

    let cancelado = app_state.finance_service
        .cancelar_lancamento(&mut *conn, id)
        .await?;

    Ok((StatusCode::OK, Json(cancelado)))
}
