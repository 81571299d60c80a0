// src/handlers/cooperados.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::get_connection, error::AppError},
    config::AppState,
    handlers::validate_percentual,
    middleware::auth::AuthenticatedUser,
    models::cooperado::{Cooperado, TipoPessoa, UnidadeBeneficiaria},
};

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCooperadoPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Maria da Silva")]
    pub nome: String,

    #[validate(length(min = 11, max = 14, message = "Documento deve ser CPF (11) ou CNPJ (14) dígitos."))]
    #[schema(example = "12345678901")]
    pub documento: String,

    #[serde(default = "tipo_pessoa_padrao")]
    pub tipo_pessoa: TipoPessoa,

    #[validate(email(message = "E-mail inválido."))]
    pub email: Option<String>,

    pub telefone: Option<String>,
}

fn tipo_pessoa_padrao() -> TipoPessoa {
    TipoPessoa::Fisica
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCooperadoPayload {
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub nome: Option<String>,

    #[validate(email(message = "E-mail inválido."))]
    pub email: Option<String>,

    pub telefone: Option<String>,
    pub ativo: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUnidadePayload {
    #[validate(length(min = 1, message = "O número da UC é obrigatório."))]
    #[schema(example = "3001234567")]
    pub numero_uc: String,

    pub apelido: Option<String>,
    pub endereco: Option<String>,

    #[validate(custom(function = "validate_percentual"))]
    #[schema(example = "20.00")]
    pub percentual_desconto: Decimal,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListCooperadosQuery {
    /// Trecho do nome ou do documento.
    pub busca: Option<String>,
}

// ---
// Handlers
// ---
#[utoipa::path(
    post,
    path = "/api/cooperados",
    tag = "Cooperados",
    request_body = CreateCooperadoPayload,
    responses(
        (status = 201, description = "Cooperado criado", body = Cooperado),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Documento já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_cooperado(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateCooperadoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state, &user).await?;

    let cooperado = app_state.cooperado_repo
        .create_cooperado(
            &mut *conn,
            payload.nome.trim(),
            &payload.documento,
            payload.tipo_pessoa,
            payload.email.as_deref(),
            payload.telefone.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(cooperado)))
}

#[utoipa::path(
    get,
    path = "/api/cooperados",
    tag = "Cooperados",
    params(ListCooperadosQuery),
    responses(
        (status = 200, description = "Lista de cooperados", body = Vec<Cooperado>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_cooperados(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListCooperadosQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state, &user).await?;

    let busca = query.busca.as_deref().map(str::trim).filter(|b| !b.is_empty());
    let cooperados = app_state.cooperado_repo
        .list_cooperados(&mut *conn, busca)
        .await?;

    Ok((StatusCode::OK, Json(cooperados)))
}

#[utoipa::path(
    get,
    path = "/api/cooperados/{id}",
    tag = "Cooperados",
    params(("id" = Uuid, Path, description = "ID do cooperado")),
    responses(
        (status = 200, description = "Cooperado", body = Cooperado),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_cooperado(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state, &user).await?;

    let cooperado = app_state.cooperado_repo
        .get_cooperado(&mut *conn, id)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound(format!("Cooperado {}", id)))?;

    Ok((StatusCode::OK, Json(cooperado)))
}

#[utoipa::path(
    put,
    path = "/api/cooperados/{id}",
    tag = "Cooperados",
    request_body = UpdateCooperadoPayload,
    params(("id" = Uuid, Path, description = "ID do cooperado")),
    responses(
        (status = 200, description = "Cooperado atualizado", body = Cooperado),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_cooperado(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCooperadoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state, &user).await?;

    let cooperado = app_state.cooperado_repo
        .update_cooperado(
            &mut *conn,
            id,
            payload.nome.as_deref().map(str::trim),
            payload.email.as_deref(),
            payload.telefone.as_deref(),
            payload.ativo,
        )
        .await?
        .ok_or_else(|| AppError::ResourceNotFound(format!("Cooperado {}", id)))?;

    Ok((StatusCode::OK, Json(cooperado)))
}

#[utoipa::path(
    post,
    path = "/api/cooperados/{id}/unidades",
    tag = "Cooperados",
    request_body = CreateUnidadePayload,
    params(("id" = Uuid, Path, description = "ID do cooperado")),
    responses(
        (status = 201, description = "Unidade beneficiária criada", body = UnidadeBeneficiaria),
        (status = 404, description = "Cooperado não encontrado"),
        (status = 409, description = "UC já cadastrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_unidade(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(cooperado_id): Path<Uuid>,
    Json(payload): Json<CreateUnidadePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state, &user).await?;

    let unidade = app_state.cooperado_repo
        .create_unidade(
            &mut *conn,
            cooperado_id,
            payload.numero_uc.trim(),
            payload.apelido.as_deref(),
            payload.endereco.as_deref(),
            payload.percentual_desconto,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(unidade)))
}

#[utoipa::path(
    get,
    path = "/api/cooperados/{id}/unidades",
    tag = "Cooperados",
    params(("id" = Uuid, Path, description = "ID do cooperado")),
    responses(
        (status = 200, description = "Unidades do cooperado", body = Vec<UnidadeBeneficiaria>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_unidades(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(cooperado_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state, &user).await?;

    let unidades = app_state.cooperado_repo
        .list_unidades(&mut *conn, cooperado_id)
        .await?;

    Ok((StatusCode::OK, Json(unidades)))
}
