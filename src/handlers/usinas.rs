// src/handlers/usinas.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::get_connection, error::AppError},
    config::AppState,
    handlers::validate_not_negative,
    middleware::auth::AuthenticatedUser,
    models::usina::{Investidor, Usina},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvestidorPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Solar Invest Ltda")]
    pub nome: String,

    #[validate(length(min = 11, max = 14, message = "Documento deve ser CPF (11) ou CNPJ (14) dígitos."))]
    #[schema(example = "12345678000199")]
    pub documento: String,

    #[validate(email(message = "E-mail inválido."))]
    pub email: Option<String>,

    pub telefone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUsinaPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Usina Sol Nascente")]
    pub nome: String,

    pub investidor_id: Option<Uuid>,
    pub numero_uc: Option<String>,

    #[schema(example = "75.00")]
    pub potencia_kwp: Option<Decimal>,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "0.45")]
    pub valor_kwh: Decimal,
}

// --- INVESTIDORES ---

#[utoipa::path(
    post,
    path = "/api/investidores",
    tag = "Usinas",
    request_body = CreateInvestidorPayload,
    responses(
        (status = 201, description = "Investidor criado", body = Investidor),
        (status = 409, description = "Documento já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_investidor(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateInvestidorPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state, &user).await?;

    let investidor = app_state.usina_repo
        .create_investidor(
            &mut *conn,
            payload.nome.trim(),
            &payload.documento,
            payload.email.as_deref(),
            payload.telefone.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(investidor)))
}

#[utoipa::path(
    get,
    path = "/api/investidores",
    tag = "Usinas",
    responses(
        (status = 200, description = "Lista de investidores", body = Vec<Investidor>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_investidores(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state, &user).await?;
    let investidores = app_state.usina_repo.list_investidores(&mut *conn).await?;
    Ok((StatusCode::OK, Json(investidores)))
}

// --- USINAS ---

#[utoipa::path(
    post,
    path = "/api/usinas",
    tag = "Usinas",
    request_body = CreateUsinaPayload,
    responses(
        (status = 201, description = "Usina criada", body = Usina),
        (status = 404, description = "Investidor não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_usina(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateUsinaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_connection(&app_state, &user).await?;

    let usina = app_state.usina_repo
        .create_usina(
            &mut *conn,
            payload.nome.trim(),
            payload.investidor_id,
            payload.numero_uc.as_deref(),
            payload.potencia_kwp,
            payload.valor_kwh,
        )
        .await?;

    tracing::info!("☀️ Usina '{}' cadastrada", usina.nome);
    Ok((StatusCode::CREATED, Json(usina)))
}

#[utoipa::path(
    get,
    path = "/api/usinas",
    tag = "Usinas",
    responses(
        (status = 200, description = "Lista de usinas", body = Vec<Usina>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_usinas(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state, &user).await?;
    let usinas = app_state.usina_repo.list_usinas(&mut *conn).await?;
    Ok((StatusCode::OK, Json(usinas)))
}

#[utoipa::path(
    get,
    path = "/api/usinas/{id}",
    tag = "Usinas",
    params(("id" = Uuid, Path, description = "ID da usina")),
    responses(
        (status = 200, description = "Usina", body = Usina),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_usina(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state, &user).await?;

    let usina = app_state.usina_repo
        .get_usina(&mut *conn, id)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound(format!("Usina {}", id)))?;

    Ok((StatusCode::OK, Json(usina)))
}
