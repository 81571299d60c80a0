// src/handlers/calculo.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    common::{db_utils::get_connection, error::AppError},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::fatura::{BaseCalculo, CalculoFaturaTemplate, CalculoResultado, CampoFormula, FormulasCalculo},
    services::calculo_service::verificar_formulas,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplatePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Padrão cooperativa")]
    pub nome: String,

    #[serde(flatten)]
    pub formulas: FormulasCalculo,

    #[serde(default)]
    pub is_padrao: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewPayload {
    pub base: BaseCalculo,

    /// Fórmulas ainda não salvas. Têm precedência sobre `templateId`.
    pub formulas: Option<FormulasCalculo>,

    /// Template salvo; sem ele, usa o padrão.
    pub template_id: Option<Uuid>,
}

/// Fórmula com erro estrutural vira erro de validação no campo correspondente.
fn validar_formulas(formulas: &FormulasCalculo) -> Result<(), AppError> {
    if let Err((campo, erro)) = verificar_formulas(formulas) {
        let nome_campo = match campo {
            CampoFormula::ValorDesconto => "formulaValorDesconto",
            CampoFormula::ValorAssinatura => "formulaValorAssinatura",
        };
        let mut err = ValidationError::new("formula");
        err.message = Some(erro.kind.to_string().into());

        let mut errors = ValidationErrors::new();
        errors.add(nome_campo, err);
        return Err(AppError::ValidationError(errors));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/calculo/templates",
    tag = "Cálculo",
    request_body = CreateTemplatePayload,
    responses(
        (status = 201, description = "Template criado", body = CalculoFaturaTemplate),
        (status = 400, description = "Fórmula inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_template(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateTemplatePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    validar_formulas(&payload.formulas)?;

    let mut conn = get_connection(&app_state, &user).await?;

    let template = app_state.fatura_service
        .create_template(&mut *conn, payload.nome.trim(), &payload.formulas, payload.is_padrao)
        .await?;

    Ok((StatusCode::CREATED, Json(template)))
}

#[utoipa::path(
    get,
    path = "/api/calculo/templates",
    tag = "Cálculo",
    responses(
        (status = 200, description = "Templates, o padrão primeiro", body = Vec<CalculoFaturaTemplate>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_templates(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state, &user).await?;
    let templates = app_state.fatura_repo.list_templates(&mut *conn).await?;
    Ok((StatusCode::OK, Json(templates)))
}

#[utoipa::path(
    put,
    path = "/api/calculo/templates/{id}/padrao",
    tag = "Cálculo",
    params(("id" = Uuid, Path, description = "ID do template")),
    responses(
        (status = 200, description = "Template marcado como padrão", body = CalculoFaturaTemplate),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_template_padrao(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state, &user).await?;

    let template = app_state.fatura_service
        .definir_template_padrao(&mut *conn, id)
        .await?;

    Ok((StatusCode::OK, Json(template)))
}

#[utoipa::path(
    post,
    path = "/api/calculo/preview",
    tag = "Cálculo",
    request_body = PreviewPayload,
    responses(
        (status = 200, description = "Resultado do cálculo, com avisos de fallback", body = CalculoResultado),
        (status = 404, description = "Template não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn preview(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<PreviewPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_connection(&app_state, &user).await?;

    let resultado = app_state.fatura_service
        .preview(&mut *conn, payload.base, payload.template_id, payload.formulas)
        .await?;

    Ok((StatusCode::OK, Json(resultado)))
}
