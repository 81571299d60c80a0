// src/handlers/settings.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::{
        error::AppError,
        db_utils::get_connection,
    },
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::settings::{CooperativaSettings, UpdateSettingsRequest},
};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Dados da cooperativa (vazios se nunca configurados)", body = CooperativaSettings)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {

    // Conexão da pool
    let mut conn = get_connection(&app_state, &user).await?;

    let settings = app_state.settings_repo
        .get_settings(&mut *conn)
        .await?;

    Ok((StatusCode::OK, Json(settings)))
}

// PUT /api/settings
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Configurações salvas", body = CooperativaSettings)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, AppError> {

    let mut conn = get_connection(&app_state, &user).await?;

    let updated = app_state.settings_repo
        .update_settings(&mut *conn, payload)
        .await?;

    Ok((StatusCode::OK, Json(updated)))
}
