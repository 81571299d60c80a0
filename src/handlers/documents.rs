// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    common::{db_utils::get_connection, error::AppError},
    config::AppState,
    middleware::auth::AuthenticatedUser,
};

fn pdf_response(pdf_bytes: Vec<u8>, filename: String) -> Response {
    // Configura os Headers para o navegador baixar ou mostrar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
    ];

    (headers, pdf_bytes).into_response()
}

#[utoipa::path(
    get,
    path = "/api/faturas/{id}/pdf",
    tag = "Faturas",
    params(("id" = Uuid, Path, description = "ID da fatura")),
    responses(
        (status = 200, description = "PDF da fatura", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "Fatura não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn gerar_fatura_pdf(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(fatura_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let mut conn = get_connection(&app_state, &user).await?;

    let pdf_bytes = app_state.document_service
        .gerar_fatura_pdf(&mut *conn, fatura_id)
        .await?;

    Ok(pdf_response(pdf_bytes, format!("fatura_{}.pdf", fatura_id)))
}

#[utoipa::path(
    get,
    path = "/api/pagamentos/{id}/pdf",
    tag = "Pagamentos",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Recibo ou demonstrativo do pagamento", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "Pagamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn gerar_recibo_pagamento_pdf(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(pagamento_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let mut conn = get_connection(&app_state, &user).await?;

    let pdf_bytes = app_state.document_service
        .gerar_recibo_pagamento_pdf(&mut *conn, pagamento_id)
        .await?;

    Ok(pdf_response(pdf_bytes, format!("pagamento_{}.pdf", pagamento_id)))
}
