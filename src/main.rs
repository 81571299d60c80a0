//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

fn api_routes() -> Router<AppState> {
    let cooperado_routes = Router::new()
        .route("/"
               ,post(handlers::cooperados::create_cooperado)
               .get(handlers::cooperados::list_cooperados)
        )
        .route("/{id}"
               ,get(handlers::cooperados::get_cooperado)
               .put(handlers::cooperados::update_cooperado)
        )
        .route("/{id}/unidades"
               ,post(handlers::cooperados::create_unidade)
               .get(handlers::cooperados::list_unidades)
        );

    let investidor_routes = Router::new()
        .route("/"
               ,post(handlers::usinas::create_investidor)
               .get(handlers::usinas::list_investidores)
        );

    let usina_routes = Router::new()
        .route("/"
               ,post(handlers::usinas::create_usina)
               .get(handlers::usinas::list_usinas)
        )
        .route("/{id}", get(handlers::usinas::get_usina));

    let calculo_routes = Router::new()
        .route("/templates"
               ,post(handlers::calculo::create_template)
               .get(handlers::calculo::list_templates)
        )
        .route("/templates/{id}/padrao", put(handlers::calculo::set_template_padrao))
        .route("/preview", post(handlers::calculo::preview));

    let fatura_routes = Router::new()
        .route("/"
               ,post(handlers::faturas::create_fatura)
               .get(handlers::faturas::list_faturas)
        )
        .route("/{id}", get(handlers::faturas::get_fatura))
        .route("/{id}/recalcular", post(handlers::faturas::recalcular_fatura))
        .route("/{id}/arquivo", put(handlers::faturas::set_arquivo))
        .route("/{id}/status", put(handlers::faturas::update_fatura_status))
        .route("/{id}/pdf", get(handlers::documents::gerar_fatura_pdf));

    let pagamento_routes = Router::new()
        .route("/"
               ,post(handlers::pagamentos::create_pagamento)
               .get(handlers::pagamentos::list_pagamentos)
        )
        .route("/{id}", get(handlers::pagamentos::get_pagamento))
        .route("/{id}/status", put(handlers::pagamentos::update_pagamento_status))
        .route("/{id}/historico", get(handlers::pagamentos::get_historico))
        .route("/{id}/pdf", get(handlers::documents::gerar_recibo_pagamento_pdf));

    let finance_routes = Router::new()
        .route("/contas"
               ,post(handlers::finance::create_conta)
               .get(handlers::finance::list_contas)
        )
        .route("/lancamentos"
               ,post(handlers::finance::create_lancamento)
               .get(handlers::finance::list_lancamentos)
        )
        .route("/lancamentos/{id}/pagar", post(handlers::finance::pagar_lancamento))
        .route("/lancamentos/{id}/cancelar", post(handlers::finance::cancelar_lancamento));

    Router::new()
        .route("/settings"
               ,get(handlers::settings::get_settings)
               .put(handlers::settings::update_settings)
        )
        .nest("/cooperados", cooperado_routes)
        .nest("/investidores", investidor_routes)
        .nest("/usinas", usina_routes)
        .nest("/calculo", calculo_routes)
        .nest("/faturas", fatura_routes)
        .nest("/pagamentos", pagamento_routes)
        .nest("/finance", finance_routes)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG manda; sem ele, "info".
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new(&config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Tudo em /api exige o JWT
    let protected = api_routes().layer(axum_middleware::from_fn_with_state(
        app_state.clone(),
        auth_guard,
    ));

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", protected)
        .with_state(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&config.server_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
