// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,

        // --- Cooperados ---
        handlers::cooperados::create_cooperado,
        handlers::cooperados::list_cooperados,
        handlers::cooperados::get_cooperado,
        handlers::cooperados::update_cooperado,
        handlers::cooperados::create_unidade,
        handlers::cooperados::list_unidades,

        // --- Usinas ---
        handlers::usinas::create_investidor,
        handlers::usinas::list_investidores,
        handlers::usinas::create_usina,
        handlers::usinas::list_usinas,
        handlers::usinas::get_usina,

        // --- Cálculo ---
        handlers::calculo::create_template,
        handlers::calculo::list_templates,
        handlers::calculo::set_template_padrao,
        handlers::calculo::preview,

        // --- Faturas ---
        handlers::faturas::create_fatura,
        handlers::faturas::list_faturas,
        handlers::faturas::get_fatura,
        handlers::faturas::recalcular_fatura,
        handlers::faturas::set_arquivo,
        handlers::faturas::update_fatura_status,
        handlers::documents::gerar_fatura_pdf,

        // --- Pagamentos ---
        handlers::pagamentos::create_pagamento,
        handlers::pagamentos::list_pagamentos,
        handlers::pagamentos::get_pagamento,
        handlers::pagamentos::update_pagamento_status,
        handlers::pagamentos::get_historico,
        handlers::documents::gerar_recibo_pagamento_pdf,

        // --- Financeiro ---
        handlers::finance::create_conta,
        handlers::finance::list_contas,
        handlers::finance::create_lancamento,
        handlers::finance::list_lancamentos,
        handlers::finance::pagar_lancamento,
        handlers::finance::cancelar_lancamento,
    ),
    components(
        schemas(
            // --- Settings ---
            models::settings::CooperativaSettings,
            models::settings::UpdateSettingsRequest,

            // --- Cooperados ---
            models::cooperado::TipoPessoa,
            models::cooperado::Cooperado,
            models::cooperado::UnidadeBeneficiaria,
            handlers::cooperados::CreateCooperadoPayload,
            handlers::cooperados::UpdateCooperadoPayload,
            handlers::cooperados::CreateUnidadePayload,

            // --- Usinas ---
            models::usina::Investidor,
            models::usina::Usina,
            handlers::usinas::CreateInvestidorPayload,
            handlers::usinas::CreateUsinaPayload,

            // --- Cálculo ---
            models::fatura::FormulasCalculo,
            models::fatura::CalculoFaturaTemplate,
            models::fatura::BaseCalculo,
            models::fatura::CampoFormula,
            models::fatura::AvisoCalculo,
            models::fatura::CalculoResultado,
            handlers::calculo::CreateTemplatePayload,
            handlers::calculo::PreviewPayload,

            // --- Faturas ---
            models::fatura::FaturaStatus,
            models::fatura::HistoricoFatura,
            models::fatura::Fatura,
            models::fatura::FaturaCalculada,
            handlers::faturas::CreateFaturaPayload,
            handlers::faturas::RecalcularPayload,
            handlers::faturas::SetArquivoPayload,
            handlers::faturas::UpdateFaturaStatusPayload,

            // --- Pagamentos ---
            models::pagamento::PagamentoStatus,
            models::pagamento::FormaEnvio,
            models::pagamento::HistoricoPagamento,
            models::pagamento::PagamentoUsina,
            handlers::pagamentos::CreatePagamentoPayload,
            handlers::pagamentos::UpdatePagamentoStatusPayload,

            // --- Financeiro ---
            models::finance::LancamentoTipo,
            models::finance::LancamentoStatus,
            models::finance::ContaBancaria,
            models::finance::Lancamento,
            handlers::finance::CreateContaPayload,
            handlers::finance::CreateLancamentoPayload,
            handlers::finance::PagarLancamentoPayload,
        )
    ),
    tags(
        (name = "Settings", description = "Dados da cooperativa"),
        (name = "Cooperados", description = "Cooperados e unidades beneficiárias"),
        (name = "Usinas", description = "Usinas geradoras e investidores"),
        (name = "Cálculo", description = "Templates de fórmulas e simulação"),
        (name = "Faturas", description = "Faturas mensais dos cooperados"),
        (name = "Pagamentos", description = "Pagamentos mensais às usinas"),
        (name = "Financeiro", description = "Contas bancárias e lançamentos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_status_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/pagamentos/{id}/status"));
        assert!(doc.paths.paths.contains_key("/api/calculo/preview"));
        assert!(doc.components.unwrap().security_schemes.contains_key("api_jwt"));
    }
}
