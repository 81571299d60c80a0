// src/services/document_service.rs

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        format::{format_brl, format_mes_referencia},
    },
    db::{CooperadoRepository, FaturaRepository, PagamentoRepository, SettingsRepository, UsinaRepository},
    models::{
        fatura::Fatura,
        pagamento::{PagamentoStatus, PagamentoUsina},
        settings::CooperativaSettings,
    },
};

const NOME_PADRAO: &str = "COOPERATIVA DE ENERGIA";

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::Error::msg(e.to_string()))
}

/// Linhas "rótulo / valor" do quadro de valores da fatura.
pub fn resumo_fatura(fatura: &Fatura) -> Vec<(&'static str, String)> {
    vec![
        ("Total da conta da concessionária", format_brl(fatura.total_fatura)),
        ("Iluminação pública", format_brl(fatura.iluminacao_publica)),
        ("Outros valores", format_brl(fatura.outros_valores)),
        ("Fatura da concessionária (a pagar)", format_brl(fatura.fatura_concessionaria)),
        ("Desconto", format!("{}%", fatura.percentual_desconto.normalize())),
        ("Valor do desconto", format_brl(fatura.valor_desconto)),
        ("Valor da assinatura", format_brl(fatura.valor_assinatura)),
    ]
}

/// Linhas do demonstrativo de pagamento da usina.
pub fn resumo_pagamento(pagamento: &PagamentoUsina) -> Vec<(&'static str, String)> {
    vec![
        ("Geração (kWh)", pagamento.geracao_kwh.normalize().to_string()),
        ("TUSD Fio B (R$/kWh)", pagamento.tusd_fio_b.normalize().to_string()),
        ("Valor TUSD Fio B", format_brl(pagamento.valor_tusd_fio_b)),
        ("Fatura da concessionária", format_brl(pagamento.valor_concessionaria)),
        ("Valor a receber", format_brl(pagamento.valor_total)),
    ]
}

#[derive(Clone)]
pub struct DocumentService {
    fonts_dir: String,
    fatura_repo: FaturaRepository,
    cooperado_repo: CooperadoRepository,
    pagamento_repo: PagamentoRepository,
    usina_repo: UsinaRepository,
    settings_repo: SettingsRepository,
}

impl DocumentService {
    pub fn new(
        fonts_dir: String,
        fatura_repo: FaturaRepository,
        cooperado_repo: CooperadoRepository,
        pagamento_repo: PagamentoRepository,
        usina_repo: UsinaRepository,
        settings_repo: SettingsRepository,
    ) -> Self {
        Self { fonts_dir, fatura_repo, cooperado_repo, pagamento_repo, usina_repo, settings_repo }
    }

    fn novo_documento(&self, titulo: String) -> Result<genpdf::Document, AppError> {
        // Carrega a fonte da pasta configurada
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, "Roboto", None)
            .map_err(|_| AppError::FontNotFound(format!("Fonte Roboto não encontrada em {}", self.fonts_dir)))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(titulo);
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);
        Ok(doc)
    }

    fn cabecalho(doc: &mut genpdf::Document, settings: &CooperativaSettings) {
        let nome = settings.nome.clone().unwrap_or_else(|| NOME_PADRAO.to_string());
        doc.push(elements::Paragraph::new(nome)
            .styled(style::Style::new().bold().with_font_size(18)));

        if let Some(cnpj) = &settings.cnpj {
            doc.push(elements::Paragraph::new(format!("CNPJ: {}", cnpj))
                .styled(style::Style::new().with_font_size(10)));
        }

        doc.push(elements::Break::new(1.5));
    }

    fn quadro_valores(
        doc: &mut genpdf::Document,
        linhas: Vec<(&'static str, String)>,
    ) -> Result<(), AppError> {
        let mut table = elements::TableLayout::new(vec![3, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        for (rotulo, valor) in linhas {
            let mut valor = elements::Paragraph::new(valor);
            valor.set_alignment(genpdf::Alignment::Right);
            table.row()
                .element(elements::Paragraph::new(rotulo))
                .element(valor)
                .push()
                .map_err(pdf_error)?;
        }

        doc.push(table);
        Ok(())
    }

    fn rodape(doc: &mut genpdf::Document, settings: &CooperativaSettings) {
        let contato: Vec<&str> = [&settings.endereco, &settings.telefone, &settings.email]
            .into_iter()
            .filter_map(|c| c.as_deref())
            .collect();

        if !contato.is_empty() {
            doc.push(elements::Break::new(2));
            doc.push(elements::Paragraph::new(contato.join(" | "))
                .styled(style::Style::new().italic().with_font_size(8)));
        }
    }

    fn renderizar(doc: genpdf::Document) -> Result<Vec<u8>, AppError> {
        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(pdf_error)?;
        Ok(buffer)
    }

    // --- FATURA DO COOPERADO ---

    pub async fn gerar_fatura_pdf<'e, E>(
        &self,
        executor: E,
        fatura_id: Uuid,
    ) -> Result<Vec<u8>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let fatura = self.fatura_repo
            .get_fatura(&mut *tx, fatura_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Fatura {}", fatura_id)))?;
        let unidade = self.cooperado_repo
            .get_unidade(&mut *tx, fatura.unidade_beneficiaria_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Unidade {}", fatura.unidade_beneficiaria_id)))?;
        let cooperado = self.cooperado_repo
            .get_cooperado(&mut *tx, unidade.cooperado_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Cooperado {}", unidade.cooperado_id)))?;
        let settings = self.settings_repo.get_settings(&mut *tx).await?;

        tx.commit().await?;

        let mes = format_mes_referencia(fatura.mes_referencia);
        let mut doc = self.novo_documento(format!("Fatura UC {} - {}", unidade.numero_uc, mes))?;

        Self::cabecalho(&mut doc, &settings);

        doc.push(elements::Paragraph::new(format!("FATURA DE ENERGIA COMPARTILHADA - {}", mes))
            .styled(style::Style::new().bold().with_font_size(14)));
        doc.push(elements::Paragraph::new(format!("Cooperado: {}", cooperado.nome)));
        doc.push(elements::Paragraph::new(format!("Documento: {}", cooperado.documento)));
        doc.push(elements::Paragraph::new(format!("Unidade consumidora: {}", unidade.numero_uc)));
        if let Some(endereco) = &unidade.endereco {
            doc.push(elements::Paragraph::new(format!("Endereço: {}", endereco)));
        }
        if let Some(vencimento) = fatura.data_vencimento {
            doc.push(elements::Paragraph::new(format!("Vencimento: {}", vencimento.format("%d/%m/%Y"))));
        }

        doc.push(elements::Break::new(2));
        Self::quadro_valores(&mut doc, resumo_fatura(&fatura))?;
        doc.push(elements::Break::new(1));

        let mut economia = elements::Paragraph::new(format!(
            "Sua economia neste mês: {}",
            format_brl(fatura.economia)
        ));
        economia.set_alignment(genpdf::Alignment::Right);
        doc.push(economia.styled(style::Style::new().bold().with_font_size(12)));

        let mut total = elements::Paragraph::new(format!(
            "TOTAL A PAGAR À COOPERATIVA: {}",
            format_brl(fatura.valor_assinatura)
        ));
        total.set_alignment(genpdf::Alignment::Right);
        doc.push(total.styled(style::Style::new().bold().with_font_size(12)));

        doc.push(elements::Break::new(2));

        // --- PIX ---
        if let Some(chave) = settings.chave_pix.as_deref().filter(|c| !c.trim().is_empty()) {
            doc.push(elements::Paragraph::new("PAGAMENTO VIA PIX")
                .styled(style::Style::new().bold().with_font_size(12)));
            doc.push(elements::Paragraph::new(format!("Chave: {}", chave)));
            doc.push(elements::Break::new(1));

            // QR Code com a chave em texto puro
            let code = QrCode::new(chave.as_bytes()).map_err(pdf_error)?;
            let image_buffer = code.render::<Luma<u8>>().build();
            let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

            let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
                .map_err(pdf_error)?
                .with_scale(genpdf::Scale::new(0.5, 0.5));

            doc.push(pdf_image);
        }

        Self::rodape(&mut doc, &settings);

        tracing::info!("📄 PDF da fatura {} gerado", fatura.id);
        Self::renderizar(doc)
    }

    // --- DEMONSTRATIVO DA USINA ---

    pub async fn gerar_recibo_pagamento_pdf<'e, E>(
        &self,
        executor: E,
        pagamento_id: Uuid,
    ) -> Result<Vec<u8>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let pagamento = self.pagamento_repo
            .get_pagamento(&mut *tx, pagamento_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Pagamento {}", pagamento_id)))?;
        let usina = self.usina_repo
            .get_usina(&mut *tx, pagamento.usina_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Usina {}", pagamento.usina_id)))?;
        let settings = self.settings_repo.get_settings(&mut *tx).await?;

        tx.commit().await?;

        let mes = format_mes_referencia(pagamento.mes_referencia);
        let titulo = match pagamento.status {
            PagamentoStatus::Paga => "RECIBO DE PAGAMENTO",
            _ => "DEMONSTRATIVO DE PAGAMENTO",
        };

        let mut doc = self.novo_documento(format!("{} - {} - {}", titulo, usina.nome, mes))?;
        Self::cabecalho(&mut doc, &settings);

        doc.push(elements::Paragraph::new(format!("{} - {}", titulo, mes))
            .styled(style::Style::new().bold().with_font_size(14)));
        doc.push(elements::Paragraph::new(format!("Usina: {}", usina.nome)));
        if let Some(uc) = &usina.numero_uc {
            doc.push(elements::Paragraph::new(format!("UC da usina: {}", uc)));
        }
        doc.push(elements::Paragraph::new(format!(
            "Valor do kWh: {}",
            format_brl(usina.valor_kwh)
        )));
        if let Some(data) = pagamento.data_pagamento {
            doc.push(elements::Paragraph::new(format!("Pago em: {}", data.format("%d/%m/%Y"))));
        }

        doc.push(elements::Break::new(2));
        Self::quadro_valores(&mut doc, resumo_pagamento(&pagamento))?;

        Self::rodape(&mut doc, &settings);

        tracing::info!("📄 Demonstrativo do pagamento {} gerado", pagamento.id);
        Self::renderizar(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fatura::FaturaStatus;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use sqlx::types::Json;

    #[test]
    fn invoice_summary_shows_calculated_values_in_brl() {
        let fatura = Fatura {
            id: Uuid::new_v4(),
            unidade_beneficiaria_id: Uuid::new_v4(),
            mes_referencia: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            total_fatura: dec!(1000),
            iluminacao_publica: dec!(50),
            outros_valores: dec!(30),
            fatura_concessionaria: dec!(400),
            consumo_kwh: dec!(850),
            saldo_energia_kwh: dec!(120),
            percentual_desconto: dec!(20.00),
            valor_desconto: dec!(184),
            valor_assinatura: dec!(416),
            economia: dec!(184),
            status: FaturaStatus::Pendente,
            arquivo_path: None,
            data_vencimento: None,
            historico_status: Json(Vec::new()),
            created_at: None,
            updated_at: None,
        };

        let linhas = resumo_fatura(&fatura);
        assert_eq!(linhas[0].1, "R$ 1.000,00");
        assert_eq!(linhas[4].1, "20%");
        assert_eq!(linhas[5], ("Valor do desconto", "R$ 184,00".to_string()));
        assert_eq!(linhas[6], ("Valor da assinatura", "R$ 416,00".to_string()));
    }
}
