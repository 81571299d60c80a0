// src/services/fatura_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, format::primeiro_dia_do_mes},
    db::{CooperadoRepository, FaturaRepository},
    models::fatura::{
        BaseCalculo, CalculoFaturaTemplate, CalculoResultado, Fatura, FaturaCalculada, FaturaStatus, FormulasCalculo,
        NovaFatura,
    },
    services::calculo_service,
};

#[derive(Clone)]
pub struct FaturaService {
    repo: FaturaRepository,
    cooperado_repo: CooperadoRepository,
}

impl FaturaService {
    pub fn new(repo: FaturaRepository, cooperado_repo: CooperadoRepository) -> Self {
        Self { repo, cooperado_repo }
    }

    // --- TEMPLATES ---

    pub async fn create_template<'e, E>(
        &self,
        executor: E,
        nome: &str,
        formulas: &FormulasCalculo,
        is_padrao: bool,
    ) -> Result<CalculoFaturaTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let mut template = self.repo.create_template(&mut *tx, nome, formulas).await?;
        if is_padrao {
            template = self.repo
                .set_template_padrao(&mut *tx, template.id)
                .await?
                .ok_or_else(|| AppError::ResourceNotFound(format!("Template {}", template.id)))?;
        }

        tx.commit().await?;
        Ok(template)
    }

    pub async fn definir_template_padrao<'e, E>(
        &self,
        executor: E,
        template_id: Uuid,
    ) -> Result<CalculoFaturaTemplate, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let template = self.repo
            .set_template_padrao(executor, template_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Template {}", template_id)))?;

        tracing::info!("⭐ Template '{}' agora é o padrão", template.nome);
        Ok(template)
    }

    /// Template explícito, ou o padrão quando `template_id` não vem.
    async fn resolver_formulas(
        &self,
        conn: &mut sqlx::PgConnection,
        template_id: Option<Uuid>,
    ) -> Result<Option<FormulasCalculo>, AppError> {
        let template = match template_id {
            Some(id) => Some(
                self.repo
                    .get_template(&mut *conn, id)
                    .await?
                    .ok_or_else(|| AppError::ResourceNotFound(format!("Template {}", id)))?,
            ),
            None => self.repo.get_template_padrao(&mut *conn).await?,
        };

        Ok(template.map(|t| t.formulas))
    }

    /// Calcula sem gravar nada. Usado pela tela de simulação.
    pub async fn preview<'e, E>(
        &self,
        executor: E,
        base: BaseCalculo,
        template_id: Option<Uuid>,
        formulas: Option<FormulasCalculo>,
    ) -> Result<CalculoResultado, AppError>
    where
        E: Acquire<'e, Database = Postgres, Connection = &'e mut sqlx::PgConnection>,
    {
        let formulas = match formulas {
            Some(f) => Some(f),
            None => {
                let mut conn = executor.acquire().await?;
                self.resolver_formulas(&mut *conn, template_id).await?
            }
        };

        Ok(calculo_service::calcular(&base, formulas.as_ref()))
    }

    // --- FATURAS ---

    pub async fn create_fatura<'e, E>(
        &self,
        executor: E,
        mut nova: NovaFatura,
        template_id: Option<Uuid>,
    ) -> Result<FaturaCalculada, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let unidade = self.cooperado_repo
            .get_unidade(&mut *tx, nova.unidade_beneficiaria_id)
            .await?
            .ok_or_else(|| {
                AppError::ResourceNotFound(format!(
                    "Unidade beneficiária {}",
                    nova.unidade_beneficiaria_id
                ))
            })?;

        nova.mes_referencia = primeiro_dia_do_mes(nova.mes_referencia);

        let base = BaseCalculo {
            total_fatura: nova.total_fatura,
            iluminacao_publica: nova.iluminacao_publica,
            outros_valores: nova.outros_valores,
            fatura_concessionaria: nova.fatura_concessionaria,
            percentual_desconto: unidade.percentual_desconto,
        };

        let formulas = self.resolver_formulas(&mut *tx, template_id).await?;
        let calculo = calculo_service::calcular(&base, formulas.as_ref());

        let fatura = self.repo
            .create_fatura(&mut *tx, &nova, unidade.percentual_desconto, &calculo)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "🧾 Fatura {} criada para a UC {} (desconto {}, assinatura {})",
            fatura.id,
            unidade.numero_uc,
            fatura.valor_desconto,
            fatura.valor_assinatura
        );

        Ok(FaturaCalculada { fatura, avisos: calculo.avisos })
    }

    /// Refaz o cálculo com os valores já gravados na fatura.
    pub async fn recalcular<'e, E>(
        &self,
        executor: E,
        fatura_id: Uuid,
        template_id: Option<Uuid>,
    ) -> Result<FaturaCalculada, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let fatura = self.repo
            .get_fatura(&mut *tx, fatura_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Fatura {}", fatura_id)))?;

        if fatura.status == FaturaStatus::Paga {
            return Err(AppError::BusinessRule(
                "Fatura paga não pode ser recalculada.".to_string(),
            ));
        }

        let formulas = self.resolver_formulas(&mut *tx, template_id).await?;
        let calculo = calculo_service::calcular(&BaseCalculo::from(&fatura), formulas.as_ref());

        let fatura = self.repo.update_valores(&mut *tx, fatura_id, &calculo).await?;
        tx.commit().await?;

        Ok(FaturaCalculada { fatura, avisos: calculo.avisos })
    }

    pub async fn get_fatura<'e, E>(&self, executor: E, fatura_id: Uuid) -> Result<Fatura, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .get_fatura(executor, fatura_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Fatura {}", fatura_id)))
    }

    pub async fn list_faturas<'e, E>(
        &self,
        executor: E,
        mes_referencia: Option<chrono::NaiveDate>,
        status: Option<FaturaStatus>,
        unidade_beneficiaria_id: Option<Uuid>,
    ) -> Result<Vec<Fatura>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .list_faturas(
                executor,
                mes_referencia.map(primeiro_dia_do_mes),
                status,
                unidade_beneficiaria_id,
            )
            .await
    }

    pub async fn set_arquivo<'e, E>(
        &self,
        executor: E,
        fatura_id: Uuid,
        arquivo_path: &str,
    ) -> Result<Fatura, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if arquivo_path.trim().is_empty() {
            return Err(AppError::BusinessRule("Caminho do arquivo vazio.".to_string()));
        }

        self.repo
            .set_arquivo(executor, fatura_id, arquivo_path.trim())
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Fatura {}", fatura_id)))
    }

    pub async fn atualizar_status<'e, E>(
        &self,
        executor: E,
        fatura_id: Uuid,
        novo_status: FaturaStatus,
        observacao: Option<&str>,
    ) -> Result<Fatura, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let fatura = self.repo
            .update_fatura_status(executor, fatura_id, novo_status, observacao)
            .await?;

        tracing::info!("🔁 Fatura {} agora está {:?}", fatura.id, fatura.status);
        Ok(fatura)
    }
}
