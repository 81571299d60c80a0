use sqlx::{Executor, Postgres};
use crate::{
    common::error::AppError,
    models::settings::{CooperativaSettings, UpdateSettingsRequest},
};

#[derive(Clone, Default)]
pub struct SettingsRepository;

impl SettingsRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn get_settings<'e, E>(
        &self,
        executor: E,
    ) -> Result<CooperativaSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Linha única. Se ainda não foi criada, tratamos "Not Found" como "Vazio".
        let settings = sqlx::query_as::<_, CooperativaSettings>(
            "SELECT * FROM cooperativa_settings WHERE id = 1",
        )
            .fetch_optional(executor)
            .await?;

        Ok(settings.unwrap_or_default())
    }

    pub async fn update_settings<'e, E>(
        &self,
        executor: E,
        input: UpdateSettingsRequest,
    ) -> Result<CooperativaSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UPSERT (Insert or Update)
        let settings = sqlx::query_as::<_, CooperativaSettings>(
            r#"
            INSERT INTO cooperativa_settings (id, nome, cnpj, endereco, telefone, email, chave_pix)
            VALUES (1, $1, $2, $3, $4, $5, $6)
            ON CONFLICT (id)
            DO UPDATE SET
                nome = EXCLUDED.nome,
                cnpj = EXCLUDED.cnpj,
                endereco = EXCLUDED.endereco,
                telefone = EXCLUDED.telefone,
                email = EXCLUDED.email,
                chave_pix = EXCLUDED.chave_pix,
                updated_at = NOW()
            RETURNING *
            "#,
        )
            .bind(input.nome)
            .bind(input.cnpj)
            .bind(input.endereco)
            .bind(input.telefone)
            .bind(input.email)
            .bind(input.chave_pix)
            .fetch_one(executor)
            .await?;

        Ok(settings)
    }
}
