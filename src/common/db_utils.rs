use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::auth::AuthenticatedUser;

/// Adquire uma conexão da pool para uma requisição autenticada.
///
/// Os dados são da cooperativa inteira, sem isolamento por usuário no banco;
/// o `AuthenticatedUser` só garante que o guard de JWT já passou.
pub(crate) async fn get_connection(
    app_state: &AppState,
    user: &AuthenticatedUser,
) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>, AppError> {
    tracing::debug!(user_id = %user.0.sub, "Adquirindo conexão");

    // O operador '?' converte automaticamente sqlx::Error -> AppError
    let conn = app_state.db_pool.acquire().await?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    use super::*;
    use crate::config::Config;
    use crate::models::auth::Claims;

    fn config_teste() -> Config {
        Config {
            database_url: "postgres://cooperativa@127.0.0.1:1/teste".to_string(),
            jwt_secret: "segredo".to_string(),
            jwt_audience: None,
            server_addr: "127.0.0.1:0".to_string(),
            database_max_connections: 1,
            fonts_dir: "./fonts".to_string(),
        }
    }

    #[tokio::test]
    async fn unreachable_database_is_a_database_error() {
        let config = config_teste();
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy(&config.database_url)
            .unwrap();
        let state = AppState::from_pool(pool, &config);
        let user = AuthenticatedUser(Claims {
            sub: Uuid::new_v4(),
            exp: usize::MAX,
            email: None,
            role: None,
        });

        let err = get_connection(&state, &user).await.unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(_)));
    }
}
