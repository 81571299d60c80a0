// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{common::error::AppError, config::AppState, models::auth::Claims};

/// Valida o JWT (HS256) emitido pelo provedor de autenticação.
pub fn validate_token(token: &str, secret: &str, audience: Option<&str>) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    match audience {
        Some(aud) => validation.set_audience(&[aud]),
        None => validation.validate_aud = false,
    }

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| {
            tracing::debug!("Token rejeitado: {}", e);
            AppError::InvalidToken
        })?;

    Ok(token_data.claims)
}

// O middleware em si
pub async fn auth_guard(
    State(app_state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|_| AppError::InvalidToken)?;

    let claims = validate_token(
        bearer.token(),
        &app_state.jwt_secret,
        app_state.jwt_audience.as_deref(),
    )?;

    // Insere o usuário nos "extensions" da requisição
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
pub struct AuthenticatedUser(pub Claims);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    const SECRET: &str = "segredo-de-teste";

    fn token(exp_offset: i64, aud: Option<&str>) -> (Uuid, String) {
        #[derive(serde::Serialize)]
        struct ComAudiencia<'a> {
            sub: Uuid,
            exp: usize,
            #[serde(skip_serializing_if = "Option::is_none")]
            aud: Option<&'a str>,
        }

        let sub = Uuid::new_v4();
        let exp = (chrono::Utc::now().timestamp() + exp_offset) as usize;
        let claims = ComAudiencia { sub, exp, aud };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap();
        (sub, token)
    }

    #[test]
    fn accepts_valid_token_and_returns_subject() {
        let (sub, token) = token(3600, None);
        let claims = validate_token(&token, SECRET, None).unwrap();
        assert_eq!(claims.sub, sub);
    }

    #[test]
    fn rejects_expired_or_tampered_tokens() {
        let (_, expirado) = token(-3600, None);
        assert!(matches!(validate_token(&expirado, SECRET, None), Err(AppError::InvalidToken)));

        let (_, token) = token(3600, None);
        assert!(matches!(validate_token(&token, "outro-segredo", None), Err(AppError::InvalidToken)));
    }

    #[test]
    fn checks_audience_only_when_configured() {
        let (_, token) = token(3600, Some("authenticated"));
        assert!(validate_token(&token, SECRET, Some("authenticated")).is_ok());
        assert!(validate_token(&token, SECRET, Some("admin")).is_err());
        assert!(validate_token(&token, SECRET, None).is_ok());
    }
}
