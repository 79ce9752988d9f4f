// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState, models::auth::User};

/// Identidade resolvida a partir do token Bearer.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    /// "ROLE_ADMIN" / "ROLE_MEMBER", para autorização por rota.
    pub authority: String,
}

/// Middleware global de autenticação.
///
/// Nunca rejeita: sem header, header que não é Bearer, token inválido ou
/// expirado, usuário inexistente ou falha no armazenamento seguem anônimos.
/// Quem exige login é o extrator `AuthenticatedUser`.
pub async fn authenticate(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(current) = resolve_current_user(&app_state, request.headers()).await {
        request.extensions_mut().insert(current);
    }
    next.run(request).await
}

async fn resolve_current_user(app_state: &AppState, headers: &HeaderMap) -> Option<CurrentUser> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))?;

    if !app_state.token_service.validate(token) {
        tracing::debug!("Token Bearer inválido ou expirado; seguindo como anônimo");
        return None;
    }

    let user_id = app_state.token_service.extract_subject_id(token).ok()?;

    match app_state.identity_store.find_user_by_id(user_id).await {
        Ok(Some(user)) => {
            let authority = user.role.authority();
            Some(CurrentUser { user, authority })
        }
        Ok(None) => {
            tracing::debug!(%user_id, "Token válido para usuário inexistente");
            None
        }
        Err(e) => {
            tracing::warn!(%user_id, error = %e, "Falha ao carregar usuário do token; seguindo como anônimo");
            None
        }
    }
}

// Extrator para obter o usuário autenticado diretamente nos handlers
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .map(|current| AuthenticatedUser(current.user.clone()))
            .ok_or(AppError::Unauthenticated)
    }
}
