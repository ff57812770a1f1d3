// src/middleware/delegate.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{auth::User, delegates::Delegate},
};

/// Guardião das rotas de delegado: o usuário autenticado precisa ter um
/// cadastro de delegado vinculado.
pub struct CurrentDelegate(pub Delegate);

impl<S> FromRequestParts<S> for CurrentDelegate
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = parts
            .headers
            .get(axum::http::header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        // A. Usuário vem do auth_guard
        let user = parts
            .extensions
            .get::<User>()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale))?;

        // B. Cadastro de delegado no banco
        let delegate = app_state
            .delegate_repo
            .find_by_user_id(user.id)
            .await
            .map_err(|e| e.to_api_error(&locale))?
            .ok_or_else(|| AppError::NotADelegate.to_api_error(&locale))?;

        Ok(CurrentDelegate(delegate))
    }
}
