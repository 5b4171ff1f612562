use axum::{
    extract::{FromRequestParts, State},
    http::{request::Parts, Uri},
    response::{IntoResponse, Redirect, Response},
};
use wayfare_core::locale::{resolve_path, LocaleRoute};
use wayfare_core::Locale;

use crate::error::AppError;
use crate::state::AppState;

/// The `{locale}` segment of a localized route. Unsupported locales are
/// rejected with a redirect to the same page under the default locale.
#[derive(Debug, Clone, Copy)]
pub struct ValidLocale(pub Locale);

impl FromRequestParts<AppState> for ValidLocale {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match resolve_path(parts.uri.path(), state.default_locale) {
            LocaleRoute::Valid { locale, .. } => Ok(ValidLocale(locale)),
            LocaleRoute::Redirect(target) => {
                tracing::debug!(from = %parts.uri, to = %target, "Unsupported locale");
                Err(redirect_with_query(target, &parts.uri))
            }
        }
    }
}

/// Locale-less paths are sent to the default locale. Anything under a valid
/// locale or `/api` that reached here is a plain 404.
pub async fn fallback(State(state): State<AppState>, uri: Uri) -> Response {
    if uri.path() == "/api" || uri.path().starts_with("/api/") {
        return AppError::NotFoundError(format!("No route for {}", uri.path())).into_response();
    }
    match resolve_path(uri.path(), state.default_locale) {
        LocaleRoute::Redirect(target) => redirect_with_query(target, &uri),
        LocaleRoute::Valid { .. } => {
            AppError::NotFoundError(format!("No route for {}", uri.path())).into_response()
        }
    }
}

fn redirect_with_query(target: String, uri: &Uri) -> Response {
    let location = match uri.query() {
        Some(query) if !query.is_empty() => format!("{}?{}", target, query),
        _ => target,
    };
    Redirect::temporary(&location).into_response()
}
