// src/handlers/pricing.rs

use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        validation::validate_not_blank,
    },
    config::AppState,
    middleware::i18n::Locale,
    models::catalog::DocumentType,
    services::pricing::Quote,
};

fn default_copies() -> i32 {
    1
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotePayload {
    #[schema(example = "casier_judiciaire")]
    pub document_type: String,

    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Man")]
    pub city: String,

    #[validate(range(min = 1, max = 10, message = "copies_range"))]
    #[serde(default = "default_copies")]
    #[schema(example = 1)]
    pub copies: i32,
}

// POST /api/pricing/quote
#[utoipa::path(
    post,
    path = "/api/pricing/quote",
    tag = "Pricing",
    request_body = QuotePayload,
    responses(
        (status = 200, description = "Preço, comissão e prazo estimados", body = Quote),
        (status = 400, description = "Tipo de documento desconhecido ou payload inválido")
    )
)]
pub async fn quote(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<QuotePayload>,
) -> Result<Json<Quote>, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let document_type: DocumentType = payload.document_type
        .parse()
        .map_err(|e: AppError| e.to_api_error(&locale))?;

    let quote = app_state.pricing
        .quote(document_type, &payload.city, i64::from(payload.copies))
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(quote))
}
