// src/handlers/requests.rs

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        validation::validate_not_blank,
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        delegates::{DelegateRating, RateDelegatePayload},
        requests::{Dashboard, Request, RequestFilter},
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestPayload {
    // String de propósito: tipo desconhecido vira UnknownDocumentType, não erro de JSON
    #[schema(example = "acte_naissance")]
    pub document_type: String,

    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Abidjan")]
    pub city: String,

    // Único ponto que limita as cópias; o motor de preços não valida
    #[validate(range(min = 1, max = 10, message = "copies_range"))]
    #[schema(example = 1)]
    pub copies: i32,

    #[serde(default)]
    #[schema(example = json!({"nom": "Kouassi", "prenoms": "Aya", "date_naissance": "1990-04-12", "lieu_naissance": "Abidjan"}))]
    pub form_data: HashMap<String, String>,
}

// POST /api/requests
#[utoipa::path(
    post,
    path = "/api/requests",
    tag = "Requests",
    request_body = CreateRequestPayload,
    responses(
        (status = 201, description = "Solicitação criada com status 'new'", body = Request),
        (status = 400, description = "Tipo desconhecido, campos ausentes ou inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_request(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateRequestPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let request = app_state.request_service
        .create_request(
            user.id,
            &payload.document_type,
            &payload.city,
            payload.copies,
            &payload.form_data,
        )
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(request)))
}

// GET /api/requests
#[utoipa::path(
    get,
    path = "/api/requests",
    tag = "Requests",
    params(RequestFilter),
    responses((status = 200, description = "Solicitações do usuário, mais recentes primeiro", body = Vec<Request>)),
    security(("api_jwt" = []))
)]
pub async fn list_requests(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<RequestFilter>,
) -> Result<Json<Vec<Request>>, ApiError> {
    let requests = app_state.request_service
        .list_requests(user.id, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(requests))
}

// GET /api/requests/{id}
#[utoipa::path(
    get,
    path = "/api/requests/{id}",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    responses(
        (status = 200, description = "Solicitação", body = Request),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_request(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(request_id): Path<Uuid>,
) -> Result<Json<Request>, ApiError> {
    let request = app_state.request_service
        .get_request(user.id, request_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(request))
}

// POST /api/requests/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/requests/{id}/cancel",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    responses(
        (status = 200, description = "Solicitação cancelada", body = Request),
        (status = 409, description = "Solicitação já finalizada")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_request(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(request_id): Path<Uuid>,
) -> Result<Json<Request>, ApiError> {
    let request = app_state.request_service
        .cancel_by_owner(user.id, request_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(request))
}

// POST /api/requests/{id}/rating
#[utoipa::path(
    post,
    path = "/api/requests/{id}/rating",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    request_body = RateDelegatePayload,
    responses(
        (status = 201, description = "Avaliação registrada", body = DelegateRating),
        (status = 409, description = "Não concluída ou já avaliada")
    ),
    security(("api_jwt" = []))
)]
pub async fn rate_request(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<RateDelegatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let rating = app_state.request_service
        .rate_request(user.id, request_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(rating)))
}

// GET /api/dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    responses((status = 200, description = "Contadores e solicitações recentes", body = Dashboard)),
    security(("api_jwt" = []))
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Dashboard>, ApiError> {
    let dashboard = app_state.request_service
        .dashboard(user.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(dashboard))
}
