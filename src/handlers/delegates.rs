// src/handlers/delegates.rs

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{delegate::CurrentDelegate, i18n::Locale},
    models::{delegates::Delegate, requests::Request},
};

// GET /api/delegates/me
#[utoipa::path(
    get,
    path = "/api/delegates/me",
    tag = "Delegates",
    responses(
        (status = 200, description = "Cadastro do delegado", body = Delegate),
        (status = 403, description = "Usuário não é delegado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(CurrentDelegate(delegate): CurrentDelegate) -> Json<Delegate> {
    Json(delegate)
}

// GET /api/delegates/requests
#[utoipa::path(
    get,
    path = "/api/delegates/requests",
    tag = "Delegates",
    responses((status = 200, description = "Solicitações atribuídas e novas disponíveis", body = Vec<Request>)),
    security(("api_jwt" = []))
)]
pub async fn list_queue(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentDelegate(delegate): CurrentDelegate,
) -> Result<Json<Vec<Request>>, ApiError> {
    let requests = app_state.request_service
        .delegate_queue(&delegate)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(requests))
}

// POST /api/delegates/requests/{id}/assign
#[utoipa::path(
    post,
    path = "/api/delegates/requests/{id}/assign",
    tag = "Delegates",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    responses(
        (status = 200, description = "Atribuída ao delegado, com prazo estimado", body = Request),
        (status = 409, description = "Solicitação não está mais disponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_request(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentDelegate(delegate): CurrentDelegate,
    Path(request_id): Path<Uuid>,
) -> Result<Json<Request>, ApiError> {
    let request = app_state.request_service
        .assign(&delegate, request_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(request))
}

// POST /api/delegates/requests/{id}/start
#[utoipa::path(
    post,
    path = "/api/delegates/requests/{id}/start",
    tag = "Delegates",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    responses((status = 200, description = "Em andamento", body = Request)),
    security(("api_jwt" = []))
)]
pub async fn start_request(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentDelegate(delegate): CurrentDelegate,
    Path(request_id): Path<Uuid>,
) -> Result<Json<Request>, ApiError> {
    let request = app_state.request_service
        .start(&delegate, request_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(request))
}

// POST /api/delegates/requests/{id}/complete
#[utoipa::path(
    post,
    path = "/api/delegates/requests/{id}/complete",
    tag = "Delegates",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    responses((status = 200, description = "Concluída", body = Request)),
    security(("api_jwt" = []))
)]
pub async fn complete_request(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentDelegate(delegate): CurrentDelegate,
    Path(request_id): Path<Uuid>,
) -> Result<Json<Request>, ApiError> {
    let request = app_state.request_service
        .complete(&delegate, request_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(request))
}

// POST /api/delegates/requests/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/delegates/requests/{id}/cancel",
    tag = "Delegates",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    responses((status = 200, description = "Cancelada pelo delegado", body = Request)),
    security(("api_jwt" = []))
)]
pub async fn cancel_request(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentDelegate(delegate): CurrentDelegate,
    Path(request_id): Path<Uuid>,
) -> Result<Json<Request>, ApiError> {
    let request = app_state.request_service
        .cancel_by_delegate(&delegate, request_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(request))
}
