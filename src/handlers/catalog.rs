// src/handlers/catalog.rs

use axum::{extract::Path, Json};

use crate::{
    common::error::ApiError,
    middleware::i18n::Locale,
    models::catalog::{CityEntry, DocumentConfig, ServiceEntry},
    services::catalog,
};

// GET /api/catalog/documents
#[utoipa::path(
    get,
    path = "/api/catalog/documents",
    tag = "Catalog",
    responses((status = 200, description = "Documentos na ordem de exibição", body = Vec<DocumentConfig>))
)]
pub async fn list_documents() -> Json<&'static [DocumentConfig]> {
    Json(catalog::list_all())
}

// GET /api/catalog/documents/{document_type}
#[utoipa::path(
    get,
    path = "/api/catalog/documents/{document_type}",
    tag = "Catalog",
    params(("document_type" = String, Path, description = "Tag do documento, ex: acte_naissance")),
    responses(
        (status = 200, description = "Configuração do documento", body = DocumentConfig),
        (status = 400, description = "Tipo de documento desconhecido")
    )
)]
pub async fn get_document(
    locale: Locale,
    Path(document_type): Path<String>,
) -> Result<Json<&'static DocumentConfig>, ApiError> {
    let config = catalog::lookup(&document_type).map_err(|e| e.to_api_error(&locale))?;
    Ok(Json(config))
}

// GET /api/catalog/cities
#[utoipa::path(
    get,
    path = "/api/catalog/cities",
    tag = "Catalog",
    responses((status = 200, description = "Cidades atendidas e seus coeficientes", body = Vec<CityEntry>))
)]
pub async fn list_cities() -> Json<Vec<CityEntry>> {
    Json(catalog::list_cities())
}

// GET /api/catalog/services
#[utoipa::path(
    get,
    path = "/api/catalog/services",
    tag = "Catalog",
    responses((status = 200, description = "Órgãos emissores", body = Vec<ServiceEntry>))
)]
pub async fn list_services() -> Json<Vec<ServiceEntry>> {
    Json(catalog::list_services())
}
