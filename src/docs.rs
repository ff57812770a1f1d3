// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::update_me,

        // --- Catalog ---
        handlers::catalog::list_documents,
        handlers::catalog::get_document,
        handlers::catalog::list_cities,
        handlers::catalog::list_services,

        // --- Pricing ---
        handlers::pricing::quote,

        // --- Requests ---
        handlers::requests::create_request,
        handlers::requests::list_requests,
        handlers::requests::get_request,
        handlers::requests::cancel_request,
        handlers::requests::rate_request,

        // --- Dashboard ---
        handlers::requests::get_dashboard,

        // --- Delegates ---
        handlers::delegates::get_me,
        handlers::delegates::list_queue,
        handlers::delegates::assign_request,
        handlers::delegates::start_request,
        handlers::delegates::complete_request,
        handlers::delegates::cancel_request,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::ShippingPreference,
            models::auth::UserPreferences,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::UpdateProfilePayload,
            models::auth::AuthResponse,

            // --- Catalog ---
            models::catalog::DocumentType,
            models::catalog::ServiceType,
            models::catalog::FormField,
            models::catalog::City,
            models::catalog::DocumentConfig,
            models::catalog::CityCoefficients,
            models::catalog::CityEntry,
            models::catalog::ServiceEntry,

            // --- Pricing ---
            services::pricing::Quote,
            handlers::pricing::QuotePayload,

            // --- Requests ---
            models::requests::RequestStatus,
            models::requests::Request,
            models::requests::StatusCounts,
            models::requests::DashboardStats,
            models::requests::Dashboard,
            handlers::requests::CreateRequestPayload,

            // --- Delegates ---
            models::delegates::Delegate,
            models::delegates::DelegateRating,
            models::delegates::DelegateSummary,
            models::delegates::RateDelegatePayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Preferências"),
        (name = "Catalog", description = "Documentos, Órgãos e Cidades atendidas"),
        (name = "Pricing", description = "Orçamento de Solicitações"),
        (name = "Requests", description = "Solicitações de Documentos"),
        (name = "Dashboard", description = "Resumo das Solicitações do Usuário"),
        (name = "Delegates", description = "Fila e Ciclo de Vida do Delegado")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/auth/register",
            "/api/catalog/documents/{document_type}",
            "/api/pricing/quote",
            "/api/requests/{id}/rating",
            "/api/dashboard",
            "/api/delegates/requests/{id}/complete",
        ] {
            assert!(paths.iter().any(|p| p.as_str() == expected), "faltando {expected}");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
