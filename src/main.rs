//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Sem configuração válida a aplicação não sobe
    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = app(app_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn app(app_state: AppState) -> Router {
    // Rotas públicas
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let catalog_routes = Router::new()
        .route("/documents", get(handlers::catalog::list_documents))
        .route("/documents/{document_type}", get(handlers::catalog::get_document))
        .route("/cities", get(handlers::catalog::list_cities))
        .route("/services", get(handlers::catalog::list_services));

    let pricing_routes = Router::new()
        .route("/quote", post(handlers::pricing::quote));

    // Rotas protegidas pelo auth_guard
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me).put(handlers::auth::update_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let request_routes = Router::new()
        .route("/"
               ,post(handlers::requests::create_request)
               .get(handlers::requests::list_requests)
        )
        .route("/{id}", get(handlers::requests::get_request))
        .route("/{id}/cancel", post(handlers::requests::cancel_request))
        .route("/{id}/rating", post(handlers::requests::rate_request))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let dashboard_routes = Router::new()
        .route("/", get(handlers::requests::get_dashboard))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // O extrator CurrentDelegate exige o usuário já injetado pelo auth_guard
    let delegate_routes = Router::new()
        .route("/me", get(handlers::delegates::get_me))
        .route("/requests", get(handlers::delegates::list_queue))
        .route("/requests/{id}/assign", post(handlers::delegates::assign_request))
        .route("/requests/{id}/start", post(handlers::delegates::start_request))
        .route("/requests/{id}/complete", post(handlers::delegates::complete_request))
        .route("/requests/{id}/cancel", post(handlers::delegates::cancel_request))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/catalog", catalog_routes)
        .nest("/api/pricing", pricing_routes)
        .nest("/api/requests", request_routes)
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/delegates", delegate_routes)
        .with_state(app_state)
}
