// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::{config::AppState, docs::ApiDoc, middleware::auth::authenticate};

/// Monta o router completo da API.
///
/// O middleware de autenticação roda em todas as rotas, mas só anexa a
/// identidade; cada handler protegido exige `AuthenticatedUser`.
pub fn app(app_state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/profile", get(handlers::auth::get_profile));

    Router::new()
        .route("/api/health", get(handlers::health::health))
        .nest("/api/auth", auth_routes)
        .route(
            "/api/patients",
            post(handlers::patients::create_patient).get(handlers::patients::list_patients),
        )
        .route(
            "/api/patients/{id}",
            get(handlers::patients::get_patient)
                .patch(handlers::patients::update_patient)
                .delete(handlers::patients::delete_patient),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            authenticate,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
