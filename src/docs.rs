// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "MediApp API", description = "Consultórios, médicos e pacientes"),
    paths(
        // --- Health ---
        handlers::health::health,

        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_profile,

        // --- Patients ---
        handlers::patients::create_patient,
        handlers::patients::list_patients,
        handlers::patients::get_patient,
        handlers::patients::update_patient,
        handlers::patients::delete_patient,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::DocumentType,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::WorkspaceResponse,
            models::auth::RegisterResponse,
            models::auth::AuthResponse,
            models::auth::ProfileResponse,

            // --- Patients ---
            models::patient::SexType,
            models::patient::Patient,
            models::patient::CreatePatientPayload,
            models::patient::UpdatePatientPayload,
            handlers::patients::MessageResponse,

            handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "Health", description = "Status da API"),
        (name = "Auth", description = "Cadastro, Login e Perfil"),
        (name = "Patients", description = "Pacientes do Consultório")
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
