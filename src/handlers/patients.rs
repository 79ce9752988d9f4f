// src/handlers/patients.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::patient::{CreatePatientPayload, Patient, UpdatePatientPayload},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/patients",
    tag = "Patients",
    request_body = CreatePatientPayload,
    responses(
        (status = 201, description = "Paciente cadastrado", body = Patient),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Não autenticado"),
        (status = 403, description = "Usuário sem consultório"),
        (status = 409, description = "CPF já cadastrado neste consultório")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_patient(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    WithRejection(Json(payload), _): WithRejection<Json<CreatePatientPayload>, AppError>,
) -> Result<(StatusCode, Json<Patient>), AppError> {
    payload.validate()?;

    let patient = app_state.patient_service.create(payload, &user).await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

#[utoipa::path(
    get,
    path = "/api/patients",
    tag = "Patients",
    responses(
        (status = 200, description = "Pacientes ativos do consultório, por nome", body = Vec<Patient>),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_patients(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Patient>>, AppError> {
    let patients = app_state.patient_service.find_all(&user).await?;
    Ok(Json(patients))
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    tag = "Patients",
    params(("id" = Uuid, Path, description = "ID do paciente")),
    responses(
        (status = 200, description = "Paciente encontrado", body = Patient),
        (status = 401, description = "Não autenticado"),
        (status = 404, description = "Paciente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_patient(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Patient>, AppError> {
    let patient = app_state.patient_service.find_one(id, &user).await?;
    Ok(Json(patient))
}

#[utoipa::path(
    patch,
    path = "/api/patients/{id}",
    tag = "Patients",
    params(("id" = Uuid, Path, description = "ID do paciente")),
    request_body = UpdatePatientPayload,
    responses(
        (status = 200, description = "Paciente atualizado", body = Patient),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Não autenticado"),
        (status = 404, description = "Paciente não encontrado"),
        (status = 409, description = "CPF já cadastrado neste consultório")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_patient(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdatePatientPayload>, AppError>,
) -> Result<Json<Patient>, AppError> {
    payload.validate()?;

    let patient = app_state.patient_service.update(id, payload, &user).await?;
    Ok(Json(patient))
}

/// Remoção lógica: o paciente some das consultas e o CPF fica livre.
#[utoipa::path(
    delete,
    path = "/api/patients/{id}",
    tag = "Patients",
    params(("id" = Uuid, Path, description = "ID do paciente")),
    responses(
        (status = 200, description = "Paciente removido", body = MessageResponse),
        (status = 401, description = "Não autenticado"),
        (status = 404, description = "Paciente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_patient(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    app_state.patient_service.remove(id, &user).await?;
    Ok(Json(MessageResponse {
        message: "Paciente removido com sucesso.".to_string(),
    }))
}
