// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::validate_not_blank;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,  // Vira "ADMIN"
    Member, // Vira "MEMBER"
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Member => "MEMBER",
        }
    }

    /// Autoridade derivada do papel, no formato "ROLE_ADMIN".
    pub fn authority(&self) -> String {
        format!("ROLE_{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "document_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    Cpf,  // Vira "CPF"
    Cnpj, // Vira "CNPJ"
}

// --- Entidades ---

// Usuário vindo do banco. O consultório é referenciado só pelo id.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub workspace_id: Option<Uuid>,
    pub full_name: String,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub crm: Option<String>,
    pub role: UserRole,
    pub digital_signature_url: Option<String>,

    #[serde(skip_serializing)]
    pub password_reset_token: Option<String>,
    pub password_reset_expires: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O consultório (tenant). owner_id é apenas uma referência de consulta.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub document_type: DocumentType,
    pub document_number: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dados já preparados para o cadastro atômico (usuário + consultório).
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub workspace_name: String,
    pub document_type: DocumentType,
    pub document_number: String,
}

/// Usuário com o consultório carregado junto (login).
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub user: User,
    pub workspace: Option<Workspace>,
}

// --- Payloads ---

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(
        length(min = 2, message = "O nome deve ter pelo menos 2 caracteres."),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "Dr. João Silva")]
    pub full_name: String,

    #[validate(email(message = "Por favor, insira um e-mail válido."))]
    #[schema(example = "joao@example.com")]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter pelo menos 6 caracteres."))]
    #[schema(example = "123456")]
    pub password: String,

    #[validate(
        length(min = 2, message = "O nome do workspace deve ter pelo menos 2 caracteres."),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "Clínica Dr. João")]
    pub workspace_name: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "Por favor, insira um e-mail válido."))]
    #[schema(example = "joao@example.com")]
    pub email: String,

    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    #[schema(example = "123456")]
    pub password: String,
}

// --- Respostas ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceResponse {
    pub id: Uuid,
    pub name: String,
    pub document_type: DocumentType,
    pub document_number: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Workspace> for WorkspaceResponse {
    fn from(w: Workspace) -> Self {
        Self {
            id: w.id,
            name: w.name,
            document_type: w.document_type,
            document_number: w.document_number,
            owner_id: w.owner_id,
            created_at: w.created_at,
            updated_at: w.updated_at,
        }
    }
}

// Resposta do registro: usuário + consultório + token
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub workspace: WorkspaceResponse,
    #[serde(rename = "access_token")]
    pub access_token: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    pub crm: Option<String>,
    pub digital_signature_url: Option<String>,
    pub workspace: Option<WorkspaceResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid,                  // Subject (ID do usuário)
    pub email: String,
    pub workspace_id: Option<Uuid>, // Sempre presente no payload: `null` quando não há consultório
    pub role: UserRole,
    pub exp: i64,                   // Expiration time (quando o token expira)
    pub iat: i64,                   // Issued At (quando o token foi criado)
}
