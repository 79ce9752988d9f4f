use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Erro único da aplicação; cada variante sabe o seu status HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Corpo da requisição inválido: {0}")]
    InvalidBody(String),

    #[error("Este e-mail já está em uso.")]
    EmailAlreadyExists,

    #[error("Já existe um consultório com este documento.")]
    WorkspaceDocumentAlreadyExists,

    #[error("CPF já cadastrado neste consultório.")]
    TaxIdAlreadyExists,

    // Mesma mensagem para e-mail inexistente e senha errada.
    #[error("Credenciais inválidas.")]
    InvalidCredentials,

    #[error("Token de autenticação inválido ou ausente.")]
    Unauthenticated,

    #[error("Token malformado.")]
    MalformedCredential,

    #[error("Usuário não está vinculado a um consultório.")]
    MissingWorkspace,

    #[error("Paciente não encontrado.")]
    PatientNotFound,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // `anyhow::Error` guarda o contexto de falhas inesperadas (ex: join de task bloqueante).
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection.body_text())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists
            | AppError::WorkspaceDocumentAlreadyExists
            | AppError::TaxIdAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::Unauthenticated
            | AppError::MalformedCredential => StatusCode::UNAUTHORIZED,
            AppError::MissingWorkspace => StatusCode::FORBIDDEN,
            AppError::PatientNotFound => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let AppError::ValidationError(errors) = &self {
            // Retorna todos os detalhes da validação, campo a campo, com os nomes do JSON.
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                details.insert(json_field_name(&field), messages);
            }
            let body = Json(json!({
                "error": "Um ou mais campos são inválidos.",
                "details": details,
            }));
            return (status, body).into_response();
        }

        let error_message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O detalhe fica no log; o cliente recebe só a mensagem genérica.
            tracing::error!("Erro Interno do Servidor: {}", self);
            "Ocorreu um erro inesperado.".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

// "birth_date" -> "birthDate", igual ao `rename_all = "camelCase"` dos payloads.
fn json_field_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            name.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            name.push(c);
        }
    }
    name
}
