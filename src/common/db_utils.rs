use crate::common::error::AppError;

// Nomes das constraints/índices únicos criados nas migrations.
pub const USERS_EMAIL_KEY: &str = "users_email_key";
pub const WORKSPACES_DOCUMENT_KEY: &str = "workspaces_document_key";
pub const PATIENTS_ACTIVE_TAX_ID_KEY: &str = "patients_active_tax_id_key";

/// Converte violações de unicidade do Postgres no conflito de domínio correspondente.
///
/// O índice parcial de CPF ativo é quem realmente garante a regra quando duas
/// requisições concorrentes passam pela verificação prévia do serviço.
pub(crate) fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(USERS_EMAIL_KEY) => return AppError::EmailAlreadyExists,
                Some(WORKSPACES_DOCUMENT_KEY) => return AppError::WorkspaceDocumentAlreadyExists,
                Some(PATIENTS_ACTIVE_TAX_ID_KEY) => return AppError::TaxIdAlreadyExists,
                _ => {}
            }
        }
    }
    e.into()
}
