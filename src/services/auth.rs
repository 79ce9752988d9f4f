// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::IdentityStore,
    models::auth::{
        DocumentType, NewAccount, ProfileResponse, RegisterResponse, User, UserRole,
        WorkspaceResponse,
    },
    services::token::TokenService,
};

// Consultórios criados no cadastro não têm documento real; usam um número de registro.
const AUTO_WORKSPACE_DOCUMENT_TYPE: DocumentType = DocumentType::Cpf;

#[derive(Clone)]
pub struct AuthService {
    identity_store: Arc<dyn IdentityStore>,
    tokens: TokenService,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(identity_store: Arc<dyn IdentityStore>, tokens: TokenService, bcrypt_cost: u32) -> Self {
        Self { identity_store, tokens, bcrypt_cost }
    }

    /// Cadastro: cria usuário ADMIN + consultório próprio numa única unidade atômica
    /// e devolve os dois junto com o token.
    pub async fn register_user(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
        workspace_name: &str,
    ) -> Result<RegisterResponse, AppError> {
        // 1. E-mail já usado? (a constraint do banco continua valendo para corridas)
        if self.identity_store.email_exists(email).await? {
            return Err(AppError::EmailAlreadyExists);
        }

        // 2. Hashing (fora da transação, não toca no banco)
        let password_hash = self.hash_password(password).await?;

        // 3-6. Usuário, consultório e vínculo: tudo ou nada
        let (user, workspace) = self
            .identity_store
            .create_account(NewAccount {
                full_name: full_name.to_owned(),
                email: email.to_owned(),
                password_hash,
                role: UserRole::Admin,
                workspace_name: workspace_name.to_owned(),
                document_type: AUTO_WORKSPACE_DOCUMENT_TYPE,
                document_number: registration_document_number(),
            })
            .await?;

        tracing::info!(user_id = %user.id, workspace_id = %workspace.id, "🏥 Novo consultório cadastrado");

        // 7. Token para o usuário já vinculado
        let access_token = self.tokens.issue(&user)?;

        Ok(RegisterResponse {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
            workspace: workspace.into(),
            access_token,
        })
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let Some(account) = self.identity_store.find_account_by_email(email).await? else {
            tracing::debug!("Login recusado: e-mail desconhecido");
            return Err(AppError::InvalidCredentials);
        };

        if !self.verify_password(password, &account.user.password_hash).await? {
            tracing::debug!(user_id = %account.user.id, "Login recusado: senha incorreta");
            return Err(AppError::InvalidCredentials);
        }

        self.tokens.issue(&account.user)
    }

    /// Perfil do usuário autenticado. O consultório é sempre relido do armazenamento.
    pub async fn get_profile(&self, user: &User) -> Result<ProfileResponse, AppError> {
        let workspace = self
            .identity_store
            .find_workspace_for_user(user.id)
            .await?
            .map(WorkspaceResponse::from);

        Ok(ProfileResponse {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role,
            crm: user.crm.clone(),
            digital_signature_url: user.digital_signature_url.clone(),
            workspace,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }

    async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;

        // bcrypt é CPU-bound: roda fora do runtime assíncrono
        let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, AppError> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();

        let is_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
        Ok(is_valid)
    }
}

// "REG" + UUID v7 (ordenado pelo tempo), único o bastante para o par (tipo, número).
fn registration_document_number() -> String {
    format!("REG{}", Uuid::now_v7().simple())
}
