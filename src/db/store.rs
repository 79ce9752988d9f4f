// src/db/store.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::{NewAccount, User, UserAccount, Workspace},
        patient::{NewPatient, Patient, PatientChanges},
    },
};

/// Persistência de usuários e consultórios.
///
/// Implementada pelo Postgres (`UserRepository`) e pelo `MemoryStore`.
/// As restrições de unicidade (e-mail, par tipo/número de documento) são
/// garantidas pela própria implementação e chegam aqui como `AppError` de conflito.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Busca pelo e-mail (comparação exata) já trazendo o consultório.
    async fn find_account_by_email(&self, email: &str) -> Result<Option<UserAccount>, AppError>;

    /// Consultório ao qual o usuário está vinculado, lido direto do armazenamento.
    async fn find_workspace_for_user(&self, user_id: Uuid) -> Result<Option<Workspace>, AppError>;

    /// Cria usuário, cria consultório com o usuário como dono e vincula os dois.
    /// Tudo ou nada: em caso de erro nenhuma linha fica gravada.
    async fn create_account(&self, account: NewAccount) -> Result<(User, Workspace), AppError>;
}

/// Persistência de pacientes, sempre filtrada pelo consultório.
///
/// Apenas registros ativos são visíveis. No máximo um paciente ativo por CPF
/// normalizado dentro do mesmo consultório.
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Existe paciente ativo com este CPF no consultório (ignorando `except`)?
    async fn tax_id_in_use(
        &self,
        workspace_id: Uuid,
        tax_id: &str,
        except: Option<Uuid>,
    ) -> Result<bool, AppError>;

    async fn insert(&self, patient: NewPatient) -> Result<Patient, AppError>;

    /// Pacientes ativos ordenados por nome (ordem de bytes).
    async fn list_active(&self, workspace_id: Uuid) -> Result<Vec<Patient>, AppError>;

    async fn find_active(&self, workspace_id: Uuid, id: Uuid) -> Result<Option<Patient>, AppError>;

    /// Aplica as alterações e atualiza `updated_at`. `None` se o paciente não estiver visível.
    async fn update(
        &self,
        workspace_id: Uuid,
        id: Uuid,
        changes: &PatientChanges,
    ) -> Result<Option<Patient>, AppError>;

    /// Desativa (soft delete). `false` se o paciente não estiver visível.
    async fn deactivate(&self, workspace_id: Uuid, id: Uuid) -> Result<bool, AppError>;
}
