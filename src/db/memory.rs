// src/db/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{IdentityStore, PatientStore},
    models::{
        auth::{NewAccount, User, UserAccount, Workspace},
        patient::{NewPatient, Patient, PatientChanges},
    },
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    workspaces: HashMap<Uuid, Workspace>,
    patients: HashMap<Uuid, Patient>,
}

impl Tables {
    fn active_tax_id_taken(&self, workspace_id: Uuid, tax_id: &str, except: Option<Uuid>) -> bool {
        self.patients.values().any(|p| {
            p.active && p.workspace_id == workspace_id && p.tax_id == tax_id && Some(p.id) != except
        })
    }
}

/// Armazenamento em memória com as mesmas restrições do schema Postgres.
///
/// Um único mutex serializa todas as operações; cada operação verifica todas
/// as restrições antes de escrever, então um erro nunca deixa escrita parcial.
/// Usado nos testes e quando `DATABASE_URL` não está definida.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().any(|u| u.email == email))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<UserAccount>, AppError> {
        let tables = self.tables.lock().await;
        let Some(user) = tables.users.values().find(|u| u.email == email).cloned() else {
            return Ok(None);
        };
        let workspace = user
            .workspace_id
            .and_then(|id| tables.workspaces.get(&id).cloned());
        Ok(Some(UserAccount { user, workspace }))
    }

    async fn find_workspace_for_user(&self, user_id: Uuid) -> Result<Option<Workspace>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .get(&user_id)
            .and_then(|u| u.workspace_id)
            .and_then(|id| tables.workspaces.get(&id).cloned()))
    }

    async fn create_account(&self, account: NewAccount) -> Result<(User, Workspace), AppError> {
        let mut tables = self.tables.lock().await;

        // Restrições primeiro: nada é gravado se alguma falhar.
        if tables.users.values().any(|u| u.email == account.email) {
            return Err(AppError::EmailAlreadyExists);
        }
        if tables.workspaces.values().any(|w| {
            w.document_type == account.document_type && w.document_number == account.document_number
        }) {
            return Err(AppError::WorkspaceDocumentAlreadyExists);
        }

        let now = Utc::now();
        let mut user = User {
            id: Uuid::new_v4(),
            workspace_id: None,
            full_name: account.full_name,
            email: account.email,
            password_hash: account.password_hash,
            crm: None,
            role: account.role,
            digital_signature_url: None,
            password_reset_token: None,
            password_reset_expires: None,
            created_at: now,
            updated_at: now,
        };

        let workspace = Workspace {
            id: Uuid::new_v4(),
            name: account.workspace_name,
            document_type: account.document_type,
            document_number: account.document_number,
            owner_id: user.id,
            created_at: now,
            updated_at: now,
        };

        user.workspace_id = Some(workspace.id);
        user.updated_at = Utc::now();

        tables.workspaces.insert(workspace.id, workspace.clone());
        tables.users.insert(user.id, user.clone());

        Ok((user, workspace))
    }
}

#[async_trait]
impl PatientStore for MemoryStore {
    async fn tax_id_in_use(
        &self,
        workspace_id: Uuid,
        tax_id: &str,
        except: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.active_tax_id_taken(workspace_id, tax_id, except))
    }

    async fn insert(&self, patient: NewPatient) -> Result<Patient, AppError> {
        let mut tables = self.tables.lock().await;

        if tables.active_tax_id_taken(patient.workspace_id, &patient.tax_id, None) {
            return Err(AppError::TaxIdAlreadyExists);
        }

        let now = Utc::now();
        let d = patient.data;
        let row = Patient {
            id: Uuid::new_v4(),
            workspace_id: patient.workspace_id,
            full_name: d.full_name,
            tax_id: patient.tax_id,
            identity_document: d.identity_document,
            birth_date: d.birth_date,
            sex: d.sex,
            contact_phone: d.contact_phone,
            secondary_contact_phone: d.secondary_contact_phone,
            email: d.email,
            zip_code: d.zip_code,
            address_street: d.address_street,
            address_number: d.address_number,
            address_complement: d.address_complement,
            address_neighborhood: d.address_neighborhood,
            address_city: d.address_city,
            address_state: d.address_state,
            guardian_full_name: d.guardian_full_name,
            guardian_tax_id: d.guardian_tax_id,
            guardian_contact_phone: d.guardian_contact_phone,
            health_insurance: d.health_insurance,
            insurance_card_number: d.insurance_card_number,
            allergies: d.allergies,
            fitzpatrick_phototype: d.fitzpatrick_phototype,
            general_observations: d.general_observations,
            active: true,
            created_at: now,
            updated_at: now,
        };

        tables.patients.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_active(&self, workspace_id: Uuid) -> Result<Vec<Patient>, AppError> {
        let tables = self.tables.lock().await;
        let mut patients: Vec<Patient> = tables
            .patients
            .values()
            .filter(|p| p.active && p.workspace_id == workspace_id)
            .cloned()
            .collect();
        patients.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(patients)
    }

    async fn find_active(&self, workspace_id: Uuid, id: Uuid) -> Result<Option<Patient>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .patients
            .get(&id)
            .filter(|p| p.active && p.workspace_id == workspace_id)
            .cloned())
    }

    async fn update(
        &self,
        workspace_id: Uuid,
        id: Uuid,
        changes: &PatientChanges,
    ) -> Result<Option<Patient>, AppError> {
        let mut tables = self.tables.lock().await;

        let visible = tables
            .patients
            .get(&id)
            .is_some_and(|p| p.active && p.workspace_id == workspace_id);
        if !visible {
            return Ok(None);
        }

        if let Some(tax_id) = &changes.0.tax_id {
            if tables.active_tax_id_taken(workspace_id, tax_id, Some(id)) {
                return Err(AppError::TaxIdAlreadyExists);
            }
        }

        let Some(patient) = tables.patients.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply_to(patient);
        patient.updated_at = Utc::now();
        Ok(Some(patient.clone()))
    }

    async fn deactivate(&self, workspace_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        match tables.patients.get_mut(&id) {
            Some(p) if p.active && p.workspace_id == workspace_id => {
                p.active = false;
                p.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
