// src/services/patient.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::{error::AppError, tax_id},
    db::PatientStore,
    models::{
        auth::User,
        patient::{CreatePatientPayload, NewPatient, Patient, PatientChanges, UpdatePatientPayload},
    },
};

/// Regras de negócio dos pacientes. Toda operação recebe o usuário logado
/// explicitamente e fica restrita ao consultório dele.
#[derive(Clone)]
pub struct PatientService {
    store: Arc<dyn PatientStore>,
}

impl PatientService {
    pub fn new(store: Arc<dyn PatientStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, payload: CreatePatientPayload, user: &User) -> Result<Patient, AppError> {
        let workspace_id = workspace_of(user)?;
        let normalized = tax_id::normalize_strict(&payload.tax_id)?;

        // Pré-verificação para a mensagem de erro; o índice único parcial é a garantia real.
        if self.store.tax_id_in_use(workspace_id, &normalized, None).await? {
            return Err(AppError::TaxIdAlreadyExists);
        }

        let patient = self
            .store
            .insert(NewPatient { workspace_id, tax_id: normalized, data: payload })
            .await?;

        tracing::info!(patient_id = %patient.id, %workspace_id, "Paciente cadastrado");
        Ok(patient)
    }

    pub async fn find_all(&self, user: &User) -> Result<Vec<Patient>, AppError> {
        let workspace_id = workspace_of(user)?;
        self.store.list_active(workspace_id).await
    }

    /// Paciente de outro consultório ou removido é tratado como inexistente.
    pub async fn find_one(&self, id: Uuid, user: &User) -> Result<Patient, AppError> {
        let workspace_id = workspace_of(user)?;
        self.store
            .find_active(workspace_id, id)
            .await?
            .ok_or(AppError::PatientNotFound)
    }

    pub async fn update(
        &self,
        id: Uuid,
        mut payload: UpdatePatientPayload,
        user: &User,
    ) -> Result<Patient, AppError> {
        let workspace_id = workspace_of(user)?;
        self.find_one(id, user).await?;

        if let Some(raw) = payload.tax_id.take() {
            let normalized = tax_id::normalize_strict(&raw)?;
            if self.store.tax_id_in_use(workspace_id, &normalized, Some(id)).await? {
                return Err(AppError::TaxIdAlreadyExists);
            }
            payload.tax_id = Some(normalized);
        }

        let patient = self
            .store
            .update(workspace_id, id, &PatientChanges(payload))
            .await?
            .ok_or(AppError::PatientNotFound)?;

        tracing::info!(patient_id = %patient.id, %workspace_id, "Paciente atualizado");
        Ok(patient)
    }

    /// Soft delete. Uma segunda chamada falha com `PatientNotFound`.
    pub async fn remove(&self, id: Uuid, user: &User) -> Result<(), AppError> {
        let workspace_id = workspace_of(user)?;
        self.find_one(id, user).await?;

        if !self.store.deactivate(workspace_id, id).await? {
            return Err(AppError::PatientNotFound);
        }

        tracing::info!(patient_id = %id, %workspace_id, "Paciente removido (inativado)");
        Ok(())
    }
}

fn workspace_of(user: &User) -> Result<Uuid, AppError> {
    user.workspace_id.ok_or(AppError::MissingWorkspace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{IdentityStore, MemoryStore};
    use crate::models::auth::{DocumentType, NewAccount, UserRole};
    use crate::models::patient::SexType;
    use serde_json::json;

    struct Fixture {
        service: PatientService,
        store: Arc<MemoryStore>,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(MemoryStore::new());
            Self { service: PatientService::new(store.clone()), store }
        }

        async fn user(&self, email: &str) -> User {
            let (user, _) = self
                .store
                .create_account(NewAccount {
                    full_name: "Dr. Teste".into(),
                    email: email.into(),
                    password_hash: "hash".into(),
                    role: UserRole::Admin,
                    workspace_name: format!("Clínica {email}"),
                    document_type: DocumentType::Cpf,
                    document_number: format!("REG-{email}"),
                })
                .await
                .unwrap();
            user
        }
    }

    fn payload(name: &str, tax_id: &str) -> CreatePatientPayload {
        serde_json::from_value(json!({
            "fullName": name,
            "taxId": tax_id,
            "birthDate": "1990-05-15",
            "contactPhone": "(11) 98765-4321",
            "sex": "FEMALE",
            "allergies": "Penicilina",
            "fitzpatrickPhototype": 3
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn create_normalizes_tax_id_and_scopes_to_workspace() {
        let f = Fixture::new();
        let user = f.user("a@x.com").await;

        let patient = f.service.create(payload("Ana", "123.456.789-00"), &user).await.unwrap();

        assert_eq!(patient.tax_id, "12345678900");
        assert_eq!(Some(patient.workspace_id), user.workspace_id);
        assert!(patient.active);
        assert_eq!(patient.sex, Some(SexType::Female));
        assert_eq!(patient.fitzpatrick_phototype, Some(3));
        assert_eq!(patient.email, None);
        assert_eq!(f.service.find_one(patient.id, &user).await.unwrap(), patient);
    }

    #[tokio::test]
    async fn masked_and_plain_tax_ids_collide() {
        let f = Fixture::new();
        let user = f.user("a@x.com").await;

        f.service.create(payload("Ana", "123.456.789-00"), &user).await.unwrap();
        let err = f.service.create(payload("Bia", "12345678900"), &user).await.unwrap_err();
        assert!(matches!(err, AppError::TaxIdAlreadyExists));
    }

    #[tokio::test]
    async fn same_tax_id_is_allowed_in_another_workspace() {
        let f = Fixture::new();
        let a = f.user("a@x.com").await;
        let b = f.user("b@x.com").await;

        f.service.create(payload("Ana", "12345678900"), &a).await.unwrap();
        assert!(f.service.create(payload("Ana", "12345678900"), &b).await.is_ok());
    }

    #[tokio::test]
    async fn soft_deleted_patient_frees_its_tax_id() {
        let f = Fixture::new();
        let user = f.user("a@x.com").await;

        let first = f.service.create(payload("Ana", "111.111.111-11"), &user).await.unwrap();
        f.service.remove(first.id, &user).await.unwrap();

        let second = f.service.create(payload("Ana", "11111111111"), &user).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn remove_twice_fails_with_not_found() {
        let f = Fixture::new();
        let user = f.user("a@x.com").await;
        let patient = f.service.create(payload("Ana", "11111111111"), &user).await.unwrap();

        f.service.remove(patient.id, &user).await.unwrap();
        let err = f.service.remove(patient.id, &user).await.unwrap_err();
        assert!(matches!(err, AppError::PatientNotFound));
        assert!(matches!(
            f.service.find_one(patient.id, &user).await,
            Err(AppError::PatientNotFound)
        ));
    }

    #[tokio::test]
    async fn other_workspaces_get_not_found() {
        let f = Fixture::new();
        let owner = f.user("a@x.com").await;
        let intruder = f.user("b@x.com").await;
        let patient = f.service.create(payload("Ana", "11111111111"), &owner).await.unwrap();

        let patch = UpdatePatientPayload { full_name: Some("Hacked".into()), ..Default::default() };

        assert!(matches!(
            f.service.find_one(patient.id, &intruder).await,
            Err(AppError::PatientNotFound)
        ));
        assert!(matches!(
            f.service.update(patient.id, patch, &intruder).await,
            Err(AppError::PatientNotFound)
        ));
        assert!(matches!(
            f.service.remove(patient.id, &intruder).await,
            Err(AppError::PatientNotFound)
        ));
        assert!(matches!(
            f.service.find_one(Uuid::new_v4(), &intruder).await,
            Err(AppError::PatientNotFound)
        ));

        let untouched = f.service.find_one(patient.id, &owner).await.unwrap();
        assert_eq!(untouched.full_name, "Ana");
    }

    #[tokio::test]
    async fn find_all_lists_only_active_sorted_by_name() {
        let f = Fixture::new();
        let user = f.user("a@x.com").await;
        let other = f.user("b@x.com").await;

        f.service.create(payload("Carlos", "33333333333"), &user).await.unwrap();
        let removed = f.service.create(payload("Bruno", "22222222222"), &user).await.unwrap();
        f.service.create(payload("Ana", "11111111111"), &user).await.unwrap();
        f.service.create(payload("Zelia", "44444444444"), &other).await.unwrap();
        f.service.remove(removed.id, &user).await.unwrap();

        let names: Vec<String> = f
            .service
            .find_all(&user)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.full_name)
            .collect();
        assert_eq!(names, vec!["Ana", "Carlos"]);
    }

    #[tokio::test]
    async fn patch_changes_only_the_given_fields() {
        let f = Fixture::new();
        let user = f.user("a@x.com").await;
        let before = f.service.create(payload("Ana", "11111111111"), &user).await.unwrap();

        let patch = UpdatePatientPayload { full_name: Some("X".into()), ..Default::default() };
        let after = f.service.update(before.id, patch, &user).await.unwrap();

        assert_eq!(after.full_name, "X");
        assert!(after.updated_at >= before.updated_at);

        let mut expected = before.clone();
        expected.full_name = "X".into();
        expected.updated_at = after.updated_at;
        assert_eq!(after, expected);
    }

    #[tokio::test]
    async fn patch_tax_id_conflicts_only_with_other_active_patients() {
        let f = Fixture::new();
        let user = f.user("a@x.com").await;
        let ana = f.service.create(payload("Ana", "11111111111"), &user).await.unwrap();
        let bia = f.service.create(payload("Bia", "22222222222"), &user).await.unwrap();

        // Reenviar o próprio CPF (com máscara) não é conflito.
        let same = UpdatePatientPayload { tax_id: Some("111.111.111-11".into()), ..Default::default() };
        assert_eq!(f.service.update(ana.id, same, &user).await.unwrap().tax_id, "11111111111");

        let taken = UpdatePatientPayload { tax_id: Some("222.222.222-22".into()), ..Default::default() };
        assert!(matches!(
            f.service.update(ana.id, taken, &user).await,
            Err(AppError::TaxIdAlreadyExists)
        ));

        // Depois que a Bia é removida o CPF dela pode ser reutilizado.
        f.service.remove(bia.id, &user).await.unwrap();
        let freed = UpdatePatientPayload { tax_id: Some("22222222222".into()), ..Default::default() };
        assert_eq!(f.service.update(ana.id, freed, &user).await.unwrap().tax_id, "22222222222");
    }

    #[tokio::test]
    async fn malformed_tax_id_after_normalization_is_rejected() {
        let f = Fixture::new();
        let user = f.user("a@x.com").await;

        let err = f.service.create(payload("Ana", "123.456-7"), &user).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn user_without_workspace_cannot_manage_patients() {
        let f = Fixture::new();
        let mut user = f.user("a@x.com").await;
        user.workspace_id = None;

        assert!(matches!(f.service.find_all(&user).await, Err(AppError::MissingWorkspace)));
        assert!(matches!(
            f.service.create(payload("Ana", "11111111111"), &user).await,
            Err(AppError::MissingWorkspace)
        ));
    }
}
