// tests/postgres.rs
//
// Testes dos repositórios Postgres. Precisam de um banco real:
//   DATABASE_URL=postgres://... cargo test --test postgres -- --ignored
// O `#[sqlx::test]` cria um banco temporário por teste e aplica `migrations/`.

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use mediapp_api::{
    common::error::AppError,
    db::{IdentityStore, PatientRepository, PatientStore, UserRepository},
    models::{
        auth::{DocumentType, NewAccount, UserRole},
        patient::{CreatePatientPayload, NewPatient, PatientChanges, UpdatePatientPayload},
    },
};

fn account(email: &str, document_number: &str) -> NewAccount {
    NewAccount {
        full_name: "Dr. Teste".into(),
        email: email.into(),
        password_hash: "hash".into(),
        role: UserRole::Admin,
        workspace_name: "Clínica Teste".into(),
        document_type: DocumentType::Cpf,
        document_number: document_number.into(),
    }
}

fn new_patient(workspace_id: Uuid, name: &str, tax_id: &str) -> NewPatient {
    let data: CreatePatientPayload = serde_json::from_value(json!({
        "fullName": name,
        "taxId": tax_id,
        "birthDate": "1990-05-15",
        "contactPhone": "11999999999",
        "allergies": "Dipirona",
        "fitzpatrickPhototype": 2
    }))
    .unwrap();
    NewPatient { workspace_id, tax_id: tax_id.into(), data }
}

async fn workspace(pool: &PgPool, email: &str) -> Uuid {
    let (_, workspace) = UserRepository::new(pool.clone())
        .create_account(account(email, &format!("REG-{email}")))
        .await
        .unwrap();
    workspace.id
}

#[sqlx::test]
#[ignore = "precisa de DATABASE_URL"]
async fn create_account_rolls_back_on_document_conflict(pool: PgPool) {
    let users = UserRepository::new(pool.clone());
    let (user, workspace) = users.create_account(account("a@x.com", "REG1")).await.unwrap();
    assert_eq!(user.workspace_id, Some(workspace.id));
    assert_eq!(workspace.owner_id, user.id);

    // O usuário novo é inserido antes do consultório; o rollback tem que desfazê-lo.
    let err = users.create_account(account("b@x.com", "REG1")).await.unwrap_err();
    assert!(matches!(err, AppError::WorkspaceDocumentAlreadyExists));
    assert!(!users.email_exists("b@x.com").await.unwrap());

    let err = users.create_account(account("a@x.com", "REG2")).await.unwrap_err();
    assert!(matches!(err, AppError::EmailAlreadyExists));

    let workspaces: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workspaces")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(workspaces, 1);
}

#[sqlx::test]
#[ignore = "precisa de DATABASE_URL"]
async fn partial_index_maps_to_tax_id_conflict(pool: PgPool) {
    let ws = workspace(&pool, "a@x.com").await;
    let patients = PatientRepository::new(pool.clone());

    let first = patients.insert(new_patient(ws, "Ana", "11111111111")).await.unwrap();

    // Sem a pré-verificação do serviço: quem barra é o índice único parcial.
    let err = patients.insert(new_patient(ws, "Bia", "11111111111")).await.unwrap_err();
    assert!(matches!(err, AppError::TaxIdAlreadyExists));

    assert!(patients.deactivate(ws, first.id).await.unwrap());
    assert!(!patients.deactivate(ws, first.id).await.unwrap());
    assert!(patients.insert(new_patient(ws, "Bia", "11111111111")).await.is_ok());
}

#[sqlx::test]
#[ignore = "precisa de DATABASE_URL"]
async fn update_keeps_absent_fields_and_checks_tax_id(pool: PgPool) {
    let ws = workspace(&pool, "a@x.com").await;
    let patients = PatientRepository::new(pool.clone());
    let ana = patients.insert(new_patient(ws, "Ana", "11111111111")).await.unwrap();
    patients.insert(new_patient(ws, "Bia", "22222222222")).await.unwrap();

    let rename = PatientChanges(UpdatePatientPayload {
        full_name: Some("Ana Paula".into()),
        ..Default::default()
    });
    let updated = patients.update(ws, ana.id, &rename).await.unwrap().unwrap();
    assert_eq!(updated.full_name, "Ana Paula");
    assert_eq!(updated.tax_id, ana.tax_id);
    assert_eq!(updated.allergies, ana.allergies);
    assert_eq!(updated.fitzpatrick_phototype, Some(2));
    assert_eq!(updated.created_at, ana.created_at);
    assert!(updated.updated_at >= ana.updated_at);

    let steal = PatientChanges(UpdatePatientPayload {
        tax_id: Some("22222222222".into()),
        ..Default::default()
    });
    let err = patients.update(ws, ana.id, &steal).await.unwrap_err();
    assert!(matches!(err, AppError::TaxIdAlreadyExists));

    // Outro consultório não enxerga o paciente.
    let other = workspace(&pool, "b@x.com").await;
    assert!(patients.update(other, ana.id, &rename).await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "precisa de DATABASE_URL"]
async fn list_is_scoped_active_and_byte_ordered(pool: PgPool) {
    let ws = workspace(&pool, "a@x.com").await;
    let other = workspace(&pool, "b@x.com").await;
    let patients = PatientRepository::new(pool.clone());

    patients.insert(new_patient(ws, "bruno", "33333333333")).await.unwrap();
    patients.insert(new_patient(ws, "Carlos", "22222222222")).await.unwrap();
    let removed = patients.insert(new_patient(ws, "Ana", "11111111111")).await.unwrap();
    patients.insert(new_patient(other, "Zelia", "44444444444")).await.unwrap();
    patients.deactivate(ws, removed.id).await.unwrap();

    let names: Vec<String> = patients
        .list_active(ws)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.full_name)
        .collect();
    // Ordem de bytes: maiúsculas antes de minúsculas.
    assert_eq!(names, vec!["Carlos", "bruno"]);
}
