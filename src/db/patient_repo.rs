// src/db/patient_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::map_unique_violation, error::AppError},
    db::store::PatientStore,
    models::patient::{NewPatient, Patient, PatientChanges},
};

#[derive(Clone)]
pub struct PatientRepository {
    pool: PgPool,
}

impl PatientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PatientStore for PatientRepository {
    async fn tax_id_in_use(
        &self,
        workspace_id: Uuid,
        tax_id: &str,
        except: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM patients
                WHERE workspace_id = $1
                  AND tax_id = $2
                  AND is_active
                  AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(workspace_id)
        .bind(tax_id)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert(&self, patient: NewPatient) -> Result<Patient, AppError> {
        let d = &patient.data;

        // id, is_active e timestamps ficam a cargo dos DEFAULTs da tabela.
        sqlx::query_as::<_, Patient>(
            r#"
            INSERT INTO patients (
                workspace_id, full_name, tax_id, birth_date, contact_phone,
                identity_document, sex, secondary_contact_phone, email,
                zip_code, address_street, address_number, address_complement,
                address_neighborhood, address_city, address_state,
                guardian_full_name, guardian_tax_id, guardian_contact_phone,
                health_insurance, insurance_card_number, allergies,
                fitzpatrick_phototype, general_observations
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24
            )
            RETURNING *
            "#,
        )
        .bind(patient.workspace_id)
        .bind(&d.full_name)
        .bind(&patient.tax_id)
        .bind(&d.birth_date)
        .bind(&d.contact_phone)
        .bind(&d.identity_document)
        .bind(d.sex)
        .bind(&d.secondary_contact_phone)
        .bind(&d.email)
        .bind(&d.zip_code)
        .bind(&d.address_street)
        .bind(&d.address_number)
        .bind(&d.address_complement)
        .bind(&d.address_neighborhood)
        .bind(&d.address_city)
        .bind(&d.address_state)
        .bind(&d.guardian_full_name)
        .bind(&d.guardian_tax_id)
        .bind(&d.guardian_contact_phone)
        .bind(&d.health_insurance)
        .bind(&d.insurance_card_number)
        .bind(&d.allergies)
        .bind(d.fitzpatrick_phototype)
        .bind(&d.general_observations)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)
    }

    async fn list_active(&self, workspace_id: Uuid) -> Result<Vec<Patient>, AppError> {
        // COLLATE "C": ordem de bytes, igual à ordenação de `str` no MemoryStore.
        let patients = sqlx::query_as::<_, Patient>(
            r#"
            SELECT * FROM patients
            WHERE workspace_id = $1 AND is_active
            ORDER BY full_name COLLATE "C" ASC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(patients)
    }

    async fn find_active(&self, workspace_id: Uuid, id: Uuid) -> Result<Option<Patient>, AppError> {
        let patient = sqlx::query_as::<_, Patient>(
            "SELECT * FROM patients WHERE id = $1 AND workspace_id = $2 AND is_active",
        )
        .bind(id)
        .bind(workspace_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(patient)
    }

    async fn update(
        &self,
        workspace_id: Uuid,
        id: Uuid,
        changes: &PatientChanges,
    ) -> Result<Option<Patient>, AppError> {
        let c = &changes.0;

        // COALESCE: parâmetro NULL = mantém o valor atual (semântica de PATCH).
        sqlx::query_as::<_, Patient>(
            r#"
            UPDATE patients SET
                full_name               = COALESCE($3, full_name),
                tax_id                  = COALESCE($4, tax_id),
                birth_date              = COALESCE($5, birth_date),
                contact_phone           = COALESCE($6, contact_phone),
                identity_document       = COALESCE($7, identity_document),
                sex                     = COALESCE($8, sex),
                secondary_contact_phone = COALESCE($9, secondary_contact_phone),
                email                   = COALESCE($10, email),
                zip_code                = COALESCE($11, zip_code),
                address_street          = COALESCE($12, address_street),
                address_number          = COALESCE($13, address_number),
                address_complement      = COALESCE($14, address_complement),
                address_neighborhood    = COALESCE($15, address_neighborhood),
                address_city            = COALESCE($16, address_city),
                address_state           = COALESCE($17, address_state),
                guardian_full_name      = COALESCE($18, guardian_full_name),
                guardian_tax_id         = COALESCE($19, guardian_tax_id),
                guardian_contact_phone  = COALESCE($20, guardian_contact_phone),
                health_insurance        = COALESCE($21, health_insurance),
                insurance_card_number   = COALESCE($22, insurance_card_number),
                allergies               = COALESCE($23, allergies),
                fitzpatrick_phototype   = COALESCE($24, fitzpatrick_phototype),
                general_observations    = COALESCE($25, general_observations),
                updated_at              = now()
            WHERE id = $1 AND workspace_id = $2 AND is_active
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(workspace_id)
        .bind(&c.full_name)
        .bind(&c.tax_id)
        .bind(&c.birth_date)
        .bind(&c.contact_phone)
        .bind(&c.identity_document)
        .bind(c.sex)
        .bind(&c.secondary_contact_phone)
        .bind(&c.email)
        .bind(&c.zip_code)
        .bind(&c.address_street)
        .bind(&c.address_number)
        .bind(&c.address_complement)
        .bind(&c.address_neighborhood)
        .bind(&c.address_city)
        .bind(&c.address_state)
        .bind(&c.guardian_full_name)
        .bind(&c.guardian_tax_id)
        .bind(&c.guardian_contact_phone)
        .bind(&c.health_insurance)
        .bind(&c.insurance_card_number)
        .bind(&c.allergies)
        .bind(c.fitzpatrick_phototype)
        .bind(&c.general_observations)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)
    }

    async fn deactivate(&self, workspace_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE patients
            SET is_active = false, updated_at = now()
            WHERE id = $1 AND workspace_id = $2 AND is_active
            "#,
        )
        .bind(id)
        .bind(workspace_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
