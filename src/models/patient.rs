// src/models/patient.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::tax_id::validate_tax_id_format;
use crate::models::{validate_birth_date, validate_not_blank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sex_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SexType {
    Male,
    Female,
    Other,
}

// ---
// Patient (o registro persistido)
// ---
// Sempre pertence a exatamente um consultório. Nunca é apagado fisicamente:
// a remoção só desliga `active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub full_name: String,
    pub tax_id: String, // Sempre normalizado (11 dígitos)
    pub identity_document: Option<String>,
    pub birth_date: String,
    pub sex: Option<SexType>,
    pub contact_phone: String,
    pub secondary_contact_phone: Option<String>,
    pub email: Option<String>,
    pub zip_code: Option<String>,
    pub address_street: Option<String>,
    pub address_number: Option<String>,
    pub address_complement: Option<String>,
    pub address_neighborhood: Option<String>,
    pub address_city: Option<String>,
    pub address_state: Option<String>,
    pub guardian_full_name: Option<String>,
    pub guardian_tax_id: Option<String>,
    pub guardian_contact_phone: Option<String>,
    pub health_insurance: Option<String>,
    pub insurance_card_number: Option<String>,
    pub allergies: Option<String>,
    pub fitzpatrick_phototype: Option<i16>,
    pub general_observations: Option<String>,
    #[sqlx(rename = "is_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// Payload: CreatePatient
// ---
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientPayload {
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "João Silva Santos")]
    pub full_name: String,

    #[validate(custom(function = "validate_tax_id_format"))]
    #[schema(example = "123.456.789-00")]
    pub tax_id: String,

    #[validate(custom(function = "validate_birth_date"))]
    #[schema(example = "1990-05-15")]
    pub birth_date: String,

    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "(11) 98765-4321")]
    pub contact_phone: String,

    #[schema(example = "12.345.678-9")]
    pub identity_document: Option<String>,
    pub sex: Option<SexType>,
    pub secondary_contact_phone: Option<String>,

    #[validate(email(message = "Por favor, insira um e-mail válido."))]
    #[schema(example = "joao.silva@email.com")]
    pub email: Option<String>,

    pub zip_code: Option<String>,
    pub address_street: Option<String>,
    pub address_number: Option<String>,
    pub address_complement: Option<String>,
    pub address_neighborhood: Option<String>,
    pub address_city: Option<String>,
    #[schema(example = "SP")]
    pub address_state: Option<String>,
    pub guardian_full_name: Option<String>,
    pub guardian_tax_id: Option<String>,
    pub guardian_contact_phone: Option<String>,
    #[schema(example = "Unimed")]
    pub health_insurance: Option<String>,
    pub insurance_card_number: Option<String>,
    pub allergies: Option<String>,

    #[validate(range(min = 1, max = 6, message = "O fototipo deve ser entre 1 e 6."))]
    #[schema(example = 3, minimum = 1, maximum = 6)]
    pub fitzpatrick_phototype: Option<i16>,

    pub general_observations: Option<String>,
}

// ---
// Payload: UpdatePatient (PATCH)
// ---
// Campo ausente (ou `null`) = não mexe no valor atual.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientPayload {
    #[validate(custom(function = "validate_not_blank"))]
    pub full_name: Option<String>,

    #[validate(custom(function = "validate_tax_id_format"))]
    pub tax_id: Option<String>,

    #[validate(custom(function = "validate_birth_date"))]
    pub birth_date: Option<String>,

    #[validate(custom(function = "validate_not_blank"))]
    pub contact_phone: Option<String>,

    pub identity_document: Option<String>,
    pub sex: Option<SexType>,
    pub secondary_contact_phone: Option<String>,

    #[validate(email(message = "Por favor, insira um e-mail válido."))]
    pub email: Option<String>,

    pub zip_code: Option<String>,
    pub address_street: Option<String>,
    pub address_number: Option<String>,
    pub address_complement: Option<String>,
    pub address_neighborhood: Option<String>,
    pub address_city: Option<String>,
    pub address_state: Option<String>,
    pub guardian_full_name: Option<String>,
    pub guardian_tax_id: Option<String>,
    pub guardian_contact_phone: Option<String>,
    pub health_insurance: Option<String>,
    pub insurance_card_number: Option<String>,
    pub allergies: Option<String>,

    #[validate(range(min = 1, max = 6, message = "O fototipo deve ser entre 1 e 6."))]
    pub fitzpatrick_phototype: Option<i16>,

    pub general_observations: Option<String>,
}

/// Linha pronta para inserção: CPF já normalizado e consultório definido pelo usuário logado.
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub workspace_id: Uuid,
    pub tax_id: String,
    pub data: CreatePatientPayload,
}

/// Alterações de um PATCH, com o CPF (se presente) já normalizado.
#[derive(Debug, Clone, Default)]
pub struct PatientChanges(pub UpdatePatientPayload);

impl PatientChanges {
    /// Aplica apenas os campos presentes. Usado pelo armazenamento em memória;
    /// o Postgres faz o mesmo com COALESCE.
    pub fn apply_to(&self, patient: &mut Patient) {
        let c = &self.0;

        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }

        fn set_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        set(&mut patient.full_name, &c.full_name);
        set(&mut patient.tax_id, &c.tax_id);
        set(&mut patient.birth_date, &c.birth_date);
        set(&mut patient.contact_phone, &c.contact_phone);
        set_opt(&mut patient.identity_document, &c.identity_document);
        set_opt(&mut patient.sex, &c.sex);
        set_opt(&mut patient.secondary_contact_phone, &c.secondary_contact_phone);
        set_opt(&mut patient.email, &c.email);
        set_opt(&mut patient.zip_code, &c.zip_code);
        set_opt(&mut patient.address_street, &c.address_street);
        set_opt(&mut patient.address_number, &c.address_number);
        set_opt(&mut patient.address_complement, &c.address_complement);
        set_opt(&mut patient.address_neighborhood, &c.address_neighborhood);
        set_opt(&mut patient.address_city, &c.address_city);
        set_opt(&mut patient.address_state, &c.address_state);
        set_opt(&mut patient.guardian_full_name, &c.guardian_full_name);
        set_opt(&mut patient.guardian_tax_id, &c.guardian_tax_id);
        set_opt(&mut patient.guardian_contact_phone, &c.guardian_contact_phone);
        set_opt(&mut patient.health_insurance, &c.health_insurance);
        set_opt(&mut patient.insurance_card_number, &c.insurance_card_number);
        set_opt(&mut patient.allergies, &c.allergies);
        set_opt(&mut patient.fitzpatrick_phototype, &c.fitzpatrick_phototype);
        set_opt(&mut patient.general_observations, &c.general_observations);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn valid_payload() -> CreatePatientPayload {
        serde_json::from_value(serde_json::json!({
            "fullName": "Maria Souza",
            "taxId": "123.456.789-00",
            "birthDate": "1985-02-28",
            "contactPhone": "(11) 98765-4321"
        }))
        .unwrap()
    }

    #[test]
    fn minimal_create_payload_is_valid() {
        assert!(valid_payload().validate().is_ok());
    }

    #[test]
    fn create_payload_rejects_bad_fields() {
        let mut payload = valid_payload();
        payload.tax_id = "123-456".into();
        payload.birth_date = "28/02/1985".into();
        payload.fitzpatrick_phototype = Some(7);
        payload.email = Some("nao-e-email".into());

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("tax_id"));
        assert!(fields.contains_key("birth_date"));
        assert!(fields.contains_key("fitzpatrick_phototype"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn empty_patch_is_valid_and_changes_nothing() {
        let payload: UpdatePatientPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.validate().is_ok());

        let before = Patient {
            id: Uuid::new_v4(),
            workspace_id: Uuid::new_v4(),
            full_name: "Ana".into(),
            tax_id: "11111111111".into(),
            identity_document: None,
            birth_date: "2000-01-01".into(),
            sex: Some(SexType::Female),
            contact_phone: "1199999999".into(),
            secondary_contact_phone: None,
            email: Some("ana@example.com".into()),
            zip_code: None,
            address_street: None,
            address_number: None,
            address_complement: None,
            address_neighborhood: None,
            address_city: None,
            address_state: None,
            guardian_full_name: None,
            guardian_tax_id: None,
            guardian_contact_phone: None,
            health_insurance: None,
            insurance_card_number: None,
            allergies: Some("Dipirona".into()),
            fitzpatrick_phototype: Some(2),
            general_observations: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let mut after = before.clone();
        PatientChanges(payload).apply_to(&mut after);
        assert_eq!(after, before);
    }
}
