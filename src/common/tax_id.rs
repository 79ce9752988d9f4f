// src/common/tax_id.rs

use std::sync::LazyLock;

use regex::Regex;
use validator::{ValidationError, ValidationErrors};

use crate::common::error::AppError;

// Formatos aceitos na entrada: "123.456.789-00" ou "12345678900".
static TAX_ID_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}\.\d{3}\.\d{3}-\d{2}$|^\d{11}$").expect("regex de CPF válida"));

pub const TAX_ID_LENGTH: usize = 11;

/// Remove os separadores `.` e `-` do CPF. Idempotente.
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(|c| *c != '.' && *c != '-').collect()
}

/// Normaliza e exige exatamente 11 dígitos depois da normalização.
pub fn normalize_strict(raw: &str) -> Result<String, AppError> {
    let normalized = normalize(raw);
    if normalized.len() == TAX_ID_LENGTH && normalized.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(normalized);
    }

    let mut errors = ValidationErrors::new();
    errors.add("tax_id", invalid_tax_id());
    Err(AppError::ValidationError(errors))
}

/// Validador usado nos payloads (`#[validate(custom(...))]`).
pub fn validate_tax_id_format(value: &str) -> Result<(), ValidationError> {
    if TAX_ID_FORMAT.is_match(value) {
        Ok(())
    } else {
        Err(invalid_tax_id())
    }
}

fn invalid_tax_id() -> ValidationError {
    let mut err = ValidationError::new("tax_id");
    err.message = Some("CPF deve estar no formato XXX.XXX.XXX-XX ou conter 11 dígitos.".into());
    err
}
