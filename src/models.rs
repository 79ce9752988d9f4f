pub mod auth;
pub mod patient;

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use validator::ValidationError;

// Só dígitos: o `%Y` do chrono aceitaria sinal e espaços no ano.
static BIRTH_DATE_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("regex de data válida"));

// ---
// Validações compartilhadas pelos payloads
// ---

pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("not_blank");
        err.message = Some("O campo é obrigatório.".into());
        return Err(err);
    }
    Ok(())
}

// Formato YYYY-MM-DD e uma data que exista no calendário.
pub(crate) fn validate_birth_date(value: &str) -> Result<(), ValidationError> {
    let well_formed =
        BIRTH_DATE_FORMAT.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok();
    if !well_formed {
        let mut err = ValidationError::new("birth_date");
        err.message = Some("A data de nascimento deve estar no formato YYYY-MM-DD.".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn birth_date_requires_iso_calendar_date() {
        assert!(validate_birth_date("1990-05-15").is_ok());
        assert!(validate_birth_date("1990-5-15").is_err());
        assert!(validate_birth_date("1990-02-30").is_err());
        assert!(validate_birth_date("15/05/1990").is_err());
        assert!(validate_birth_date("+990-05-15").is_err());
        assert!(validate_birth_date("-990-05-15").is_err());
        assert!(validate_birth_date(" 990-05-15").is_err());
        assert!(validate_birth_date("1990-05-15\n").is_err());
    }

    #[test]
    fn blank_strings_are_rejected() {
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("Ana").is_ok());
    }
}
