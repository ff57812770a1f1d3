// src/common/validation.rs

use validator::ValidationError;

const MIN_PHONE_LEN: usize = 8;

// O código vai em `message` para o error.rs traduzir
fn coded(code: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(code.into());
    err
}

// Texto só com espaços conta como ausente
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(coded("required"));
    }
    Ok(())
}

pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if value.trim().chars().count() < MIN_PHONE_LEN {
        return Err(coded("invalid_phone"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_after_trim_is_required() {
        for raw in ["", " ", "\t\n  "] {
            let err = validate_not_blank(raw).unwrap_err();
            assert_eq!(err.code, "required");
            assert_eq!(err.message.as_deref(), Some("required"));
        }
        assert!(validate_not_blank("  Man ").is_ok());
    }

    #[test]
    fn phone_length_ignores_surrounding_spaces() {
        assert!(validate_phone("0701020304").is_ok());
        assert_eq!(validate_phone("   0701    ").unwrap_err().code, "invalid_phone");
        assert_eq!(validate_phone("          ").unwrap_err().code, "invalid_phone");
    }
}
