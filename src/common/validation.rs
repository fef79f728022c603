// src/common/validation.rs

// Validações customizadas usadas pelos payloads (`#[validate(custom(...))]`).
// A mensagem é a chave do catálogo: "validation.<message>".

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::models::guest::normalize_phone;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        return Err(error("range", "not_negative"));
    }
    Ok(())
}

pub fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        return Err(error("range", "positive"));
    }
    Ok(())
}

/// Letras minúsculas, dígitos e hífens (sem hífen nas pontas).
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let valid = !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid {
        return Err(error("slug", "invalid_slug"));
    }
    Ok(())
}

/// Telefone com 7 a 15 dígitos depois da normalização.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = normalize_phone(phone).trim_start_matches('+').len();
    if !(7..=15).contains(&digits) {
        return Err(error("phone", "invalid_phone"));
    }
    Ok(())
}

/// Apenas URLs http(s); os arquivos ficam no storage externo.
pub fn validate_http_url(url: &str) -> Result<(), ValidationError> {
    let url = url.trim();
    let valid = (url.starts_with("https://") || url.starts_with("http://")) && !url.contains(char::is_whitespace);
    if !valid {
        return Err(error("url", "invalid_url"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs() {
        assert!(validate_slug("hotel-aurora-2").is_ok());
        assert!(validate_slug("Hotel").is_err());
        assert!(validate_slug("-aurora").is_err());
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn amounts() {
        assert!(validate_not_negative(&Decimal::ZERO).is_ok());
        assert!(validate_not_negative(&Decimal::new(-1, 2)).is_err());
        assert!(validate_positive(&Decimal::ZERO).is_err());
        assert!(validate_positive(&Decimal::new(1, 2)).is_ok());
    }

    #[test]
    fn phones_and_urls() {
        assert!(validate_phone("+91 98123 45678").is_ok());
        assert!(validate_phone("12-34").is_err());
        assert!(validate_http_url("https://cdn.example.in/gst.pdf").is_ok());
        assert!(validate_http_url("ftp://x").is_err());
        assert!(validate_http_url("https://a b").is_err());
    }
}
