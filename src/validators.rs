//! # Input Validation Module
//!
//! Validation of free-text user input collected during the request and
//! calculator flows. Every function returns the cleaned value or a
//! localization key describing what was wrong, so handlers can re-prompt.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::{MAX_COMMENT_LENGTH, MAX_NAME_LENGTH, MIN_NAME_LENGTH};

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-zА-Яа-яЁё\s\-]+$").expect("valid name regex"));

/// Validate a client name: letters (Latin or Cyrillic), spaces and hyphens
pub fn validate_name(name: &str) -> Result<String, &'static str> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err("name-empty");
    }
    if trimmed.chars().count() < MIN_NAME_LENGTH {
        return Err("name-too-short");
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err("name-too-long");
    }
    if !NAME_PATTERN.is_match(trimmed) {
        return Err("name-bad-characters");
    }

    Ok(trimmed.to_string())
}

/// Validate and normalize a Russian phone number to `+7XXXXXXXXXX`
pub fn validate_phone(phone: &str) -> Result<String, &'static str> {
    let trimmed = phone.trim();
    if trimmed.is_empty() {
        return Err("phone-empty");
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if let Some(rest) = cleaned.strip_prefix("+7") {
        if rest.len() == 10 && rest.chars().all(|c| c.is_ascii_digit()) {
            return Ok(cleaned);
        }
        return Err("phone-invalid");
    }
    if let Some(rest) = cleaned.strip_prefix('8') {
        if rest.len() == 10 && rest.chars().all(|c| c.is_ascii_digit()) {
            return Ok(format!("+7{rest}"));
        }
        return Err("phone-invalid");
    }
    if let Some(rest) = cleaned.strip_prefix('7') {
        if rest.len() == 10 && rest.chars().all(|c| c.is_ascii_digit()) {
            return Ok(format!("+7{rest}"));
        }
        return Err("phone-invalid");
    }

    Err("phone-invalid")
}

/// Validate a request comment; blank comments are allowed and stay blank
pub fn validate_comment(comment: &str) -> Result<String, &'static str> {
    let trimmed = comment.trim();
    if trimmed.chars().count() > MAX_COMMENT_LENGTH {
        return Err("comment-too-long");
    }
    Ok(trimmed.to_string())
}

/// Parse a positive number typed by the user, tolerating a decimal comma
pub fn parse_positive_number(input: &str) -> Result<f64, &'static str> {
    let cleaned = input.trim().replace(',', ".");
    let value = cleaned.parse::<f64>().map_err(|_| "number-invalid")?;
    if !value.is_finite() || value <= 0.0 {
        return Err("number-invalid");
    }
    Ok(value)
}

/// Parse a non-negative number typed by the user (zero allowed)
pub fn parse_non_negative_number(input: &str) -> Result<f64, &'static str> {
    let cleaned = input.trim().replace(',', ".");
    let value = cleaned.parse::<f64>().map_err(|_| "number-invalid")?;
    if !value.is_finite() || value < 0.0 {
        return Err("number-invalid");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_validation() {
        assert_eq!(validate_name("  Anna  ").unwrap(), "Anna");
        assert_eq!(validate_name("Анна-Мария").unwrap(), "Анна-Мария");

        assert_eq!(validate_name(""), Err("name-empty"));
        assert_eq!(validate_name("A"), Err("name-too-short"));
        assert_eq!(validate_name(&"a".repeat(51)), Err("name-too-long"));
        assert_eq!(validate_name("Anna42"), Err("name-bad-characters"));
    }

    #[test]
    fn test_phone_normalization() {
        assert_eq!(validate_phone("+79991234567").unwrap(), "+79991234567");
        assert_eq!(validate_phone("89991234567").unwrap(), "+79991234567");
        assert_eq!(validate_phone("79991234567").unwrap(), "+79991234567");
        assert_eq!(
            validate_phone("8 (999) 123-45-67").unwrap(),
            "+79991234567"
        );
    }

    #[test]
    fn test_phone_rejection() {
        assert_eq!(validate_phone(""), Err("phone-empty"));
        assert_eq!(validate_phone("12345"), Err("phone-invalid"));
        assert_eq!(validate_phone("+7999123456"), Err("phone-invalid"));
        assert_eq!(validate_phone("+19991234567"), Err("phone-invalid"));
    }

    #[test]
    fn test_comment_validation() {
        assert_eq!(validate_comment("  near the metro  ").unwrap(), "near the metro");
        assert_eq!(validate_comment("").unwrap(), "");
        assert_eq!(validate_comment(&"x".repeat(1001)), Err("comment-too-long"));
    }

    #[test]
    fn test_number_parsing() {
        assert_eq!(parse_positive_number("12,5").unwrap(), 12.5);
        assert_eq!(parse_positive_number(" 3000000 ").unwrap(), 3_000_000.0);
        assert!(parse_positive_number("0").is_err());
        assert!(parse_positive_number("-5").is_err());
        assert!(parse_positive_number("abc").is_err());

        assert_eq!(parse_non_negative_number("0").unwrap(), 0.0);
        assert!(parse_non_negative_number("-1").is_err());
    }
}
