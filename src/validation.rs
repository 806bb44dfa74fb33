//! Input validation for user-supplied identifiers

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s\-()+.ext,]+$").expect("phone pattern is valid"));

static GROUP_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]+$").expect("group name pattern is valid"));

const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_PART_LEN: usize = 64;
const MIN_PHONE_DIGITS: usize = 7;
const MAX_GROUP_NAME_LEN: usize = 60;
const MAX_DEPARTMENT_LEN: usize = 100;

fn invalid(msg: impl Into<String>) -> Error {
    Error::Validation(msg.into())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(invalid("email address cannot be empty"));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(invalid(format!(
            "email address exceeds maximum length of {} characters",
            MAX_EMAIL_LEN
        )));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(invalid(format!("invalid email address format: {}", email)));
    }

    let local = email.split('@').next().unwrap_or_default();
    if local.len() > MAX_LOCAL_PART_LEN {
        return Err(invalid(format!(
            "email local part exceeds maximum length of {} characters",
            MAX_LOCAL_PART_LEN
        )));
    }
    Ok(())
}

/// Validate a phone number, optionally prefixed with a type (`mobile:555-0100`)
pub fn validate_phone(phone: &str) -> Result<()> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(invalid("phone number cannot be empty"));
    }

    let number = match phone.split_once(':') {
        Some((_, number)) => number,
        None => phone,
    };
    if !PHONE_RE.is_match(number) {
        return Err(invalid(format!("invalid phone number format: {}", number)));
    }
    if number.chars().filter(char::is_ascii_digit).count() < MIN_PHONE_DIGITS {
        return Err(invalid(format!(
            "phone number must contain at least {} digits",
            MIN_PHONE_DIGITS
        )));
    }
    Ok(())
}

/// Validate a group given as an email or a bare name
pub fn validate_group_name(name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid("group name cannot be empty"));
    }
    if name.contains('@') {
        return validate_email(name);
    }
    if name.len() > MAX_GROUP_NAME_LEN {
        return Err(invalid(format!(
            "group name exceeds maximum length of {} characters",
            MAX_GROUP_NAME_LEN
        )));
    }
    if !GROUP_NAME_RE.is_match(name) {
        return Err(invalid(format!(
            "group name contains invalid characters: {} (only alphanumeric, dots, hyphens, and underscores allowed)",
            name
        )));
    }
    Ok(())
}

pub fn validate_department(dept: &str) -> Result<()> {
    let dept = dept.trim();
    if dept.is_empty() {
        return Err(invalid("department name cannot be empty"));
    }
    if dept.chars().count() > MAX_DEPARTMENT_LEN {
        return Err(invalid(format!(
            "department name exceeds maximum length of {} characters",
            MAX_DEPARTMENT_LEN
        )));
    }
    Ok(())
}

/// Validate an employee ID (UUID)
pub fn validate_uuid(id: &str) -> Result<()> {
    uuid::Uuid::parse_str(id.trim())
        .map(|_| ())
        .map_err(|_| invalid(format!("invalid UUID format: {}", id.trim())))
}

/// Trim whitespace and drop control characters other than tab and newlines.
pub fn sanitize_input(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}
