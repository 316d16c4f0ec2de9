use once_cell::sync::Lazy;
use regex::Regex;

// Structural check only: something@something.something, no spaces.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    BusinessType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldValues {
    pub name: String,
    pub email: String,
    pub business_type: String,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Every failing field, in form order.
pub fn validate(values: &FieldValues) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if values.name.trim().is_empty() {
        errors.push(FieldError::new(Field::Name, "Name is required"));
    }

    let email = values.email.trim();
    if email.is_empty() {
        errors.push(FieldError::new(Field::Email, "Email is required"));
    } else if !is_valid_email(email) {
        errors.push(FieldError::new(Field::Email, "Please enter a valid email address"));
    }

    if values.business_type.is_empty() {
        errors.push(FieldError::new(Field::BusinessType, "Business type is required"));
    }

    errors
}
