// Validation utilities module
// Provides custom validation functions for catalog documents

use uuid::Uuid;
use validator::ValidationError;

use crate::error::ApiError;

/// Validates that a required text field is not whitespace-only
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("must_not_be_blank"))
    } else {
        Ok(())
    }
}

/// Validates that a reference to another document is a well-formed id
pub fn validate_document_id(value: &str) -> Result<(), ValidationError> {
    if Uuid::parse_str(value).is_ok() {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_document_id"))
    }
}

/// Parses a path id, reporting a malformed one against `resource`
pub fn parse_document_id(raw: &str, resource: &'static str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidId { resource })
}
