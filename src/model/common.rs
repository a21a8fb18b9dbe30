use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type Id = String;

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

/// Current time as an RFC 3339 string, the format every `created_at`/`updated_at` column uses
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All validation failures found for one record
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("validation failed: {}", .0.iter().map(|e| format!("{}: {}", e.field, e.message)).collect::<Vec<_>>().join("; "))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Ok when nothing was collected
    pub fn into_result(errors: Vec<FieldError>) -> Result<(), ValidationErrors> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_message_lists_every_field() {
        let err = ValidationErrors(vec![
            FieldError::new("title", "must not be empty"),
            FieldError::new("price", "must not be negative"),
        ]);
        let message = err.to_string();
        assert!(message.contains("title: must not be empty"));
        assert!(message.contains("price: must not be negative"));
    }

    #[test]
    fn test_into_result_is_ok_when_empty() {
        assert!(ValidationErrors::into_result(vec![]).is_ok());
        assert!(ValidationErrors::into_result(vec![FieldError::new("a", "b")]).is_err());
    }
}
