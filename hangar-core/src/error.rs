//! Error types for Hangar operations

use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Record not found in {table} with code {code}")]
    NotFound { table: String, code: String },

    #[error("Table not found: {table}")]
    TableNotFound { table: String },

    #[error("Invalid key for {table}: {reason}")]
    InvalidKey { table: String, reason: String },

    #[error("Backing store {operation} failed on {table}: {reason}")]
    Backend {
        table: String,
        operation: String,
        reason: String,
    },

    #[error("Corrupt row in {table}: {reason}")]
    CorruptRow { table: String, reason: String },

    #[error("Dangling reference from {entity}.{field} to {code}")]
    DanglingReference {
        entity: String,
        field: String,
        code: String,
    },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Object store (picture blob) errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ObjectStoreError {
    #[error("Upload of {name} to {bucket} failed: {reason}")]
    UploadFailed {
        bucket: String,
        name: String,
        reason: String,
    },

    #[error("Delete from {bucket} failed: {reason}")]
    DeleteFailed { bucket: String, reason: String },
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Unknown {entity} referenced by {field}: {code}")]
    UnknownReference {
        entity: String,
        field: String,
        code: String,
    },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Incompatible options: {option_a} and {option_b}")]
    IncompatibleOptions { option_a: String, option_b: String },

    #[error("Operation {operation} not supported on {table}: {reason}")]
    Unsupported {
        table: String,
        operation: String,
        reason: String,
    },
}

/// Master error type for all Hangar errors.
#[derive(Debug, Clone, Error)]
pub enum HangarError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Object store error: {0}")]
    ObjectStore(#[from] ObjectStoreError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl HangarError {
    /// True when the error means "no such record".
    pub fn is_not_found(&self) -> bool {
        matches!(self, HangarError::Storage(StorageError::NotFound { .. }))
    }
}

/// Result type alias for Hangar operations.
pub type HangarResult<T> = Result<T, HangarError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display_not_found() {
        let err = StorageError::NotFound {
            table: "airline".to_string(),
            code: "iata:ba".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("airline"));
        assert!(msg.contains("iata:ba"));
    }

    #[test]
    fn test_dangling_reference_display() {
        let err = StorageError::DanglingReference {
            entity: "airline".to_string(),
            field: "country".to_string(),
            code: "zz".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Dangling reference from airline.country to zz"
        );
    }

    #[test]
    fn test_hangar_error_from_variants() {
        let err: HangarError = StorageError::LockPoisoned.into();
        assert!(matches!(err, HangarError::Storage(StorageError::LockPoisoned)));

        let err: HangarError = ValidationError::RequiredFieldMissing {
            field: "code".to_string(),
        }
        .into();
        assert!(err.to_string().starts_with("Validation error"));

        let err: HangarError = ConfigError::IncompatibleOptions {
            option_a: "secondary_index".to_string(),
            option_b: "no sort_key".to_string(),
        }
        .into();
        assert!(matches!(err, HangarError::Config(_)));
    }

    #[test]
    fn test_is_not_found() {
        let err: HangarError = StorageError::NotFound {
            table: "country".to_string(),
            code: "us".to_string(),
        }
        .into();
        assert!(err.is_not_found());

        let err: HangarError = StorageError::TableNotFound {
            table: "country".to_string(),
        }
        .into();
        assert!(!err.is_not_found());
    }
}
