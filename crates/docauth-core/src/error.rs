// Error taxonomy shared by the adapter service and every store backend.
//
// Absence is not an error: lookups return `Ok(None)`. `NotFound` is only
// raised where the caller was promised the target existed (deletes).

/// Errors raised by adapter and accessor operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    /// A delete targeted nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store rejected a write (e.g. a uniqueness violation).
    #[error("Insert failed: {0}")]
    InsertFailure(String),

    /// An update matched zero documents.
    #[error("Update failed: {0}")]
    UpdateFailure(String),

    /// An external identifier is not a valid encoding of an internal key.
    #[error("Malformed identifier: {0:?}")]
    MalformedIdentifier(String),

    /// Input rejected before reaching the store.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The store failed while reading.
    #[error("Database error: {0}")]
    Database(String),
}

impl AdapterError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_insert_failure(&self) -> bool {
        matches!(self, Self::InsertFailure(_))
    }

    pub fn is_update_failure(&self) -> bool {
        matches!(self, Self::UpdateFailure(_))
    }

    pub fn is_malformed_identifier(&self) -> bool {
        matches!(self, Self::MalformedIdentifier(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Configuration errors raised while loading the environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Result type for adapter and accessor operations.
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;
