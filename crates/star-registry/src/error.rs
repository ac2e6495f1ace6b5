//! Error types for the star registry service.

use star_registry_core::CoreError;
use star_registry_store::StoreError;
use thiserror::Error;

/// Errors that can occur during registry, ledger, or orchestration operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No live validation request exists for the identity.
    ///
    /// Covers both "never requested" and "expired or already consumed".
    #[error("no validation request for identity {identity}")]
    RequestNotFound { identity: String },

    /// No ledger record at the requested height.
    #[error("no record at height {height}")]
    RecordNotFound { height: u64 },

    /// A ledger append was attempted without a valid signature on file.
    #[error("identity {identity} has not been validated")]
    NotValidated { identity: String },

    /// Storage engine error.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// A stored value could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CoreError),

    /// Configuration rejected by [`Config::validate`](crate::Config::validate).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse classification of an error for the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    NotValidated,
    /// A signature did not verify. Reported through
    /// [`SignatureState::Invalid`](star_registry_core::SignatureState::Invalid),
    /// never returned as an error.
    VerificationFailed,
    StorageFailure,
    Configuration,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::RequestNotFound { .. } | Error::RecordNotFound { .. } => ErrorKind::NotFound,
            Error::NotValidated { .. } => ErrorKind::NotValidated,
            Error::Storage(_) | Error::Codec(_) => ErrorKind::StorageFailure,
            Error::InvalidConfig(_) => ErrorKind::Configuration,
        }
    }

    /// Whether the caller caused this error and can recover from it.
    pub fn is_client_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::NotFound | ErrorKind::NotValidated)
    }
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let not_found = Error::RequestNotFound {
            identity: "addr1".into(),
        };
        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        assert!(not_found.is_client_error());

        let not_validated = Error::NotValidated {
            identity: "addr1".into(),
        };
        assert_eq!(not_validated.kind(), ErrorKind::NotValidated);
        assert!(not_validated.is_client_error());

        let storage = Error::from(StoreError::Task("cancelled".into()));
        assert_eq!(storage.kind(), ErrorKind::StorageFailure);
        assert!(!storage.is_client_error());

        let codec = Error::from(CoreError::DecodingError("truncated".into()));
        assert_eq!(codec.kind(), ErrorKind::StorageFailure);
    }

    #[test]
    fn test_error_messages() {
        let err = Error::RecordNotFound { height: 7 };
        assert_eq!(err.to_string(), "no record at height 7");
    }
}
