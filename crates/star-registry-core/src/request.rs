//! Validation requests: a requester's time-bounded attempt to prove control
//! of an identity before registering a star.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::canonical::{decode_value, encode_value};
use crate::error::Result;

/// Signature state of a validation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureState {
    /// No signature submitted yet.
    Pending,
    /// A signature over the challenge verified.
    Valid,
    /// The last submitted signature did not verify.
    Invalid,
}

impl fmt::Display for SignatureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureState::Pending => f.write_str("pending"),
            SignatureState::Valid => f.write_str("valid"),
            SignatureState::Invalid => f.write_str("invalid"),
        }
    }
}

/// A stored validation request. At most one exists per identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRequest {
    pub identity: String,
    /// Start of the current window, whole seconds since epoch.
    pub created_at: i64,
    /// The string the requester must sign.
    pub message: String,
    /// Total length of the current window.
    pub window_secs: u64,
    pub verified: bool,
    pub signature_state: SignatureState,
}

impl ValidationRequest {
    /// Build the challenge message: `identity:created_at:suffix`.
    pub fn challenge_message(identity: &str, created_at: i64, suffix: &str) -> String {
        format!("{}:{}:{}", identity, created_at, suffix)
    }

    /// A fresh pending request.
    pub fn new(identity: impl Into<String>, now: i64, window_secs: u64, suffix: &str) -> Self {
        let identity = identity.into();
        let message = Self::challenge_message(&identity, now, suffix);
        Self {
            identity,
            created_at: now,
            message,
            window_secs,
            verified: false,
            signature_state: SignatureState::Pending,
        }
    }

    /// When the current window closes.
    pub fn expires_at(&self) -> i64 {
        let window = i64::try_from(self.window_secs).unwrap_or(i64::MAX);
        self.created_at.saturating_add(window)
    }

    /// Whether the current window has closed at `now`.
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at()
    }

    /// Seconds left in the current window, never negative.
    pub fn remaining_secs(&self, now: i64) -> u64 {
        self.expires_at().saturating_sub(now).max(0) as u64
    }

    /// Record a verified signature and restart the window at `now`.
    ///
    /// The challenge message is kept; it is what the requester signed.
    pub fn mark_valid(&mut self, now: i64, window_secs: u64) {
        self.verified = true;
        self.signature_state = SignatureState::Valid;
        self.created_at = now;
        self.window_secs = window_secs;
    }

    /// Record a failed signature. The window keeps counting down.
    pub fn mark_invalid(&mut self) {
        self.signature_state = SignatureState::Invalid;
    }

    /// Whether a ledger append may proceed on this request.
    pub fn is_registrable(&self) -> bool {
        self.verified && self.signature_state == SignatureState::Valid
    }

    /// Response to a validation request.
    pub fn snapshot(&self, now: i64) -> ValidationSnapshot {
        ValidationSnapshot {
            identity: self.identity.clone(),
            request_timestamp: self.created_at,
            message: self.message.clone(),
            validation_window: self.remaining_secs(now),
        }
    }

    /// Response to a signature submission or a registration check.
    pub fn outcome(&self, now: i64) -> ValidationOutcome {
        ValidationOutcome {
            register_record: self.is_registrable(),
            status: ValidationStatus {
                identity: self.identity.clone(),
                request_timestamp: self.created_at,
                message: self.message.clone(),
                validation_window: self.remaining_secs(now),
                signature_state: self.signature_state,
            },
        }
    }

    /// Serialize for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode_value(self)
    }

    /// Deserialize from storage.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode_value(bytes)
    }
}

/// What a requester sees after asking for validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSnapshot {
    pub identity: String,
    pub request_timestamp: i64,
    pub message: String,
    /// Seconds remaining, not the full window.
    pub validation_window: u64,
}

/// Current status of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationStatus {
    pub identity: String,
    pub request_timestamp: i64,
    pub message: String,
    pub validation_window: u64,
    pub signature_state: SignatureState,
}

/// What a requester sees after submitting a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Whether a record may now be registered for this identity.
    pub register_record: bool,
    pub status: ValidationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_message_format() {
        let request = ValidationRequest::new("addr1", 1_532_296_090, 300, "starRegistry");
        assert_eq!(request.message, "addr1:1532296090:starRegistry");
        assert_eq!(request.signature_state, SignatureState::Pending);
        assert!(!request.verified);
    }

    #[test]
    fn test_remaining_window_counts_down() {
        let request = ValidationRequest::new("addr1", 1000, 300, "starRegistry");
        assert_eq!(request.remaining_secs(1000), 300);
        assert_eq!(request.remaining_secs(1299), 1);
        assert_eq!(request.remaining_secs(1300), 0);
        assert_eq!(request.remaining_secs(5000), 0);
        assert!(!request.is_expired(1299));
        assert!(request.is_expired(1300));
    }

    #[test]
    fn test_huge_window_saturates() {
        let request = ValidationRequest::new("addr1", 1000, u64::MAX, "starRegistry");
        assert_eq!(request.expires_at(), i64::MAX);
        assert!(!request.is_expired(1000));
        assert_eq!(request.remaining_secs(1000), (i64::MAX - 1000) as u64);
    }

    #[test]
    fn test_mark_valid_restarts_window() {
        let mut request = ValidationRequest::new("addr1", 1000, 300, "starRegistry");
        request.mark_valid(1290, 1800);

        assert!(request.is_registrable());
        assert_eq!(request.remaining_secs(1290), 1800);
        assert_eq!(request.message, "addr1:1000:starRegistry");
    }

    #[test]
    fn test_mark_invalid_keeps_window() {
        let mut request = ValidationRequest::new("addr1", 1000, 300, "starRegistry");
        request.mark_invalid();

        assert!(!request.is_registrable());
        assert_eq!(request.signature_state, SignatureState::Invalid);
        assert_eq!(request.remaining_secs(1100), 200);
    }

    #[test]
    fn test_outcome_shape() {
        let request = ValidationRequest::new("addr1", 1000, 300, "starRegistry");
        let json = serde_json::to_value(request.outcome(1010)).unwrap();
        assert_eq!(json["register_record"], false);
        assert_eq!(json["status"]["validation_window"], 290);
        assert_eq!(json["status"]["signature_state"], "pending");
    }

    #[test]
    fn test_storage_roundtrip() {
        let mut request = ValidationRequest::new("addr1", 1000, 300, "starRegistry");
        request.mark_invalid();
        let decoded = ValidationRequest::from_bytes(&request.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, request);
    }
}
