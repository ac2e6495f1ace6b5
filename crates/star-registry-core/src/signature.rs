//! Signature verification: proof that a requester controls an identity.

use crate::crypto::{PublicKey, Signature};

/// Checks that `signature` over `message` was produced by the holder of `identity`.
///
/// Implementations fail closed: malformed identities or signatures yield
/// `false`, never a panic or an error the caller has to propagate.
pub trait SignatureVerifier: Send + Sync {
    /// Returns whether the signature proves control of the identity.
    fn verify(&self, message: &str, identity: &str, signature: &str) -> bool;
}

/// Ed25519 verification over hex-encoded identities and signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, message: &str, identity: &str, signature: &str) -> bool {
        let Ok(public_key) = PublicKey::from_hex(identity.trim()) else {
            return false;
        };
        let Ok(signature) = Signature::from_hex(signature.trim()) else {
            return false;
        };
        public_key.verify(message.as_bytes(), &signature).is_ok()
    }
}

impl<F> SignatureVerifier for F
where
    F: Fn(&str, &str, &str) -> bool + Send + Sync,
{
    fn verify(&self, message: &str, identity: &str, signature: &str) -> bool {
        self(message, identity, signature)
    }
}
