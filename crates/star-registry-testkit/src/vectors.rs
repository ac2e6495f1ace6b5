//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the record hash encoding and the Ed25519 identity
//! scheme. Any implementation must reproduce them byte for byte.

use star_registry_core::{Record, RecordBuilder, StarPayload};

/// A golden ledger record. Each vector links to the one before it.
#[derive(Debug, Clone)]
pub struct GoldenRecord {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub owner: &'static str,
    pub ra: &'static str,
    pub dec: &'static str,
    pub mag: &'static str,
    pub cen: &'static str,
    /// Plain-text story, hex-encoded on sealing.
    pub story: &'static str,
    pub time: i64,
    /// Expected content hash (hex).
    pub expected_hash: &'static str,
}

impl GoldenRecord {
    pub fn payload(&self) -> StarPayload {
        StarPayload::new(self.ra, self.dec, self.story)
            .mag(self.mag)
            .cen(self.cen)
    }
}

/// Seed of the golden wallet.
pub const GOLDEN_SEED: [u8; 32] = [0x42; 32];

/// Identity derived from [`GOLDEN_SEED`].
pub const GOLDEN_IDENTITY: &str =
    "2152f8d19b791d24453242e15f2eab6cb7cffa7b6a5ed30097960e069881db12";

/// Time of the golden challenge.
pub const GOLDEN_CHALLENGE_TIME: i64 = 1_532_296_090;

/// Signature by the golden wallet over its challenge at
/// [`GOLDEN_CHALLENGE_TIME`] with the default suffix.
pub const GOLDEN_SIGNATURE: &str =
    "6a29dd719ddb3237460ead6c8beafeb06723d2e9458a5d0429f6d7e28f6bacd6\
     64c134ac2cc42fcd2e1ae20f130282176d535dff3491aa0efdf4ed9d50d2d00e";

/// Canonical bytes of a genesis record with every text field empty and time 0.
pub const EMPTY_RECORD_CANONICAL: &str = "a56668656967687400656f776e657261306473746172a5627261\
606364656360636d6167606363656e606573746f7279606474696d65006d70726576696f75735f6861736860";

/// Get the golden chain, genesis first.
pub fn golden_chain() -> Vec<GoldenRecord> {
    vec![
        GoldenRecord {
            name: "default genesis",
            owner: "0",
            ra: "9h 56m 1.0s",
            dec: "69 deg 29m 24.9s",
            mag: "",
            cen: "",
            story: "star-registry genesis record: Found with www.google.com/sky (Fireball Galaxy)",
            time: 1_532_296_090,
            expected_hash: "4e66477af697cc908d5397ac9125e7cb5116251da1fa8a89a98c49556ed0146a",
        },
        GoldenRecord {
            name: "minimal star",
            owner: "addr1",
            ra: "1h",
            dec: "2deg",
            mag: "",
            cen: "",
            story: "hi",
            time: 1_532_296_234,
            expected_hash: "69360df4811f56537de1dc9f57f8106674f6e962cfca6de864877dde9db44918",
        },
        GoldenRecord {
            name: "full star",
            owner: "addr2",
            ra: "16h 29m 1.0s",
            dec: "-26 deg 29m 24.9s",
            mag: "4.83",
            cen: "230",
            story: "Found star using https://www.google.com/sky/",
            time: 1_532_296_300,
            expected_hash: "714830c29d7049cbabdae3800255300d3af702988fb3f4773c1458384d1c89da",
        },
    ]
}

/// Seal the golden chain in order.
pub fn build_golden_chain() -> Vec<Record> {
    let mut chain: Vec<Record> = Vec::new();
    for vector in golden_chain() {
        let mut builder = RecordBuilder::new(vector.owner, vector.payload()).time(vector.time);
        if let Some(prev) = chain.last() {
            builder = builder.after(prev);
        }
        chain.push(builder.seal());
    }
    chain
}

/// Compare each sealed record against its expected hash.
///
/// Returns `(name, matches, actual_hash)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    golden_chain()
        .iter()
        .zip(build_golden_chain())
        .map(|(vector, record)| {
            let matches = record.hash == vector.expected_hash;
            (vector.name.to_string(), matches, record.hash)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use star_registry::{Config, GenesisConfig};
    use star_registry_core::{
        canonical_record_bytes, Ed25519Verifier, Keypair, SignatureVerifier, ValidationRequest,
    };

    #[test]
    fn test_golden_hashes() {
        for (name, matches, actual) in verify_all_vectors() {
            assert!(matches, "vector '{}' hashed to {}", name, actual);
        }
    }

    #[test]
    fn test_golden_chain_links() {
        let chain = build_golden_chain();
        assert!(chain[0].is_genesis());
        assert!(chain[1].links_to(&chain[0]));
        assert!(chain[2].links_to(&chain[1]));
    }

    #[test]
    fn test_genesis_vector_matches_default_config() {
        let genesis = GenesisConfig::default();
        let vector = &golden_chain()[0];
        assert_eq!(genesis.owner, vector.owner);
        assert_eq!(genesis.star, vector.payload());
    }

    #[test]
    fn test_empty_record_canonical_bytes() {
        let record = RecordBuilder::new("0", StarPayload::new("", "", "")).seal();
        assert_eq!(
            hex::encode(canonical_record_bytes(&record)),
            EMPTY_RECORD_CANONICAL
        );
    }

    #[test]
    fn test_golden_identity_and_signature() {
        let keypair = Keypair::from_seed(&GOLDEN_SEED);
        assert_eq!(keypair.identity(), GOLDEN_IDENTITY);

        let message = ValidationRequest::challenge_message(
            GOLDEN_IDENTITY,
            GOLDEN_CHALLENGE_TIME,
            &Config::default().registry.challenge_suffix,
        );
        assert_eq!(keypair.sign(message.as_bytes()).to_hex(), GOLDEN_SIGNATURE);
        assert!(Ed25519Verifier.verify(&message, GOLDEN_IDENTITY, GOLDEN_SIGNATURE));
    }
}
