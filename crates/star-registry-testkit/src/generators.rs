//! Proptest generators for property-based testing.

use proptest::prelude::*;

use star_registry_core::{Keypair, Record, RecordBuilder, StarPayload};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a well-formed identity.
pub fn identity() -> impl Strategy<Value = String> {
    keypair().prop_map(|kp| kp.identity())
}

/// Generate a right ascension such as `16h 29m 1.0s`.
pub fn right_ascension() -> impl Strategy<Value = String> {
    (0u8..24, 0u8..60, 0u8..60, 0u8..10)
        .prop_map(|(h, m, s, frac)| format!("{}h {}m {}.{}s", h, m, s, frac))
}

/// Generate a declination such as `-26 deg 29m 24.9s`.
pub fn declination() -> impl Strategy<Value = String> {
    (-90i8..=90, 0u8..60, 0u8..60, 0u8..10)
        .prop_map(|(d, m, s, frac)| format!("{} deg {}m {}.{}s", d, m, s, frac))
}

/// Generate a story, including control characters and non-ASCII text.
pub fn story() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ -~]{0,120}",
        "\\PC{0,60}",
        Just("line one\nline \"two\"\t{}".to_string()),
    ]
}

/// Generate a star payload, with optional magnitude and centroid.
pub fn star_payload() -> impl Strategy<Value = StarPayload> {
    (
        right_ascension(),
        declination(),
        proptest::option::of("[0-9]{1,2}\\.[0-9]{1,2}"),
        proptest::option::of("[0-9]{1,4}"),
        story(),
    )
        .prop_map(|(ra, dec, mag, cen, story)| {
            let mut payload = StarPayload::new(ra, dec, story);
            if let Some(mag) = mag {
                payload = payload.mag(mag);
            }
            if let Some(cen) = cen {
                payload = payload.cen(cen);
            }
            payload
        })
}

/// Generate a reasonable timestamp in seconds.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=4_102_444_800 // 2100-01-01
}

/// Seal a chain of records: a genesis followed by one record per entry.
pub fn chain_from(entries: &[(String, StarPayload)], start_time: i64) -> Vec<Record> {
    let mut chain = vec![RecordBuilder::new("0", StarPayload::new("", "", ""))
        .time(start_time)
        .seal()];
    for (i, (owner, payload)) in entries.iter().enumerate() {
        let prev = &chain[chain.len() - 1];
        let record = RecordBuilder::new(owner.clone(), payload)
            .after(prev)
            .time(start_time + i as i64 + 1)
            .seal();
        chain.push(record);
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use star_registry_core::{canonical_record_bytes, Star};

    proptest! {
        #[test]
        fn test_hash_is_deterministic(
            owner in identity(),
            payload in star_payload(),
            time in timestamp(),
        ) {
            let r1 = RecordBuilder::new(owner.clone(), &payload).time(time).seal();
            let r2 = RecordBuilder::new(owner, &payload).time(time).seal();

            prop_assert_eq!(canonical_record_bytes(&r1), canonical_record_bytes(&r2));
            prop_assert_eq!(r1.hash, r2.hash);
        }

        #[test]
        fn test_story_survives_hex(payload in star_payload()) {
            let star = Star::from(&payload);
            prop_assert_eq!(star.decoded_story(), Some(payload.story.clone()));
            prop_assert!(star.story.chars().all(|c| c.is_ascii_hexdigit()));
        }

        #[test]
        fn test_different_payload_different_hash(
            owner in identity(),
            p1 in star_payload(),
            p2 in star_payload(),
        ) {
            prop_assume!(p1 != p2);

            let r1 = RecordBuilder::new(owner.clone(), &p1).time(1000).seal();
            let r2 = RecordBuilder::new(owner, &p2).time(1000).seal();

            prop_assert_ne!(r1.hash, r2.hash);
        }

        #[test]
        fn test_sealed_chain_links(
            entries in prop::collection::vec((identity(), star_payload()), 1..8),
        ) {
            let chain = chain_from(&entries, 1_532_296_090);
            for pair in chain.windows(2) {
                prop_assert!(pair[1].links_to(&pair[0]));
                prop_assert!(pair[1].verify_hash());
            }
        }
    }
}
