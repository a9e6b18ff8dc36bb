use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The caller-facing stable identifier of an entity, e.g. `Q42` or `P31`.
///
/// Opaque to the store: no numeric structure is assumed beyond what is
/// needed to validate that it was supplied at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// The internal, never-reused, time-ordered 64-bit key allocated once per
/// registered entity.
///
/// Built from a UUIDv7's 48-bit `unix_ts_ms` field (its most-significant
/// bytes) shifted into the high bits, with the low bits filled from
/// `rand_a` to break ties between IDs minted in the same millisecond. This
/// gives the approximately-sortable property the ID Registry requires
/// without pulling in a dedicated ULID crate.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct InternalId(i64);

impl InternalId {
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// Allocates a fresh, time-ordered internal ID.
    #[must_use]
    pub fn generate() -> Self {
        let uuid = Uuid::now_v7();
        let bytes = uuid.as_bytes();

        // `unix_ts_ms`: the UUIDv7's leading 48 bits (RFC 9562 §5.7).
        let unix_ts_ms = u64::from(bytes[0]) << 40
            | u64::from(bytes[1]) << 32
            | u64::from(bytes[2]) << 24
            | u64::from(bytes[3]) << 16
            | u64::from(bytes[4]) << 8
            | u64::from(bytes[5]);

        // `rand_a` (12 bits, skipping the 4 version bits in byte 6's top
        // nibble) breaks ties between IDs minted within the same
        // millisecond.
        let rand_a = u64::from(bytes[6] & 0x0F) << 8 | u64::from(bytes[7]);

        // Clear the sign bit so the value sorts as a positive `bigint` in
        // the metadata index without needing an unsigned column type.
        let raw = ((unix_ts_ms << 16) | rand_a) as i64 & i64::MAX;
        Self(raw)
    }
}

impl fmt::Display for InternalId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_positive() {
        for _ in 0..100 {
            assert!(InternalId::generate().as_i64() >= 0);
        }
    }

    #[test]
    fn generated_ids_track_wall_clock_order() {
        let mut previous = InternalId::generate();
        for _ in 0..100 {
            let next = InternalId::generate();
            assert!(next >= previous, "{next:?} should not sort before {previous:?}");
            previous = next;
        }
    }

    #[test]
    fn high_bits_carry_the_millisecond_timestamp() {
        let before_ms = u64::try_from(
            std::time::SystemTime::now()
                .duration_since(std::time::SystemTime::UNIX_EPOCH)
                .unwrap()
                .as_millis(),
        )
        .unwrap();

        let id = InternalId::generate();
        let recovered_ms = (id.as_i64() as u64) >> 16;

        assert!(recovered_ms >= before_ms, "internal ID should encode the current timestamp in its high bits");
    }
}
