// Test utilities and generators for protofif property-based testing

#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, Utc};
use proptest::prelude::*;
use protofif_core::{Duration, Timestamp, Zone};
use serde_yaml::{Mapping, Value as Yaml};

/// 0001-01-01T00:00:00Z
pub const MIN_SECONDS: i64 = -62_135_596_800;
/// 9999-12-31T23:59:59Z
pub const MAX_SECONDS: i64 = 253_402_300_799;

/// Generate instants across the four-digit-year range
pub fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    (MIN_SECONDS..=MAX_SECONDS, 0u32..1_000_000_000).prop_map(|(seconds, nanos)| {
        DateTime::from_timestamp(seconds, nanos).expect("generated instant in range")
    })
}

/// Generate instants on a whole millisecond, the precision BSON keeps
pub fn arb_millis_instant() -> impl Strategy<Value = DateTime<Utc>> {
    (MIN_SECONDS..=MAX_SECONDS, 0u32..1_000).prop_map(|(seconds, millis)| {
        DateTime::from_timestamp(seconds, millis * 1_000_000).expect("generated instant in range")
    })
}

/// Generate offsets between -14:00 and +14:00 on whole minutes
pub fn arb_fixed_offset() -> impl Strategy<Value = FixedOffset> {
    (-14 * 60..=14 * 60i32)
        .prop_map(|minutes| FixedOffset::east_opt(minutes * 60).expect("offset in range"))
}

/// Generate zones of every kind
pub fn arb_zone() -> impl Strategy<Value = Zone> {
    prop_oneof![
        Just(Zone::Utc),
        prop::sample::select(chrono_tz::TZ_VARIANTS.to_vec()).prop_map(Zone::Named),
        arb_fixed_offset().prop_map(Zone::Fixed),
    ]
}

pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
    (arb_instant(), arb_zone()).prop_map(|(instant, zone)| Timestamp::from_instant(&instant, zone))
}

/// Timestamps with arbitrary seconds and nanos, including values past
/// chrono's representable range
pub fn arb_raw_timestamp() -> impl Strategy<Value = Timestamp> {
    (any::<i64>(), any::<i32>(), arb_zone()).prop_map(|(seconds, nanos, zone)| Timestamp {
        seconds,
        nanos,
        location_name: zone.name(),
    })
}

pub fn arb_duration() -> impl Strategy<Value = Duration> {
    any::<i64>().prop_map(Duration::from_nanos)
}

/// Durations small enough not to push a generated timestamp past year 9999
pub fn arb_bounded_duration() -> impl Strategy<Value = Duration> {
    (-1_000_000_000_000_000_000i64..=1_000_000_000_000_000_000).prop_map(Duration::from_nanos)
}

/// Location names that no zone database knows
pub fn arb_unknown_location() -> impl Strategy<Value = String> {
    "Nowhere/[A-Z][a-z]{3,10}"
}

/// Generate YAML scalars, the leaves of a decoded tree
pub fn arb_yaml_scalar() -> impl Strategy<Value = Yaml> {
    prop_oneof![
        Just(Yaml::Null),
        any::<bool>().prop_map(Yaml::Bool),
        any::<i64>().prop_map(|n| Yaml::Number(n.into())),
        (-1.0e6f64..1.0e6).prop_map(|f| Yaml::Number(f.into())),
        "[a-z0-9 ]{0,8}".prop_map(Yaml::String),
    ]
}

/// Generate decoded YAML trees whose mapping keys may be any node
pub fn arb_yaml_tree() -> impl Strategy<Value = Yaml> {
    arb_yaml_scalar().prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Yaml::Sequence),
            prop::collection::vec((arb_yaml_key(), inner), 0..6)
                .prop_map(|entries| Yaml::Mapping(entries.into_iter().collect::<Mapping>())),
        ]
    })
}

/// Generate mapping keys, mostly scalars with the occasional composite
pub fn arb_yaml_key() -> impl Strategy<Value = Yaml> {
    prop_oneof![
        4 => arb_yaml_scalar(),
        1 => prop::collection::vec(arb_yaml_scalar(), 0..3).prop_map(Yaml::Sequence),
    ]
}

/// Check that every mapping in the tree is keyed by strings
pub fn all_keys_are_strings(tree: &Yaml) -> bool {
    match tree {
        Yaml::Mapping(mapping) => mapping
            .iter()
            .all(|(k, v)| k.is_string() && all_keys_are_strings(v)),
        Yaml::Sequence(items) => items.iter().all(all_keys_are_strings),
        Yaml::Tagged(tagged) => all_keys_are_strings(&tagged.value),
        _ => true,
    }
}
