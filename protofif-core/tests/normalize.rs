// Property-based tests for the YAML key normalizer

mod common;

use common::*;
use proptest::prelude::*;
use protofif_core::normalize::normalize;
use protofif_core::Value;
use serde_yaml::Value as Yaml;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Test that every mapping key is a string after normalizing
    #[test]
    fn test_keys_are_strings(tree in arb_yaml_tree()) {
        prop_assert!(all_keys_are_strings(&normalize(tree)));
    }

    /// Test that normalizing twice changes nothing
    #[test]
    fn test_idempotent(tree in arb_yaml_tree()) {
        let once = normalize(tree);
        prop_assert_eq!(normalize(once.clone()), once);
    }

    /// Test that the canonical constructor accepts every normalized tree
    #[test]
    fn test_constructor_accepts_normalized(tree in arb_yaml_tree()) {
        prop_assert!(Value::new(normalize(tree.clone())).is_ok());
        prop_assert!(Value::from_yaml_tree(tree).is_ok());
    }

    /// Test that a tree projected from a value is already normalized
    #[test]
    fn test_identity_on_string_keyed_trees(tree in arb_yaml_tree()) {
        let value = Value::from_yaml_tree(tree)?;
        let projected = value.as_yaml();
        prop_assert_eq!(normalize(projected.clone()), projected);
    }

    /// Test that mappings never grow and sequences keep their length
    #[test]
    fn test_shape_is_preserved(tree in arb_yaml_tree()) {
        let normalized = normalize(tree.clone());
        prop_assert!(same_shape(&tree, &normalized));
    }
}

fn same_shape(before: &Yaml, after: &Yaml) -> bool {
    match (before, after) {
        (Yaml::Mapping(b), Yaml::Mapping(a)) => a.len() <= b.len(),
        (Yaml::Sequence(b), Yaml::Sequence(a)) => {
            b.len() == a.len() && b.iter().zip(a).all(|(b, a)| same_shape(b, a))
        }
        (Yaml::Tagged(b), Yaml::Tagged(a)) => b.tag == a.tag && same_shape(&b.value, &a.value),
        (b, a) => b == a,
    }
}

#[test]
fn test_integer_key_example() {
    let tree: Yaml = serde_yaml::from_str("{42: x}").unwrap();
    assert!(Value::new(tree.clone()).is_err());

    let normalized = normalize(tree);
    let expected: Yaml = serde_yaml::from_str("{'42': x}").unwrap();
    assert_eq!(normalized, expected);
    assert_eq!(
        Value::new(normalized).unwrap().get("42"),
        Some(&Value::String("x".to_string()))
    );
}

#[test]
fn test_document_with_mixed_keys() {
    let source = "\
service: api
ports:
  80: http
  443: https
flags:
  true: enabled
  ~: unset
? [region, zone]
: eu-west-1a
";
    let value = Value::from_yaml_str(source).unwrap();
    let ports = value.get("ports").unwrap();
    assert_eq!(ports.get("80"), Some(&Value::String("http".to_string())));
    assert_eq!(ports.get("443"), Some(&Value::String("https".to_string())));

    let flags = value.get("flags").unwrap();
    assert_eq!(flags.get("true"), Some(&Value::String("enabled".to_string())));
    assert_eq!(flags.get("null"), Some(&Value::String("unset".to_string())));

    assert_eq!(
        value.get(r#"["region","zone"]"#),
        Some(&Value::String("eu-west-1a".to_string()))
    );
}
