// Normalizer for permissively decoded YAML trees
//
// YAML allows any node as a mapping key. The canonical dynamic value model
// only has string keys, so every non-string key is rendered to a string
// before the tree reaches `Value::new`.
//
// Key collisions after rendering (`42` and `"42"` in the same mapping) are
// resolved in traversal order: the last value wins and the entry keeps the
// position of the first occurrence.

use std::mem;

use serde_yaml::{Mapping, Value as Yaml};

/// Normalize a decoded tree so that every mapping is keyed by strings.
///
/// Idempotent, and the identity on trees that are already normalized.
pub fn normalize(mut tree: Yaml) -> Yaml {
    normalize_in_place(&mut tree);
    tree
}

pub fn normalize_in_place(tree: &mut Yaml) {
    match tree {
        Yaml::Mapping(mapping) if mapping.keys().all(Yaml::is_string) => {
            for value in mapping.values_mut() {
                normalize_in_place(value);
            }
        }
        Yaml::Mapping(mapping) => {
            let entries = mem::take(mapping);
            let mut rekeyed = Mapping::with_capacity(entries.len());
            for (key, value) in entries {
                rekeyed.insert(Yaml::String(render_key(key)), normalize(value));
            }
            *mapping = rekeyed;
        }
        Yaml::Sequence(items) => {
            for item in items.iter_mut() {
                normalize_in_place(item);
            }
        }
        Yaml::Tagged(tagged) => normalize_in_place(&mut tagged.value),
        Yaml::Null | Yaml::Bool(_) | Yaml::Number(_) | Yaml::String(_) => {}
    }
}

/// Default string rendering of a mapping key.
pub fn render_key(key: Yaml) -> String {
    match key {
        Yaml::String(s) => s,
        Yaml::Null => "null".to_string(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        Yaml::Tagged(tagged) => render_key(tagged.value),
        composite => {
            let composite = normalize(composite);
            serde_json::to_string(&composite).unwrap_or_else(|_| format!("{:?}", composite))
        }
    }
}
