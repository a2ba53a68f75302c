// Canonical dynamic value

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_yaml::Value as Yaml;

use crate::error::{CodecError, ValueError};
use crate::normalize::{normalize, render_key};

/// JSON-compatible dynamic value: null, bool, number, string, list, or a
/// string-keyed struct.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Struct(BTreeMap<String, Value>),
}

impl Value {
    /// Canonical constructor from a normalized YAML tree.
    ///
    /// Fails on mapping keys that are not strings; run the tree through
    /// `normalize` first, or use `from_yaml_tree`. YAML tags are dropped.
    pub fn new(tree: Yaml) -> Result<Value, ValueError> {
        Ok(match tree {
            Yaml::Null => Value::Null,
            Yaml::Bool(b) => Value::Bool(b),
            Yaml::Number(n) => Value::Number(
                n.as_f64()
                    .ok_or_else(|| ValueError::Number(n.to_string()))?,
            ),
            Yaml::String(s) => Value::String(s),
            Yaml::Sequence(items) => {
                Value::List(items.into_iter().map(Value::new).collect::<Result<_, _>>()?)
            }
            Yaml::Mapping(mapping) => {
                let mut fields = BTreeMap::new();
                for (key, value) in mapping {
                    let key = match key {
                        Yaml::String(key) => key,
                        other => return Err(ValueError::NonStringKey(render_key(other))),
                    };
                    fields.insert(key, Value::new(value)?);
                }
                Value::Struct(fields)
            }
            Yaml::Tagged(tagged) => Value::new(tagged.value)?,
        })
    }

    /// Normalize a permissively decoded tree, then construct.
    pub fn from_yaml_tree(tree: Yaml) -> Result<Value, ValueError> {
        Value::new(normalize(tree))
    }

    pub fn from_yaml_str(source: &str) -> Result<Value, CodecError> {
        let tree: Yaml = serde_yaml::from_str(source)?;
        Ok(Value::from_yaml_tree(tree)?)
    }

    pub fn to_yaml_string(&self) -> Result<String, CodecError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Generic projection used when encoding to YAML.
    pub fn as_yaml(&self) -> Yaml {
        match self {
            Value::Null => Yaml::Null,
            Value::Bool(b) => Yaml::Bool(*b),
            Value::Number(n) => Yaml::Number((*n).into()),
            Value::String(s) => Yaml::String(s.clone()),
            Value::List(items) => Yaml::Sequence(items.iter().map(Value::as_yaml).collect()),
            Value::Struct(fields) => Yaml::Mapping(
                fields
                    .iter()
                    .map(|(k, v)| (Yaml::String(k.clone()), v.as_yaml()))
                    .collect(),
            ),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Struct(_) => "struct",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Struct(fields) => fields.get(key),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::Value::from(self.clone());
        write!(f, "{}", json)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Struct(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// Decoding always goes through the normalizer, whatever the source format.
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tree = Yaml::deserialize(deserializer)?;
        Value::from_yaml_tree(tree).map_err(serde::de::Error::custom)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Struct(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Non-finite numbers have no JSON representation and become `null`.
impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) => serde_json::Number::from_f64(n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Struct(fields) => serde_json::Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}
