//! Cross-format codecs for schema message scalars.
//!
//! `Timestamp` and `Duration` convert to and from structured text (serde),
//! BSON, relational driver values and YAML while keeping the timestamp's
//! zone identity where the format allows it. `Value` is the canonical
//! dynamic value, reached from YAML through the key normalizer.

pub mod annotations;
pub mod bson_codec;
pub mod duration;
pub mod error;
pub mod normalize;
pub mod sql;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod timestamp;
pub mod value;
pub mod zone;

pub use bson_codec::BsonCodec;
pub use duration::Duration;
pub use error::{CodecError, Result, ValidationError};
pub use normalize::normalize;
pub use sql::{DriverValue, Scanner, Valuer};
pub use timestamp::Timestamp;
pub use value::Value;
pub use zone::{default_zone, install_default_zone, Zone};
