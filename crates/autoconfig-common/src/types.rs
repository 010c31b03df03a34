//! Type tags and typed configuration values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoerceError;

/// The closed set of scalar types a configuration entry may declare.
///
/// Serialized in lowercase so artifact files stay stable and diffable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit floating point.
    Float,
    /// 64-bit floating point.
    Double,
    /// Boolean, textual form is exactly `true` or `false`.
    Bool,
    /// UTF-8 string.
    String,
}

impl TypeTag {
    /// Canonical lowercase name of this tag, as it appears in markers and
    /// artifact files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::String => "string",
        }
    }

    /// All supported tags, used for error messages listing the valid set.
    pub const ALL: [Self; 6] = [
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::Bool,
        Self::String,
    ];
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypeTag {
    type Err = CoerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(Self::Int),
            "long" => Ok(Self::Long),
            "float" => Ok(Self::Float),
            "double" => Ok(Self::Double),
            "bool" => Ok(Self::Bool),
            "string" => Ok(Self::String),
            other => Err(CoerceError::UnsupportedType {
                tag: other.to_string(),
            }),
        }
    }
}

/// A typed configuration value held by the runtime registry.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// 32-bit signed integer value.
    Int(i32),
    /// 64-bit signed integer value.
    Long(i64),
    /// 32-bit floating point value.
    Float(f32),
    /// 64-bit floating point value.
    Double(f64),
    /// Boolean value.
    Bool(bool),
    /// String value.
    String(String),
}

impl ConfigValue {
    /// The tag describing this value's type.
    #[must_use]
    pub const fn type_tag(&self) -> TypeTag {
        match self {
            Self::Int(_) => TypeTag::Int,
            Self::Long(_) => TypeTag::Long,
            Self::Float(_) => TypeTag::Float,
            Self::Double(_) => TypeTag::Double,
            Self::Bool(_) => TypeTag::Bool,
            Self::String(_) => TypeTag::String,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
        }
    }
}

/// Extraction of a native Rust value from a [`ConfigValue`].
///
/// Implemented for exactly the six scalar types the registry supports. The
/// extraction is strict: requesting an `i64` from an `Int` entry fails rather
/// than widening, so call sites always agree with the declared marker type.
pub trait FromConfigValue: Sized {
    /// The tag callers of this implementation are requesting.
    const TAG: TypeTag;

    /// Extracts the native value, or `None` when the variant does not match.
    fn from_config_value(value: &ConfigValue) -> Option<Self>;
}

impl FromConfigValue for i32 {
    const TAG: TypeTag = TypeTag::Int;

    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromConfigValue for i64 {
    const TAG: TypeTag = TypeTag::Long;

    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Long(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromConfigValue for f32 {
    const TAG: TypeTag = TypeTag::Float;

    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromConfigValue for f64 {
    const TAG: TypeTag = TypeTag::Double;

    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Double(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromConfigValue for bool {
    const TAG: TypeTag = TypeTag::Bool;

    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromConfigValue for String {
    const TAG: TypeTag = TypeTag::String;

    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::String(v) => Some(v.clone()),
            _ => None,
        }
    }
}
