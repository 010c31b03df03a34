//! The type coercion engine.
//!
//! Both phases go through these two functions: the discovery pass validates
//! marker defaults with [`coerce`], and the registry uses it again for
//! artifact defaults and override values. [`render`] is the inverse, the
//! canonical textual encoding written into artifacts.

use crate::error::CoerceError;
use crate::types::{ConfigValue, TypeTag};

/// Parses `text` as a value of the type named by `tag`.
///
/// Boolean accepts exactly `"true"` and `"false"`; anything else (including
/// `"TRUE"`, `"1"`, `"yes"`) is an error rather than a default-to-false.
/// Numeric parses use the standard `FromStr` grammar for each width.
///
/// # Errors
///
/// Returns [`CoerceError::InvalidValue`] when `text` does not parse under
/// `tag`.
pub fn coerce(tag: TypeTag, text: &str) -> Result<ConfigValue, CoerceError> {
    let invalid = || CoerceError::InvalidValue {
        tag,
        text: text.to_string(),
    };

    match tag {
        TypeTag::Int => text.parse::<i32>().map(ConfigValue::Int).map_err(|_| invalid()),
        TypeTag::Long => text
            .parse::<i64>()
            .map(ConfigValue::Long)
            .map_err(|_| invalid()),
        TypeTag::Float => text
            .parse::<f32>()
            .map(ConfigValue::Float)
            .map_err(|_| invalid()),
        TypeTag::Double => text
            .parse::<f64>()
            .map(ConfigValue::Double)
            .map_err(|_| invalid()),
        TypeTag::Bool => match text {
            "true" => Ok(ConfigValue::Bool(true)),
            "false" => Ok(ConfigValue::Bool(false)),
            _ => Err(invalid()),
        },
        TypeTag::String => Ok(ConfigValue::String(text.to_string())),
    }
}

/// Canonical textual encoding of a value, suitable as input to [`coerce`]
/// under the value's own tag.
#[must_use]
pub fn render(value: &ConfigValue) -> String {
    value.to_string()
}
