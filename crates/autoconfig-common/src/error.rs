//! Error types shared across the discovery pass and the runtime registry.

use thiserror::Error;

use crate::types::TypeTag;

/// Failure to convert between the textual and typed representation of a value.
///
/// Coercion is total: every `(tag, text)` pair either produces a value of that
/// exact type or one of these errors. There is no silent truncation and no
/// cross-type fallback.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoerceError {
    /// The text does not parse under the declared type.
    #[error("value {text:?} is not a valid {tag}")]
    InvalidValue {
        /// Declared type the text was parsed against.
        tag: TypeTag,
        /// The offending textual value.
        text: String,
    },

    /// The type tag itself is not one of the supported set.
    #[error("unsupported type tag {tag:?} (expected one of: int, long, float, double, bool, string)")]
    UnsupportedType {
        /// The unrecognized tag text.
        tag: String,
    },
}

/// Failure to read or validate a registration artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The artifact file could not be read or written.
    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The artifact is not valid JSON for the expected schema.
    #[error("artifact parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The artifact declares a format version this build does not understand.
    #[error("unsupported artifact format version {found} (supported: {supported})")]
    UnsupportedVersion {
        /// Version found in the artifact.
        found: u32,
        /// Version this build supports.
        supported: u32,
    },

    /// Two entries in the artifact share a key.
    #[error("artifact contains duplicate key {key:?}")]
    DuplicateKey {
        /// The duplicated key.
        key: String,
    },

    /// Entries are not in lexicographic key order.
    #[error("artifact entries are not sorted: {key:?} appears after {previous:?}")]
    Unordered {
        /// Key that is out of place.
        key: String,
        /// Key it should have preceded.
        previous: String,
    },

    /// An entry carries an empty key.
    #[error("artifact contains an entry with an empty key")]
    EmptyKey,

    /// An entry's default does not coerce under its declared type.
    #[error("default for key {key:?} is invalid: {source}")]
    InvalidDefault {
        /// Key of the offending entry.
        key: String,
        /// Underlying coercion failure.
        #[source]
        source: CoerceError,
    },
}
