//! Runtime registry errors.
//!
//! Every operation returns a result the caller must handle; the registry
//! never substitutes a silent fallback value. Messages always name the key
//! and, for type failures, the expected versus attempted type.

use thiserror::Error;

use autoconfig_common::{ArtifactError, CoerceError, TypeTag};

/// Errors returned by [`crate::ConfigRegistry`] operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry was used before a successful `load`.
    #[error("registry is not initialized: call load() before any other operation")]
    Uninitialized,

    /// `load` was called a second time.
    #[error("registry is already loaded: load() may only be called once")]
    AlreadyLoaded,

    /// The key was never registered by any marker.
    #[error("unknown configuration key {key:?}")]
    UnknownKey {
        /// The missing key.
        key: String,
    },

    /// The caller requested a type other than the key's declared type.
    #[error("type mismatch for key {key:?}: declared {declared}, requested {requested}")]
    TypeMismatch {
        /// The looked-up key.
        key: String,
        /// Type the key was registered with.
        declared: TypeTag,
        /// Type the caller asked for.
        requested: TypeTag,
    },

    /// An override value does not coerce to the key's declared type. The
    /// stored value is left unchanged.
    #[error("invalid value for key {key:?} (declared {declared}): {source}")]
    InvalidValue {
        /// The overridden key.
        key: String,
        /// Type the key was registered with.
        declared: TypeTag,
        /// Underlying coercion failure.
        #[source]
        source: CoerceError,
    },

    /// The entry has neither a default nor an applied override.
    #[error("no value for key {key:?}: no default was registered and no override was applied")]
    MissingValue {
        /// The valueless key.
        key: String,
    },

    /// The artifact failed the defensive load-time validation.
    #[error("corrupt registration artifact: {0}")]
    Artifact(#[from] ArtifactError),

    /// An override source could not be read.
    #[error("override source I/O error: {0}")]
    Io(#[from] std::io::Error),
}
