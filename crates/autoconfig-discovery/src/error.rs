//! Discovery pass errors. All of these fail the scan: no artifact is
//! produced once any of them is raised, which is what keeps bad
//! configuration a build-time problem instead of a runtime one.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use autoconfig_common::{ArtifactError, CoerceError};

/// Location of one marker in the scanned sources, used to make every
/// failure name the offending declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSite {
    /// File the marked const lives in.
    pub file: PathBuf,
    /// 1-based line of the marker attribute.
    pub line: usize,
    /// Name of the marked const.
    pub const_name: String,
}

impl fmt::Display for MarkerSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} (const {})",
            self.file.display(),
            self.line,
            self.const_name
        )
    }
}

/// Errors raised by the discovery pass.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A marker's default value does not parse under its declared type.
    #[error("unparseable default for key {key:?} at {site}: {source}")]
    UnparseableDefault {
        /// Resolved configuration key.
        key: String,
        /// Declaration that carried the bad default.
        site: MarkerSite,
        /// Underlying coercion failure.
        #[source]
        source: CoerceError,
    },

    /// The same key was declared twice with a different type or default.
    #[error("conflicting declarations for key {key:?}: first at {first}, second at {second}")]
    DuplicateKeyConflict {
        /// The contested key.
        key: String,
        /// Declaration seen first.
        first: MarkerSite,
        /// Conflicting declaration seen later.
        second: MarkerSite,
    },

    /// The general marker named a type outside the supported set.
    #[error("unsupported type {tag:?} at {site} (expected one of: int, long, float, double, bool, string)")]
    UnsupportedType {
        /// The unrecognized tag text.
        tag: String,
        /// Declaration that named it.
        site: MarkerSite,
    },

    /// A marker's argument list is malformed.
    #[error("invalid marker at {site}: {message}")]
    InvalidMarker {
        /// Declaration carrying the malformed marker.
        site: MarkerSite,
        /// What is wrong with it.
        message: String,
    },

    /// No key could be resolved: the marker has no `key` argument and the
    /// const's initializer is not a plain non-empty string literal.
    #[error("cannot derive a key at {site}: no key argument and the const is not a non-empty string literal")]
    MissingKey {
        /// The offending declaration.
        site: MarkerSite,
    },

    /// A source file could not be parsed as Rust.
    #[error("failed to parse {}: {source}", file.display())]
    ParseFile {
        /// The unparseable file.
        file: PathBuf,
        /// Parser diagnostics.
        source: syn::Error,
    },

    /// A source root or file could not be read.
    #[error("I/O error while scanning: {0}")]
    Io(#[from] std::io::Error),

    /// The merged entries failed artifact validation.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}
