//! The registration artifact: the sole coupling surface between the
//! build-time discovery pass and the runtime registry.
//!
//! The artifact is a versioned JSON document holding the resolved
//! `(key, type, default)` triples, sorted lexicographically by key. Repeated
//! scans of unchanged sources serialize to byte-identical output, so the file
//! can be committed and diffed to review configuration-surface changes.

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use crate::coerce::coerce;
use crate::error::ArtifactError;
use crate::types::TypeTag;

/// The artifact format version this build reads and writes.
pub const FORMAT_VERSION: u32 = 1;

/// One resolved configuration registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationEntry {
    /// Logical configuration key, non-empty and unique within the artifact.
    pub key: String,
    /// Declared value type.
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
    /// Default value in textual form, absent when the marker declared none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// The full, ordered registration surface produced by one discovery pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationArtifact {
    /// Schema version, see [`FORMAT_VERSION`].
    pub version: u32,
    /// Entries sorted lexicographically by key.
    pub entries: Vec<RegistrationEntry>,
}

impl RegistrationArtifact {
    /// Builds an artifact from entries, sorting them into canonical order.
    #[must_use]
    pub fn new(mut entries: Vec<RegistrationEntry>) -> Self {
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Self {
            version: FORMAT_VERSION,
            entries,
        }
    }

    /// Validates the structural invariants: supported version, non-empty
    /// unique keys, and defaults that coerce under their declared types.
    ///
    /// The discovery pass guarantees all of this at build time; the registry
    /// runs it again as a defensive check against hand-edited files.
    ///
    /// # Errors
    ///
    /// Returns the first [`ArtifactError`] found.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.version != FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: self.version,
                supported: FORMAT_VERSION,
            });
        }

        // Sorted order is part of the schema; it also makes the adjacent
        // duplicate check below complete.
        for pair in self.entries.windows(2) {
            if pair[0].key == pair[1].key {
                return Err(ArtifactError::DuplicateKey {
                    key: pair[0].key.clone(),
                });
            }
            if pair[0].key > pair[1].key {
                return Err(ArtifactError::Unordered {
                    key: pair[1].key.clone(),
                    previous: pair[0].key.clone(),
                });
            }
        }

        for entry in &self.entries {
            if entry.key.is_empty() {
                return Err(ArtifactError::EmptyKey);
            }
            if let Some(default) = &entry.default {
                coerce(entry.type_tag, default).map_err(|source| {
                    ArtifactError::InvalidDefault {
                        key: entry.key.clone(),
                        source,
                    }
                })?;
            }
        }

        Ok(())
    }

    /// Serializes to the canonical byte form: pretty-printed JSON plus a
    /// trailing newline. Unchanged sources always produce identical bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Parse`] if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Deserializes and validates an artifact from a reader.
    ///
    /// # Errors
    ///
    /// Returns an [`ArtifactError`] on read, parse, or validation failure.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ArtifactError> {
        let artifact: Self = serde_json::from_reader(reader)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Reads and validates an artifact file from disk.
    ///
    /// # Errors
    ///
    /// Returns an [`ArtifactError`] on read, parse, or validation failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, tag: TypeTag, default: Option<&str>) -> RegistrationEntry {
        RegistrationEntry {
            key: key.to_string(),
            type_tag: tag,
            default: default.map(str::to_string),
        }
    }

    #[test]
    fn new_sorts_entries_by_key() {
        let artifact = RegistrationArtifact::new(vec![
            entry("zeta", TypeTag::Int, Some("1")),
            entry("alpha", TypeTag::Bool, None),
        ]);
        assert_eq!(artifact.entries[0].key, "alpha");
        assert_eq!(artifact.entries[1].key, "zeta");
        assert!(artifact.validate().is_ok());
    }

    #[test]
    fn serialization_is_byte_stable() {
        let build = || {
            RegistrationArtifact::new(vec![
                entry("b.key", TypeTag::String, Some("hello")),
                entry("a.key", TypeTag::Int, Some("6")),
            ])
        };
        assert_eq!(build().to_bytes().unwrap(), build().to_bytes().unwrap());
    }

    #[test]
    fn round_trips_through_json() {
        let artifact = RegistrationArtifact::new(vec![
            entry("k.int", TypeTag::Int, Some("6")),
            entry("k.none", TypeTag::Double, None),
        ]);
        let bytes = artifact.to_bytes().unwrap();
        let parsed = RegistrationArtifact::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(parsed, artifact);
    }

    #[test]
    fn absent_default_is_omitted_from_json() {
        let artifact = RegistrationArtifact::new(vec![entry("k", TypeTag::Int, None)]);
        let text = String::from_utf8(artifact.to_bytes().unwrap()).unwrap();
        assert!(!text.contains("default"));
    }

    #[test]
    fn validate_rejects_duplicate_keys() {
        let artifact = RegistrationArtifact::new(vec![
            entry("same", TypeTag::Int, Some("1")),
            entry("same", TypeTag::Int, Some("2")),
        ]);
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::DuplicateKey { key }) if key == "same"
        ));
    }

    #[test]
    fn validate_rejects_unsorted_entries() {
        let mut artifact = RegistrationArtifact::new(vec![
            entry("a", TypeTag::Int, None),
            entry("b", TypeTag::Int, None),
        ]);
        artifact.entries.swap(0, 1);
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::Unordered { .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_version() {
        let mut artifact = RegistrationArtifact::new(vec![]);
        artifact.version = 99;
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn validate_rejects_empty_key_and_bad_default() {
        let artifact = RegistrationArtifact::new(vec![entry("", TypeTag::Int, None)]);
        assert!(matches!(artifact.validate(), Err(ArtifactError::EmptyKey)));

        let artifact = RegistrationArtifact::new(vec![entry("k", TypeTag::Int, Some("abc"))]);
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::InvalidDefault { .. })
        ));
    }
}
