//! External override sources.
//!
//! Two sources are supported: a properties-style file of `key=value` lines
//! and environment variables under a caller-chosen prefix. Both funnel into
//! [`ConfigRegistry::apply_override`] per entry.
//!
//! Policy: keys present in a source but absent from the registry, and values
//! that do not coerce, are reported as warnings (logged and returned in the
//! [`OverrideReport`]) rather than hard errors, since an override source may
//! be shared across programs with different configuration surfaces. Callers
//! that want hard failure check [`OverrideReport::is_clean`].

use std::path::Path;

use tracing::warn;

use crate::error::RegistryError;
use crate::registry::ConfigRegistry;

/// Outcome of applying one override source.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OverrideReport {
    /// Keys whose overrides were applied.
    pub applied: Vec<String>,
    /// Keys present in the source but not in the registry.
    pub unknown: Vec<String>,
    /// Keys whose value did not coerce, with the failure message. The
    /// registry value is left unchanged for these.
    pub invalid: Vec<(String, String)>,
    /// 1-based line numbers that were not `key=value` shaped (file source
    /// only).
    pub malformed: Vec<usize>,
}

impl OverrideReport {
    /// Whether every entry in the source applied cleanly.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unknown.is_empty() && self.invalid.is_empty() && self.malformed.is_empty()
    }
}

/// Applies a `key=value` override file.
///
/// Blank lines and lines starting with `#` are ignored. The key is trimmed;
/// the value is everything after the first `=`, taken verbatim.
///
/// # Errors
///
/// [`RegistryError::Io`] when the file cannot be read, or
/// [`RegistryError::Uninitialized`] when called before `load`.
pub fn apply_file(
    registry: &ConfigRegistry,
    path: impl AsRef<Path>,
) -> Result<OverrideReport, RegistryError> {
    let content = std::fs::read_to_string(path)?;
    let mut report = OverrideReport::default();

    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some((key, value)) = trimmed.split_once('=') else {
            warn!(line = index + 1, "override line is not key=value shaped");
            report.malformed.push(index + 1);
            continue;
        };

        apply_one(registry, key.trim(), value, &mut report)?;
    }

    Ok(report)
}

/// Applies environment variables named `<PREFIX>_<key>` as overrides to
/// `<key>`.
///
/// # Errors
///
/// [`RegistryError::Uninitialized`] when called before `load`.
pub fn apply_env(registry: &ConfigRegistry, prefix: &str) -> Result<OverrideReport, RegistryError> {
    let mut report = OverrideReport::default();
    let full_prefix = format!("{prefix}_");

    // vars_os, not vars: the environment is not under this program's
    // control and may hold non-UTF-8 entries, which vars() panics on.
    let mut vars: Vec<(String, String)> = std::env::vars_os()
        .filter_map(|(name, value)| {
            let name = name.into_string().ok()?;
            let key = name.strip_prefix(&full_prefix)?.to_string();
            match value.into_string() {
                Ok(value) => Some((key, value)),
                Err(_) => {
                    warn!(key, "skipping environment override with a non-UTF-8 value");
                    None
                }
            }
        })
        .collect();
    // Deterministic application order regardless of environment layout.
    vars.sort();

    for (key, value) in vars {
        apply_one(registry, &key, &value, &mut report)?;
    }

    Ok(report)
}

fn apply_one(
    registry: &ConfigRegistry,
    key: &str,
    value: &str,
    report: &mut OverrideReport,
) -> Result<(), RegistryError> {
    match registry.apply_override(key, value) {
        Ok(()) => report.applied.push(key.to_string()),
        Err(RegistryError::UnknownKey { .. }) => {
            warn!(key, "override source names a key that is not registered");
            report.unknown.push(key.to_string());
        }
        Err(err @ RegistryError::InvalidValue { .. }) => {
            warn!(key, %err, "override value rejected");
            report.invalid.push((key.to_string(), err.to_string()));
        }
        Err(other) => return Err(other),
    }
    Ok(())
}
