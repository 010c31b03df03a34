//! Source enumeration, marker collection, and the merge step.
//!
//! The unit of discovery is "everything scanned in this pass": any number of
//! independently authored source roots contribute markers without knowing
//! about each other. Determinism comes from sorted directory walks plus a
//! key-ordered merge, so unchanged sources always produce byte-identical
//! artifacts.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use autoconfig_common::RegistrationArtifact;

use crate::error::DiscoveryError;
use crate::marker::{resolve_markers, ResolvedMarker};

/// Runs the full discovery pass over the given roots (files or directories)
/// and returns the merged, validated artifact.
///
/// # Errors
///
/// Returns a [`DiscoveryError`] on I/O or parse failure, malformed markers,
/// or conflicting redeclarations of a key. No artifact is produced on error.
pub fn scan(roots: &[PathBuf]) -> Result<RegistrationArtifact, DiscoveryError> {
    let files = enumerate_sources(roots)?;
    let mut merged: BTreeMap<String, ResolvedMarker> = BTreeMap::new();

    for file in &files {
        for marker in scan_file(file)? {
            merge(&mut merged, marker)?;
        }
    }

    info!(
        files = files.len(),
        entries = merged.len(),
        "discovery scan complete"
    );

    let artifact =
        RegistrationArtifact::new(merged.into_values().map(|marker| marker.entry).collect());
    // Scan-time checks should have caught everything already; this is the
    // same defensive validation the registry runs at load.
    artifact.validate()?;
    Ok(artifact)
}

/// Collects the `.rs` files under the roots in deterministic order.
///
/// Hidden directories and `target/` are skipped; a root that is itself a
/// file is taken as-is.
fn enumerate_sources(roots: &[PathBuf]) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut files = Vec::new();

    for root in roots {
        if root.is_file() {
            if is_rust_file(root) {
                files.push(root.clone());
            }
            continue;
        }

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                // The root itself is always descended into, whatever its
                // name; `.` and tempdir-style `.tmpXXXX` roots are legal.
                if entry.depth() == 0 {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                !(entry.file_type().is_dir() && (name == "target" || name.starts_with('.')))
            });

        for entry in walker {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file() && is_rust_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn is_rust_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "rs")
}

/// Parses one file and resolves every marker in it, recursing through
/// inline modules. Markers are recognized on module-level const items only.
fn scan_file(file: &Path) -> Result<Vec<ResolvedMarker>, DiscoveryError> {
    let source = std::fs::read_to_string(file)?;
    let parsed = syn::parse_file(&source).map_err(|source| DiscoveryError::ParseFile {
        file: file.to_path_buf(),
        source,
    })?;

    let mut markers = Vec::new();
    collect_items(&parsed.items, file, &mut markers)?;
    debug!(file = %file.display(), markers = markers.len(), "scanned file");
    Ok(markers)
}

fn collect_items(
    items: &[syn::Item],
    file: &Path,
    out: &mut Vec<ResolvedMarker>,
) -> Result<(), DiscoveryError> {
    for item in items {
        match item {
            syn::Item::Const(item) => out.extend(resolve_markers(item, file)?),
            syn::Item::Mod(module) => {
                if let Some((_, items)) = &module.content {
                    collect_items(items, file, out)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Folds one marker into the working set.
///
/// A second declaration of a key with identical type and default is the
/// idempotent-redeclaration case (code generation, partial recompilation)
/// and merges silently; anything else is a conflict naming both sites.
fn merge(
    map: &mut BTreeMap<String, ResolvedMarker>,
    marker: ResolvedMarker,
) -> Result<(), DiscoveryError> {
    match map.entry(marker.entry.key.clone()) {
        Entry::Vacant(slot) => {
            slot.insert(marker);
            Ok(())
        }
        Entry::Occupied(existing) => {
            if existing.get().entry == marker.entry {
                debug!(key = %marker.entry.key, "deduplicated identical redeclaration");
                Ok(())
            } else {
                Err(DiscoveryError::DuplicateKeyConflict {
                    key: marker.entry.key,
                    first: existing.get().site.clone(),
                    second: marker.site,
                })
            }
        }
    }
}
