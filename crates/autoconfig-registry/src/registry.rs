//! The runtime registry: a key-sharded store with a one-time load barrier.
//!
//! Lifecycle: `Uninitialized -> Loaded -> read-mostly steady state`. Every
//! operation except `load` fails fast with [`RegistryError::Uninitialized`]
//! until `load` has returned successfully, and `load` itself is accepted at
//! most once. Overrides are atomic per key: a reader sees either the old or
//! the new value of a key, never anything in between, and overrides to
//! distinct keys proceed independently on separate shards.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, warn};

use autoconfig_common::{
    coerce, ArtifactError, ConfigValue, FromConfigValue, RegistrationArtifact, TypeTag,
};

use crate::error::RegistryError;

/// Handle returned by [`ConfigRegistry::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&str, &ConfigValue) + Send + Sync>;

#[derive(Debug, Clone)]
struct ConfigEntry {
    type_tag: TypeTag,
    default: Option<ConfigValue>,
    current: Option<ConfigValue>,
}

/// The process-wide configuration store.
///
/// Construct one instance at program start, [`load`](Self::load) the
/// artifact exactly once, optionally apply overrides, then share the
/// instance (e.g. behind an `Arc`) for reads. Change listeners fire
/// synchronously on the writing thread, after the new value is visible and
/// outside any internal lock.
pub struct ConfigRegistry {
    entries: DashMap<String, ConfigEntry>,
    listeners: RwLock<HashMap<String, Vec<(ListenerId, Listener)>>>,
    next_listener_id: AtomicU64,
    load_started: AtomicBool,
    loaded: AtomicBool,
}

impl ConfigRegistry {
    /// Creates an empty, uninitialized registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            listeners: RwLock::new(HashMap::new()),
            next_listener_id: AtomicU64::new(1),
            load_started: AtomicBool::new(false),
            loaded: AtomicBool::new(false),
        }
    }

    /// Populates the registry from a registration artifact.
    ///
    /// Accepted at most once per registry; a second call fails with
    /// [`RegistryError::AlreadyLoaded`] whether or not the first succeeded.
    /// The artifact was validated by the discovery pass at build time, so the
    /// validation here is a defensive check against hand-edited files; a
    /// failure leaves the registry permanently unusable.
    ///
    /// Each entry's current value starts as its coerced default, or absent
    /// when the marker declared none.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AlreadyLoaded`] or [`RegistryError::Artifact`].
    pub fn load(&self, artifact: &RegistrationArtifact) -> Result<(), RegistryError> {
        if self
            .load_started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(RegistryError::AlreadyLoaded);
        }

        artifact.validate()?;

        for entry in &artifact.entries {
            let default = entry
                .default
                .as_deref()
                .map(|text| {
                    coerce(entry.type_tag, text).map_err(|source| ArtifactError::InvalidDefault {
                        key: entry.key.clone(),
                        source,
                    })
                })
                .transpose()?;

            self.entries.insert(
                entry.key.clone(),
                ConfigEntry {
                    type_tag: entry.type_tag,
                    current: default.clone(),
                    default,
                },
            );
        }

        // Publish only after the store is fully populated; readers gate on
        // this flag with Acquire ordering.
        self.loaded.store(true, Ordering::Release);
        debug!(entries = self.entries.len(), "registry loaded");
        Ok(())
    }

    /// Reads, validates, and loads an artifact file from disk.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), plus artifact read/parse failures.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<(), RegistryError> {
        let artifact = RegistrationArtifact::from_file(path)?;
        self.load(&artifact)
    }

    /// Replaces the current value of `key` with `raw` coerced to the key's
    /// declared type. Last write wins; on failure the stored value is left
    /// untouched. Listeners for the key fire after the write.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Uninitialized`], [`RegistryError::UnknownKey`], or
    /// [`RegistryError::InvalidValue`].
    pub fn apply_override(&self, key: &str, raw: &str) -> Result<(), RegistryError> {
        self.ensure_loaded()?;

        let value = {
            let mut entry = self
                .entries
                .get_mut(key)
                .ok_or_else(|| RegistryError::UnknownKey {
                    key: key.to_string(),
                })?;
            let value =
                coerce(entry.type_tag, raw).map_err(|source| RegistryError::InvalidValue {
                    key: key.to_string(),
                    declared: entry.type_tag,
                    source,
                })?;
            entry.current = Some(value.clone());
            value
        };

        self.notify(key, &value);
        Ok(())
    }

    /// Returns the current value of `key` as `T`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Uninitialized`], [`RegistryError::UnknownKey`],
    /// [`RegistryError::TypeMismatch`] when `T` is not the declared type, or
    /// [`RegistryError::MissingValue`] when the key has neither a default
    /// nor an applied override.
    pub fn get<T: FromConfigValue>(&self, key: &str) -> Result<T, RegistryError> {
        self.ensure_loaded()?;

        let entry = self
            .entries
            .get(key)
            .ok_or_else(|| RegistryError::UnknownKey {
                key: key.to_string(),
            })?;

        if T::TAG != entry.type_tag {
            return Err(RegistryError::TypeMismatch {
                key: key.to_string(),
                declared: entry.type_tag,
                requested: T::TAG,
            });
        }

        let value = entry
            .current
            .as_ref()
            .ok_or_else(|| RegistryError::MissingValue {
                key: key.to_string(),
            })?;

        // The tag check above makes a variant mismatch impossible here.
        T::from_config_value(value).ok_or_else(|| RegistryError::TypeMismatch {
            key: key.to_string(),
            declared: entry.type_tag,
            requested: T::TAG,
        })
    }

    /// Whether `key` is registered. Never fails; `false` before `load`.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.loaded.load(Ordering::Acquire) && self.entries.contains_key(key)
    }

    /// The declared type of `key`, or `None` when unregistered or before
    /// `load`.
    #[must_use]
    pub fn type_of(&self, key: &str) -> Option<TypeTag> {
        if !self.loaded.load(Ordering::Acquire) {
            return None;
        }
        self.entries.get(key).map(|entry| entry.type_tag)
    }

    /// All registered keys in lexicographic order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        if !self.loaded.load(Ordering::Acquire) {
            return Vec::new();
        }
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Restores `key` to its registered default and fires listeners.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Uninitialized`], [`RegistryError::UnknownKey`], or
    /// [`RegistryError::MissingValue`] when no default was registered.
    pub fn reset(&self, key: &str) -> Result<(), RegistryError> {
        self.ensure_loaded()?;

        let value = {
            let mut entry = self
                .entries
                .get_mut(key)
                .ok_or_else(|| RegistryError::UnknownKey {
                    key: key.to_string(),
                })?;
            let default = entry
                .default
                .clone()
                .ok_or_else(|| RegistryError::MissingValue {
                    key: key.to_string(),
                })?;
            entry.current = Some(default.clone());
            default
        };

        self.notify(key, &value);
        Ok(())
    }

    /// Registers a change listener for `key`, fired on every override and
    /// reset of that key.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Uninitialized`] or [`RegistryError::UnknownKey`].
    pub fn subscribe<F>(&self, key: &str, listener: F) -> Result<ListenerId, RegistryError>
    where
        F: Fn(&str, &ConfigValue) + Send + Sync + 'static,
    {
        self.ensure_loaded()?;
        if !self.entries.contains_key(key) {
            return Err(RegistryError::UnknownKey {
                key: key.to_string(),
            });
        }

        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .entry(key.to_string())
            .or_default()
            .push((id, Arc::new(listener)));
        Ok(id)
    }

    /// Removes a previously registered listener. Returns `false` when the
    /// listener was not found.
    pub fn unsubscribe(&self, key: &str, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let Some(for_key) = listeners.get_mut(key) else {
            warn!(key, "unsubscribe on a key with no listeners");
            return false;
        };
        let before = for_key.len();
        for_key.retain(|(existing, _)| *existing != id);
        before != for_key.len()
    }

    fn notify(&self, key: &str, value: &ConfigValue) {
        // Clone the callbacks out so none run under the table lock.
        let to_fire: Vec<Listener> = {
            let listeners = self.listeners.read();
            listeners
                .get(key)
                .map(|for_key| for_key.iter().map(|(_, l)| Arc::clone(l)).collect())
                .unwrap_or_default()
        };
        for listener in to_fire {
            listener(key, value);
        }
    }

    fn ensure_loaded(&self) -> Result<(), RegistryError> {
        if self.loaded.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(RegistryError::Uninitialized)
        }
    }
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigRegistry")
            .field("entries", &self.entries.len())
            .field("loaded", &self.loaded.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoconfig_common::RegistrationEntry;
    use std::sync::Mutex;

    fn entry(key: &str, tag: TypeTag, default: Option<&str>) -> RegistrationEntry {
        RegistrationEntry {
            key: key.to_string(),
            type_tag: tag,
            default: default.map(str::to_string),
        }
    }

    fn loaded_registry() -> ConfigRegistry {
        let artifact = RegistrationArtifact::new(vec![
            entry("k.int", TypeTag::Int, Some("6")),
            entry("k.long", TypeTag::Long, Some("600000000000")),
            entry("k.bool", TypeTag::Bool, Some("false")),
            entry("k.string", TypeTag::String, Some("hello")),
            entry("k.double", TypeTag::Double, Some("2.5")),
            entry("k.nodefault", TypeTag::Int, None),
        ]);
        let registry = ConfigRegistry::new();
        registry.load(&artifact).unwrap();
        registry
    }

    #[test]
    fn operations_before_load_fail_fast() {
        let registry = ConfigRegistry::new();
        assert!(matches!(
            registry.get::<i32>("k.int"),
            Err(RegistryError::Uninitialized)
        ));
        assert!(matches!(
            registry.apply_override("k.int", "1"),
            Err(RegistryError::Uninitialized)
        ));
        assert!(!registry.has("k.int"));
        assert_eq!(registry.type_of("k.int"), None);
        assert!(registry.keys().is_empty());
    }

    #[test]
    fn second_load_is_rejected() {
        let artifact = RegistrationArtifact::new(vec![entry("k", TypeTag::Int, Some("1"))]);
        let registry = ConfigRegistry::new();
        registry.load(&artifact).unwrap();
        assert!(matches!(
            registry.load(&artifact),
            Err(RegistryError::AlreadyLoaded)
        ));
    }

    #[test]
    fn defaults_are_served_with_declared_types() {
        let registry = loaded_registry();
        assert_eq!(registry.get::<i32>("k.int").unwrap(), 6);
        assert_eq!(registry.get::<i64>("k.long").unwrap(), 600_000_000_000);
        assert!(!registry.get::<bool>("k.bool").unwrap());
        assert_eq!(registry.get::<String>("k.string").unwrap(), "hello");
        assert!((registry.get::<f64>("k.double").unwrap() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn override_replaces_the_default() {
        let registry = loaded_registry();
        assert_eq!(registry.get::<i32>("k.int").unwrap(), 6);
        registry.apply_override("k.int", "42").unwrap();
        assert_eq!(registry.get::<i32>("k.int").unwrap(), 42);

        // last write wins
        registry.apply_override("k.int", "43").unwrap();
        assert_eq!(registry.get::<i32>("k.int").unwrap(), 43);
    }

    #[test]
    fn failed_override_leaves_the_value_unchanged() {
        let registry = loaded_registry();
        let err = registry.apply_override("k.int", "abc").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidValue { .. }));
        assert_eq!(registry.get::<i32>("k.int").unwrap(), 6);
    }

    #[test]
    fn unknown_key_everywhere() {
        let registry = loaded_registry();
        assert!(matches!(
            registry.get::<i32>("nope"),
            Err(RegistryError::UnknownKey { .. })
        ));
        assert!(matches!(
            registry.apply_override("nope", "1"),
            Err(RegistryError::UnknownKey { .. })
        ));
        assert!(!registry.has("nope"));
    }

    #[test]
    fn requested_type_must_match_declared() {
        let registry = loaded_registry();
        let err = registry.get::<bool>("k.int").unwrap_err();
        match err {
            RegistryError::TypeMismatch {
                key,
                declared,
                requested,
            } => {
                assert_eq!(key, "k.int");
                assert_eq!(declared, TypeTag::Int);
                assert_eq!(requested, TypeTag::Bool);
            }
            other => panic!("expected type mismatch, got {other}"),
        }
    }

    #[test]
    fn missing_value_without_default_or_override() {
        let registry = loaded_registry();
        assert!(matches!(
            registry.get::<i32>("k.nodefault"),
            Err(RegistryError::MissingValue { .. })
        ));

        registry.apply_override("k.nodefault", "9").unwrap();
        assert_eq!(registry.get::<i32>("k.nodefault").unwrap(), 9);
    }

    #[test]
    fn introspection_helpers() {
        let registry = loaded_registry();
        assert!(registry.has("k.int"));
        assert_eq!(registry.type_of("k.int"), Some(TypeTag::Int));
        assert_eq!(registry.type_of("nope"), None);
        assert_eq!(
            registry.keys(),
            ["k.bool", "k.double", "k.int", "k.long", "k.nodefault", "k.string"]
        );
    }

    #[test]
    fn reset_restores_the_default() {
        let registry = loaded_registry();
        registry.apply_override("k.int", "42").unwrap();
        registry.reset("k.int").unwrap();
        assert_eq!(registry.get::<i32>("k.int").unwrap(), 6);

        // no default registered
        assert!(matches!(
            registry.reset("k.nodefault"),
            Err(RegistryError::MissingValue { .. })
        ));
    }

    #[test]
    fn listeners_observe_overrides_and_resets() {
        let registry = loaded_registry();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = Arc::clone(&seen);
        let id = registry
            .subscribe("k.int", move |key, value| {
                seen_clone.lock().unwrap().push((key.to_string(), value.clone()));
            })
            .unwrap();

        registry.apply_override("k.int", "42").unwrap();
        registry.reset("k.int").unwrap();

        {
            let seen = seen.lock().unwrap();
            assert_eq!(
                *seen,
                vec![
                    ("k.int".to_string(), ConfigValue::Int(42)),
                    ("k.int".to_string(), ConfigValue::Int(6)),
                ]
            );
        }

        assert!(registry.unsubscribe("k.int", id));
        registry.apply_override("k.int", "7").unwrap();
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn subscribe_requires_a_known_key() {
        let registry = loaded_registry();
        assert!(matches!(
            registry.subscribe("nope", |_, _| {}),
            Err(RegistryError::UnknownKey { .. })
        ));
    }

    #[test]
    fn load_rejects_corrupt_artifacts_defensively() {
        let mut artifact = RegistrationArtifact::new(vec![entry("k", TypeTag::Int, Some("1"))]);
        artifact.version = 7;
        let registry = ConfigRegistry::new();
        assert!(matches!(
            registry.load(&artifact),
            Err(RegistryError::Artifact(ArtifactError::UnsupportedVersion { .. }))
        ));
    }
}
