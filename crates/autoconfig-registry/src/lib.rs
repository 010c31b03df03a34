//! # AutoConfig Registry
//!
//! The runtime half of autoconfig: loads the registration artifact produced
//! by the discovery pass, applies external overrides (file, environment, or
//! programmatic), and serves typed lookups.
//!
//! The registry is an explicitly constructed, owned instance rather than a
//! process global: create one at program start, `load` the artifact exactly
//! once, run the override phase, then share it read-mostly. Tests construct
//! fresh, isolated registries the same way.
//!
//! ```
//! use autoconfig_common::{RegistrationArtifact, RegistrationEntry, TypeTag};
//! use autoconfig_registry::ConfigRegistry;
//!
//! let artifact = RegistrationArtifact::new(vec![RegistrationEntry {
//!     key: "net.retries".to_string(),
//!     type_tag: TypeTag::Int,
//!     default: Some("6".to_string()),
//! }]);
//!
//! let registry = ConfigRegistry::new();
//! registry.load(&artifact).unwrap();
//! assert_eq!(registry.get::<i32>("net.retries").unwrap(), 6);
//!
//! registry.apply_override("net.retries", "42").unwrap();
//! assert_eq!(registry.get::<i32>("net.retries").unwrap(), 42);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod registry;
pub mod source;

pub use error::*;
pub use registry::*;
pub use source::*;
