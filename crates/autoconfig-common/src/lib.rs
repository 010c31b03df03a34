//! # AutoConfig Common
//!
//! Shared types, the type coercion engine, and the registration artifact
//! schema for the autoconfig workspace.
//!
//! This crate is the contract between the build-time discovery pass and the
//! runtime registry: both sides depend on it, neither depends on the other.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod artifact;
pub mod coerce;
pub mod error;
pub mod types;

pub use artifact::*;
pub use coerce::*;
pub use error::*;
pub use types::*;
