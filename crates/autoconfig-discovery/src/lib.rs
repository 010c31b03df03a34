//! # AutoConfig Discovery
//!
//! The build-time discovery pass: scans Rust source trees for marker
//! attributes on const items, resolves each to a canonical
//! `(key, type, default)` triple, detects conflicting redeclarations, and
//! emits one deterministic registration artifact for the runtime registry.
//!
//! The scan is a single-shot, offline batch step invoked by the build
//! pipeline (see the `autoconfig-scan` binary); it never executes the code
//! it inspects.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod marker;
pub mod scanner;

pub use error::*;
pub use marker::*;
pub use scanner::*;
