//! # keel-core
//!
//! Core types shared across the Keel workspace.
//!
//! This crate provides:
//! - Version and VersionRange types with the full SemVer precedence order
//! - The unified KeelError enum for error handling
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: the version model (Version, Identifier, VersionRange)
//! - `error`: error types and result aliases

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{KeelError, KeelResult};
pub use types::{Identifier, Version, VersionError, VersionRange};
