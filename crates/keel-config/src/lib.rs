//! Manifest and lock file parsing for the Keel package manager
//!
//! This crate handles decoding of `Keel.toml` and `Keel.lock` files into
//! typed records. Each record type declares a static field schema; the
//! `schema` module walks parsed TOML values against those schemas before
//! the record constructors run their own invariants.

pub mod loader;
pub mod lock;
pub mod manifest;
pub mod schema;

// Re-export main types
pub use loader::{load_environment, parse_environment, parse_lock, LOCK_FILE, MANIFEST_FILE};
pub use lock::{Lock, LockedPackage, PackageOrigin, LOCK_FORMAT_VERSION};
pub use manifest::{Build, Dependency, DependencySource, Environment, Project, VersionSelector};
pub use schema::{Decode, FieldKind, FieldSpec, Fields, RecordSchema};

use keel_core::KeelError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, KeelError>;
