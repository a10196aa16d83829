//! Loading of Keel.toml and Keel.lock from a project root.
//!
//! The manifest is mandatory and any failure reading or decoding it aborts
//! the load. The lock file is advisory: a missing or unreadable lock, or one
//! whose format version is absent, non-integer or stale, degrades to "no
//! lock" with a diagnostic. A lock written by a newer Keel is fatal.

use camino::Utf8Path;
use toml::Value;
use tracing::warn;

use keel_core::KeelError;

use crate::lock::{Lock, LOCK_FORMAT_VERSION};
use crate::manifest::Environment;
use crate::schema::{render, Decode};
use crate::ConfigResult;

/// Manifest file name expected at the project root
pub const MANIFEST_FILE: &str = "Keel.toml";

/// Lock file name expected at the project root
pub const LOCK_FILE: &str = "Keel.lock";

fn parse_value(content: &str) -> ConfigResult<Value> {
    content.parse().map_err(|e: toml::de::Error| KeelError::TomlParse {
        message: e.to_string(),
    })
}

/// Parse manifest text into a typed environment
pub fn parse_environment(content: &str) -> ConfigResult<Environment> {
    let value = parse_value(content)?;
    Environment::decode(&value)
}

/// Parse lock text, applying the format version policy.
///
/// Returns `Ok(None)` when the lock cannot be trusted but the load may
/// continue; returns an error when the lock was written by a newer Keel.
pub fn parse_lock(content: &str) -> ConfigResult<Option<Lock>> {
    let value = parse_value(content)?;

    let Some(format_version) = value.get("version") else {
        warn!("lock file has no format version, continuing without a lock");
        return Ok(None);
    };
    let Some(format_version) = format_version.as_integer() else {
        warn!(
            found = %render(format_version),
            "lock file has a non-integer format version, continuing without a lock"
        );
        return Ok(None);
    };

    if format_version < LOCK_FORMAT_VERSION as i64 {
        warn!(
            found = format_version,
            supported = LOCK_FORMAT_VERSION,
            "lock file format is outdated, the lock will be regenerated"
        );
        return Ok(None);
    }
    if format_version > LOCK_FORMAT_VERSION as i64 {
        return Err(KeelError::LockNewer {
            found: format_version,
            supported: LOCK_FORMAT_VERSION,
        });
    }

    Lock::decode(&value).map(Some)
}

/// Load `Keel.toml` and the optional `Keel.lock` from `root`
pub async fn load_environment(root: &Utf8Path) -> ConfigResult<(Environment, Option<Lock>)> {
    let manifest_path = root.join(MANIFEST_FILE);
    let content = tokio::fs::read_to_string(&manifest_path)
        .await
        .map_err(|e| KeelError::io(format!("failed to read {manifest_path}"), e))?;
    let environment = parse_environment(&content).map_err(|e| in_file(&manifest_path, e))?;

    let lock_path = root.join(LOCK_FILE);
    let lock = match tokio::fs::read_to_string(&lock_path).await {
        Ok(content) => parse_lock(&content).map_err(|e| in_file(&lock_path, e))?,
        Err(error) => {
            warn!(path = %lock_path, %error, "failed to read lock file, continuing without");
            None
        }
    };

    Ok((environment, lock))
}

/// Attach the offending file path to text-level parse errors
fn in_file(path: &Utf8Path, error: KeelError) -> KeelError {
    match error {
        KeelError::TomlParse { message } => KeelError::TomlParse {
            message: format!("in {path}: {message}"),
        },
        other => other,
    }
}
