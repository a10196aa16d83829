//! Keel.lock model and decoding

use std::collections::BTreeMap;

use camino::Utf8PathBuf;
use toml::value::Table;
use toml::Value;

use keel_core::KeelError;

use crate::manifest::{decode_dependency_map, Dependency};
use crate::schema::{render, Decode, FieldKind, FieldSpec, Fields, RecordSchema};
use crate::ConfigResult;

/// Lock file format version this build understands
pub const LOCK_FORMAT_VERSION: u64 = 1;

/// Where a locked package's sources were resolved from
#[derive(Debug, Clone, PartialEq)]
pub enum PackageOrigin {
    /// A Git repository pinned to a commit
    Git { locator: String, commit: String },
    /// A local directory
    Local(Utf8PathBuf),
}

/// One resolved package in Keel.lock
#[derive(Debug, Clone, PartialEq)]
pub struct LockedPackage {
    /// Package name
    pub name: String,

    /// The resolved exact version of the package
    pub version: String,

    /// The package's own declared dependencies, non-exact
    pub dependencies: BTreeMap<String, Dependency>,

    /// Exactly one resolved origin
    pub origin: PackageOrigin,
}

/// The decoded contents of a Keel.lock file
#[derive(Debug, Clone, PartialEq)]
pub struct Lock {
    /// Resolved packages, in resolution order
    pub packages: Vec<LockedPackage>,

    /// Lock file format version
    pub version: u64,
}

impl Lock {
    /// Look up a locked package by name
    pub fn package(&self, name: &str) -> Option<&LockedPackage> {
        self.packages.iter().find(|package| package.name == name)
    }
}

static LOCKED_PACKAGE_SCHEMA: RecordSchema = RecordSchema {
    name: "locked package",
    fields: &[
        FieldSpec {
            name: "name",
            kind: FieldKind::Str,
            required: true,
        },
        FieldSpec {
            name: "version",
            kind: FieldKind::Str,
            required: true,
        },
        FieldSpec {
            name: "dependencies",
            kind: FieldKind::Table,
            required: true,
        },
        FieldSpec {
            name: "git",
            kind: FieldKind::Array,
            required: false,
        },
        FieldSpec {
            name: "path",
            kind: FieldKind::Str,
            required: false,
        },
    ],
};

static LOCK_SCHEMA: RecordSchema = RecordSchema {
    name: "lock",
    fields: &[
        FieldSpec {
            name: "packages",
            kind: FieldKind::Array,
            required: true,
        },
        FieldSpec {
            name: "version",
            kind: FieldKind::Int,
            required: false,
        },
    ],
};

impl Decode for LockedPackage {
    fn schema() -> &'static RecordSchema {
        &LOCKED_PACKAGE_SCHEMA
    }

    fn build(table: &Table) -> ConfigResult<Self> {
        let fields = Fields::new("locked package", table);

        let origin = match (fields.opt_array("git")?, fields.opt_str("path")?) {
            (Some(pair), None) => git_origin(pair)?,
            (None, Some(path)) => PackageOrigin::Local(Utf8PathBuf::from(path)),
            (Some(_), Some(_)) => {
                return Err(KeelError::DependencyConflict {
                    reason: "a locked package cannot record both a `git` and a `path` origin",
                })
            }
            (None, None) => {
                return Err(KeelError::DependencyConflict {
                    reason: "a locked package must record one of `git` or `path` as its origin",
                })
            }
        };

        Ok(Self {
            name: fields.str("name")?.to_string(),
            version: fields.str("version")?.to_string(),
            dependencies: decode_dependency_map(Some(fields.table("dependencies")?))?,
            origin,
        })
    }
}

/// Decode the `git = [locator, commit]` origin pair
fn git_origin(pair: &[Value]) -> ConfigResult<PackageOrigin> {
    if let [locator, commit] = pair {
        if let (Some(locator), Some(commit)) = (locator.as_str(), commit.as_str()) {
            return Ok(PackageOrigin::Git {
                locator: locator.to_string(),
                commit: commit.to_string(),
            });
        }
    }
    Err(KeelError::FieldType {
        record: "locked package",
        field: "git".to_string(),
        expected: "a `[locator, commit]` pair of strings",
        found: match pair {
            [single] => render(single),
            _ => format!("an array of {} elements", pair.len()),
        },
    })
}

impl Decode for Lock {
    fn schema() -> &'static RecordSchema {
        &LOCK_SCHEMA
    }

    fn build(table: &Table) -> ConfigResult<Self> {
        let fields = Fields::new("lock", table);

        let version = match fields.opt_int("version")? {
            Some(version) => u64::try_from(version).map_err(|_| KeelError::FieldType {
                record: "lock",
                field: "version".to_string(),
                expected: "a non-negative integer",
                found: version.to_string(),
            })?,
            None => LOCK_FORMAT_VERSION,
        };

        let packages = fields
            .array("packages")?
            .iter()
            .map(LockedPackage::decode)
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(Self { packages, version })
    }
}
