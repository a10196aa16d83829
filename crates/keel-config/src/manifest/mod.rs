//! Keel.toml manifest model and decoding

use std::collections::BTreeMap;

use camino::Utf8PathBuf;
use toml::value::Table;

use keel_core::{KeelError, VersionRange};

use crate::schema::{Decode, FieldKind, FieldSpec, Fields, RecordSchema};
use crate::ConfigResult;

/// The complete contents of a Keel.toml file
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    /// Package metadata section
    pub project: Project,

    /// Build output configuration
    pub build: Build,

    /// Declared dependencies, keyed by package name
    pub dependencies: BTreeMap<String, Dependency>,
}

/// The `[project]` section
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    /// Package name (required)
    pub name: String,

    /// Package version as written, parsed only at resolution time (required)
    pub version: String,

    /// Toplevel module instantiated in simulation and synthesis
    pub toplevel: Option<String>,

    /// `-D` defines passed to the compiler
    pub defines: BTreeMap<String, String>,

    /// Feature flags this package exposes, each enabling further features
    pub features: BTreeMap<String, Vec<String>>,
}

/// The `[build]` section
#[derive(Debug, Clone, PartialEq)]
pub struct Build {
    /// Directory build outputs are written to
    pub target_dir: String,
}

/// Where a dependency's sources come from
#[derive(Debug, Clone, PartialEq)]
pub enum DependencySource {
    /// A Git repository with a Keel.toml at its root
    Git(String),
    /// A local directory containing the dependent package
    Local(Utf8PathBuf),
}

/// Which revisions of a dependency are acceptable
#[derive(Debug, Clone, PartialEq)]
pub enum VersionSelector {
    /// A SemVer-compatible constraint, kept as written until resolution
    Range(String),
    /// An exact Git revision
    Revision(String),
    /// A Git tag
    Tag(String),
    /// A Git branch
    Branch(String),
}

/// One dependency declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    /// Exactly one source location
    pub source: DependencySource,
    /// Exactly one version selector
    pub selector: VersionSelector,
    /// Whether the dependency is pulled in only behind a feature
    pub optional: bool,
}

impl Default for Build {
    fn default() -> Self {
        Self {
            target_dir: "target".to_string(),
        }
    }
}

impl Dependency {
    /// Check if this is a git dependency
    pub fn is_git(&self) -> bool {
        matches!(self.source, DependencySource::Git(_))
    }

    /// Check if this is a local path dependency
    pub fn is_local(&self) -> bool {
        matches!(self.source, DependencySource::Local(_))
    }

    /// Parse the version constraint, if this dependency declares one
    pub fn version_range(&self) -> ConfigResult<Option<VersionRange>> {
        match &self.selector {
            VersionSelector::Range(constraint) => Ok(Some(constraint.parse::<VersionRange>()?)),
            _ => Ok(None),
        }
    }
}

static PROJECT_SCHEMA: RecordSchema = RecordSchema {
    name: "project",
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
            name: "toplevel",
            kind: FieldKind::Str,
            required: false,
        },
        FieldSpec {
            name: "defines",
            kind: FieldKind::Table,
            required: false,
        },
        FieldSpec {
            name: "features",
            kind: FieldKind::Table,
            required: false,
        },
    ],
};

static BUILD_SCHEMA: RecordSchema = RecordSchema {
    name: "build",
    fields: &[FieldSpec {
        name: "target_dir",
        kind: FieldKind::Str,
        required: false,
    }],
};

static DEPENDENCY_SCHEMA: RecordSchema = RecordSchema {
    name: "dependency",
    fields: &[
        FieldSpec {
            name: "git",
            kind: FieldKind::Str,
            required: false,
        },
        FieldSpec {
            name: "path",
            kind: FieldKind::Str,
            required: false,
        },
        FieldSpec {
            name: "version",
            kind: FieldKind::Str,
            required: false,
        },
        FieldSpec {
            name: "rev",
            kind: FieldKind::Str,
            required: false,
        },
        FieldSpec {
            name: "tag",
            kind: FieldKind::Str,
            required: false,
        },
        FieldSpec {
            name: "branch",
            kind: FieldKind::Str,
            required: false,
        },
        FieldSpec {
            name: "optional",
            kind: FieldKind::Bool,
            required: false,
        },
    ],
};

static ENVIRONMENT_SCHEMA: RecordSchema = RecordSchema {
    name: "environment",
    fields: &[
        FieldSpec {
            name: "project",
            kind: FieldKind::Record(&PROJECT_SCHEMA),
            required: true,
        },
        FieldSpec {
            name: "build",
            kind: FieldKind::Record(&BUILD_SCHEMA),
            required: false,
        },
        FieldSpec {
            name: "dependencies",
            kind: FieldKind::Table,
            required: false,
        },
    ],
};

impl Decode for Project {
    fn schema() -> &'static RecordSchema {
        &PROJECT_SCHEMA
    }

    fn build(table: &Table) -> ConfigResult<Self> {
        let fields = Fields::new("project", table);
        Ok(Self {
            name: fields.str("name")?.to_string(),
            version: fields.str("version")?.to_string(),
            toplevel: fields.opt_str("toplevel")?.map(str::to_string),
            defines: fields.string_map("defines")?,
            features: fields.string_list_map("features")?,
        })
    }
}

impl Decode for Build {
    fn schema() -> &'static RecordSchema {
        &BUILD_SCHEMA
    }

    fn build(table: &Table) -> ConfigResult<Self> {
        let fields = Fields::new("build", table);
        Ok(Self {
            target_dir: fields
                .opt_str("target_dir")?
                .unwrap_or("target")
                .to_string(),
        })
    }
}

impl Decode for Dependency {
    fn schema() -> &'static RecordSchema {
        &DEPENDENCY_SCHEMA
    }

    fn build(table: &Table) -> ConfigResult<Self> {
        let fields = Fields::new("dependency", table);

        let source = match (fields.opt_str("git")?, fields.opt_str("path")?) {
            (Some(git), None) => DependencySource::Git(git.to_string()),
            (None, Some(path)) => DependencySource::Local(Utf8PathBuf::from(path)),
            (Some(_), Some(_)) => {
                return Err(KeelError::DependencyConflict {
                    reason: "a dependency cannot come from both a repository (`git`) \
                             and a local path (`path`)",
                })
            }
            (None, None) => {
                return Err(KeelError::DependencyConflict {
                    reason: "a dependency must set one of `git` or `path`",
                })
            }
        };

        let mut candidates = [
            fields
                .opt_str("version")?
                .map(|s| VersionSelector::Range(s.to_string())),
            fields
                .opt_str("rev")?
                .map(|s| VersionSelector::Revision(s.to_string())),
            fields
                .opt_str("tag")?
                .map(|s| VersionSelector::Tag(s.to_string())),
            fields
                .opt_str("branch")?
                .map(|s| VersionSelector::Branch(s.to_string())),
        ];

        let mut selector = None;
        for candidate in &mut candidates {
            if let Some(picked) = candidate.take() {
                if selector.replace(picked).is_some() {
                    return Err(KeelError::DependencyConflict {
                        reason: "`version`, `rev`, `tag` and `branch` are mutually exclusive",
                    });
                }
            }
        }
        let selector = selector.ok_or(KeelError::DependencyConflict {
            reason: "a dependency must set exactly one of `version`, `rev`, `tag` or `branch`",
        })?;

        Ok(Self {
            source,
            selector,
            optional: fields.opt_bool("optional")?.unwrap_or(false),
        })
    }
}

impl Decode for Environment {
    fn schema() -> &'static RecordSchema {
        &ENVIRONMENT_SCHEMA
    }

    fn build(table: &Table) -> ConfigResult<Self> {
        let fields = Fields::new("environment", table);

        let project = Project::build(fields.table("project")?)?;
        let build = match fields.opt_table("build")? {
            Some(table) => Build::build(table)?,
            None => Build::default(),
        };
        let dependencies = decode_dependency_map(fields.opt_table("dependencies")?)?;

        Ok(Self {
            project,
            build,
            dependencies,
        })
    }
}

/// Decode a `name -> dependency` table, validating each entry
pub(crate) fn decode_dependency_map(
    table: Option<&Table>,
) -> ConfigResult<BTreeMap<String, Dependency>> {
    let mut out = BTreeMap::new();
    if let Some(table) = table {
        for (name, value) in table {
            out.insert(name.clone(), Dependency::decode(value)?);
        }
    }
    Ok(out)
}
