//! Configuration documents and layered defaults.
//!
//! Every document the site is built from is YAML. Values flow through three
//! layers, each overriding matching fields of the previous one:
//!
//! ```text
//! templates/defaults.yaml              ← global defaults (required)
//! templates/<template>/_defaults.yaml  ← template defaults (optional)
//! <base>/index.yaml, */project.yaml    ← user documents
//! ```
//!
//! The two default documents share the same shape, one section per entity:
//!
//! ```yaml
//! site:
//!   title: My site
//!   logo: null
//! project:
//!   image_types: [.png, .jpg, .jpeg, .gif]
//! ```
//!
//! Merging is shallow: a field present in a later layer replaces the earlier
//! value entirely, lists and nested mappings included. Fields absent from every
//! layer are simply absent; nothing is synthesized for them.

use crate::types::Fields;
use serde::Deserialize;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Global defaults file at the root of the template library.
pub const GLOBAL_DEFAULTS: &str = "defaults.yaml";

/// Per-template defaults override, inside the template directory.
pub const TEMPLATE_DEFAULTS: &str = "_defaults.yaml";

/// Template used when none is requested.
pub const DEFAULT_TEMPLATE: &str = "aquarius";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    Missing(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML parse error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Top level of {0} must be a mapping")]
    NotAMapping(PathBuf),
    #[error("Field '{field}' in {path} must be {expected}")]
    InvalidField {
        path: PathBuf,
        field: String,
        expected: &'static str,
    },
    #[error("Unknown template '{name}': no directory at {dir}")]
    UnknownTemplate { name: String, dir: PathBuf },
}

/// The `(site, project)` defaults pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Defaults {
    pub site: Fields,
    pub project: Fields,
}

/// On-disk shape of `defaults.yaml` and `_defaults.yaml`.
///
/// Unknown sections are rejected to catch typos such as `projects:`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DefaultsDocument {
    site: Option<Fields>,
    project: Option<Fields>,
}

impl From<DefaultsDocument> for Defaults {
    fn from(doc: DefaultsDocument) -> Self {
        Self {
            site: doc.site.unwrap_or_default(),
            project: doc.project.unwrap_or_default(),
        }
    }
}

/// Location of the template library shipped with the crate.
pub fn bundled_templates_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
}

/// Resolve a template name to its directory inside the library.
pub fn template_root(templates_dir: &Path, name: &str) -> Result<PathBuf, ConfigError> {
    let dir = templates_dir.join(name);
    if dir.is_dir() {
        Ok(dir)
    } else {
        Err(ConfigError::UnknownTemplate {
            name: name.to_string(),
            dir,
        })
    }
}

fn read_text(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Missing(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a YAML document whose top level is a field mapping.
///
/// - absent file → [`ConfigError::Missing`]
/// - empty or `null` document → empty mapping
/// - scalar or sequence at the top level → [`ConfigError::NotAMapping`]
pub fn load_document(path: &Path) -> Result<Fields, ConfigError> {
    let content = read_text(path)?;
    parse_document(&content, path)
}

/// Parse document text; `path` is only used for error messages.
pub fn parse_document(content: &str, path: &Path) -> Result<Fields, ConfigError> {
    if content.trim().is_empty() {
        return Ok(Fields::new());
    }
    let value: Value = serde_yaml::from_str(content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Null => Ok(Fields::new()),
        Value::Mapping(_) => serde_yaml::from_value(value).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
        _ => Err(ConfigError::NotAMapping(path.to_path_buf())),
    }
}

fn load_defaults_document(path: &Path) -> Result<Defaults, ConfigError> {
    let content = read_text(path)?;
    if content.trim().is_empty() {
        return Ok(Defaults::default());
    }
    let doc: Option<DefaultsDocument> =
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(doc.unwrap_or_default().into())
}

/// Overlay `top` onto `base`, field by field. Later values win outright.
pub fn overlay(mut base: Fields, top: &Fields) -> Fields {
    for (key, value) in top {
        base.insert(key.clone(), value.clone());
    }
    base
}

/// Resolve the `(site, project)` defaults for a template.
///
/// The global document is required. The template's `_defaults.yaml` is
/// optional; when present each of its sections is overlaid onto the matching
/// global section.
pub fn resolve_defaults(
    templates_dir: &Path,
    template_name: Option<&str>,
) -> Result<Defaults, ConfigError> {
    let global = load_defaults_document(&templates_dir.join(GLOBAL_DEFAULTS))?;

    let Some(name) = template_name else {
        return Ok(global);
    };
    let override_path = templates_dir.join(name).join(TEMPLATE_DEFAULTS);
    if !override_path.is_file() {
        return Ok(global);
    }
    let template = load_defaults_document(&override_path)?;
    Ok(Defaults {
        site: overlay(global.site, &template.site),
        project: overlay(global.project, &template.project),
    })
}

/// Read an optional list-of-strings field.
///
/// Returns `Ok(None)` when the field is absent or null.
pub fn string_list_field(
    fields: &Fields,
    field: &str,
    path: &Path,
) -> Result<Option<Vec<String>>, ConfigError> {
    let invalid = || ConfigError::InvalidField {
        path: path.to_path_buf(),
        field: field.to_string(),
        expected: "a list of strings",
    };
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Sequence(seq)) => seq
            .iter()
            .map(|v| v.as_str().map(String::from).ok_or_else(invalid))
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err(invalid()),
    }
}

/// Read an optional string field. Null counts as absent.
pub fn string_field<'a>(
    fields: &'a Fields,
    field: &str,
    path: &Path,
) -> Result<Option<&'a str>, ConfigError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: field.to_string(),
            expected: "a string",
        }),
    }
}
