//! Render context types shared by the scan and generate stages.
//!
//! Both contexts are plain field maps. The handful of fields the pipeline
//! itself depends on (`logo`, `image_types`, `project_files`,
//! `gallery_images`) get typed accessors; everything else is opaque data for
//! the templates.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Field name → value, as read from a YAML document.
pub type Fields = BTreeMap<String, Value>;

pub const DESCRIPTION: &str = "description";
pub const DESCRIPTION_FILE: &str = "description_file";
pub const LOGO: &str = "logo";
pub const IMAGE_TYPES: &str = "image_types";
pub const PROJECT_FILES: &str = "project_files";
pub const GALLERY_IMAGES: &str = "gallery_images";
pub const PROJECTS: &str = "projects";
pub const PROJECT: &str = "project";

/// Fields holding markdown source that is converted to HTML during assembly.
pub const MARKDOWN_FIELDS: &[&str] = &[DESCRIPTION];

/// Top-level data for the whole site.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteContext {
    pub fields: Fields,
    pub projects: BTreeMap<String, ProjectContext>,
}

/// Data for one project directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectContext {
    /// Directory basename; also the output subdirectory name.
    pub name: String,
    /// Project directory relative to the base directory.
    pub dir: PathBuf,
    pub fields: Fields,
}

impl SiteContext {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The `logo` path, if set to a non-empty string.
    pub fn logo(&self) -> Option<&str> {
        self.fields
            .get(LOGO)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

impl ProjectContext {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Effective `project_files`. Non-string entries are skipped.
    pub fn project_files(&self) -> Vec<String> {
        string_list(self.fields.get(PROJECT_FILES))
    }

    pub fn gallery_images(&self) -> Vec<String> {
        string_list(self.fields.get(GALLERY_IMAGES))
    }

    pub fn image_types(&self) -> Vec<String> {
        string_list(self.fields.get(IMAGE_TYPES))
    }

    /// Absolute-or-relative project directory under `base_dir`.
    pub fn source_dir(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.dir)
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_sequence)
        .map(|seq| {
            seq.iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Build a YAML sequence of strings.
pub fn string_seq<I, S>(items: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Value::Sequence(items.into_iter().map(|s| Value::String(s.into())).collect())
}

// Serialized as the flat map templates see: every site field plus `projects`.
// A user field named `projects` is shadowed by the derived one; `project` is
// dropped since it is bound only for per-project pages.
impl Serialize for SiteContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        let reserved = |k: &str| k == PROJECTS || k == PROJECT;
        for (key, value) in self.fields.iter().filter(|(k, _)| !reserved(k.as_str())) {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(PROJECTS, &self.projects)?;
        map.end()
    }
}

impl Serialize for ProjectContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}
