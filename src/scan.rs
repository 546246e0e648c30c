//! Project discovery and render-context assembly.
//!
//! Stage 1 of the build. Reads the user's documents and produces the
//! [`SiteContext`] every template is rendered against.
//!
//! ## Directory Structure
//!
//! ```text
//! my-site/                       # Base directory
//! ├── index.yaml                 # Site config (required, may be empty)
//! ├── about.md                   # Referenced by `description_file: about.md`
//! ├── logo.png                   # Referenced by `logo: logo.png`
//! ├── demo/                      # Project "demo"
//! │   ├── project.yaml           # Marker + project config
//! │   ├── photo.png              # → project_files, gallery_images
//! │   ├── notes.txt              # → project_files
//! │   └── _draft.png             # Ignored (underscore prefix)
//! └── work/
//!     └── robot/                 # Nested project "robot"
//!         └── project.yaml
//! ```
//!
//! ## Assembly Order
//!
//! For the site and for every project:
//!
//! 1. load the user document (empty file = empty mapping)
//! 2. inline `description_file` into `description`
//! 3. start from the resolved defaults, overlay the user document
//! 4. render markdown fields to HTML
//!
//! Projects additionally derive `project_files` and `gallery_images` before
//! the user document is overlaid, using the user's `image_types` if given.
//! The overlay comes last, so a user who sets one of the derived keys
//! explicitly always gets exactly what they wrote.
//!
//! ## Discovery
//!
//! Any directory below the base directory that directly contains
//! `project.yaml` is a project, however deep. Directories starting with `_` or
//! `.` and the output directory are not searched. Project names are directory
//! basenames and must be unique, since each one becomes an output directory.

use crate::config::{self, ConfigError, overlay, string_field, string_list_field};
use crate::markdown::apply_markdown_fields;
use crate::naming::{self, PROJECT_MARKER, SITE_CONFIG};
use crate::types::{
    DESCRIPTION, DESCRIPTION_FILE, Fields, GALLERY_IMAGES, IMAGE_TYPES, PROJECT_FILES,
    ProjectContext, SiteContext, string_seq,
};
use serde_yaml::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Cannot read description file {path}: {source}")]
    DescriptionFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Duplicate project name '{name}': {first} and {second}")]
    DuplicateProject {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// A project directory found under the base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredProject {
    pub name: String,
    /// Relative to the base directory.
    pub dir: PathBuf,
}

/// Inputs to [`build_context`].
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions<'a> {
    pub base_dir: &'a Path,
    pub templates_dir: &'a Path,
    pub template: &'a str,
    /// Directory never searched for projects (the build output).
    pub exclude: Option<&'a Path>,
}

/// Find every project directory under `base_dir`, sorted by path.
pub fn discover_projects(
    base_dir: &Path,
    exclude: Option<&Path>,
) -> Result<Vec<DiscoveredProject>, ScanError> {
    let exclude_canonical = exclude.and_then(|p| p.canonicalize().ok());
    let is_excluded = |path: &Path| {
        exclude == Some(path)
            || exclude_canonical
                .as_deref()
                .is_some_and(|ex| path.canonicalize().ok().as_deref() == Some(ex))
    };

    let walker = WalkDir::new(base_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !naming::is_ignored(&name) && !naming::is_hidden(&name) && !is_excluded(e.path())
        });

    let mut projects = Vec::new();
    for entry in walker {
        let entry = entry?;
        // depth 1 is the base directory's own marker, which is not a project
        let is_marker = entry.file_type().is_file() && entry.file_name() == PROJECT_MARKER;
        if entry.depth() < 2 || !is_marker {
            continue;
        }
        let Some(project_dir) = entry.path().parent() else {
            continue;
        };
        let Some(name) = project_dir.file_name() else {
            continue;
        };
        let rel = project_dir
            .strip_prefix(base_dir)
            .unwrap_or(project_dir)
            .to_path_buf();
        projects.push(DiscoveredProject {
            name: name.to_string_lossy().to_string(),
            dir: rel,
        });
    }

    projects.sort_by(|a, b| a.dir.cmp(&b.dir));

    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for project in &projects {
        if let Some(first) = seen.insert(&project.name, &project.dir) {
            return Err(ScanError::DuplicateProject {
                name: project.name.clone(),
                first: first.to_path_buf(),
                second: project.dir.clone(),
            });
        }
    }

    Ok(projects)
}

/// Assemble the full site context.
///
/// Any malformed document or unreadable description file aborts the whole
/// assembly; no partial context is returned.
pub fn build_context(options: &ScanOptions<'_>) -> Result<SiteContext, ScanError> {
    let base_dir = options.base_dir;
    let doc_path = base_dir.join(SITE_CONFIG);
    let mut doc = config::load_document(&doc_path)?;
    inline_description_file(&mut doc, base_dir, &doc_path)?;

    let defaults = config::resolve_defaults(options.templates_dir, Some(options.template))?;

    let mut fields = overlay(defaults.site, &doc);
    apply_markdown_fields(&mut fields);

    let discovered = discover_projects(base_dir, options.exclude)?;
    info!(count = discovered.len(), "discovered projects");

    let mut projects = BTreeMap::new();
    for found in &discovered {
        let project = build_project(base_dir, found, &defaults.project)?;
        projects.insert(project.name.clone(), project);
    }

    Ok(SiteContext { fields, projects })
}

fn build_project(
    base_dir: &Path,
    found: &DiscoveredProject,
    defaults: &Fields,
) -> Result<ProjectContext, ScanError> {
    let dir = base_dir.join(&found.dir);
    let doc_path = dir.join(PROJECT_MARKER);
    let mut doc = config::load_document(&doc_path)?;

    let mut fields = defaults.clone();
    if let Some(types) = doc.get(IMAGE_TYPES) {
        fields.insert(IMAGE_TYPES.to_string(), types.clone());
    }
    let image_types: Vec<String> = string_list_field(&fields, IMAGE_TYPES, &doc_path)?
        .unwrap_or_default()
        .iter()
        .map(|t| naming::normalize_extension(t))
        .collect();

    let project_files = match string_list_field(&doc, PROJECT_FILES, &doc_path)? {
        Some(files) => files,
        None => list_project_files(&dir)?,
    };
    let gallery_images = gallery_subset(&project_files, &image_types);
    debug!(
        project = %found.name,
        files = project_files.len(),
        images = gallery_images.len(),
        "classified project files"
    );

    fields.insert(PROJECT_FILES.to_string(), string_seq(project_files));
    fields.insert(GALLERY_IMAGES.to_string(), string_seq(gallery_images));

    inline_description_file(&mut doc, &dir, &doc_path)?;
    let mut fields = overlay(fields, &doc);
    if fields.contains_key(IMAGE_TYPES) {
        fields.insert(IMAGE_TYPES.to_string(), string_seq(image_types));
    }
    apply_markdown_fields(&mut fields);

    Ok(ProjectContext {
        name: found.name.clone(),
        dir: found.dir.clone(),
        fields,
    })
}

/// Immediate files of a project directory that get published with it.
///
/// Skips directories, ignored and hidden names, and the marker file.
pub fn list_project_files(dir: &Path) -> Result<Vec<String>, ScanError> {
    let mut files: Vec<String> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| {
            !naming::is_ignored(name) && !naming::is_hidden(name) && name != PROJECT_MARKER
        })
        .collect();

    files.sort();
    Ok(files)
}

/// Entries of `files` whose extension is one of `image_types`.
///
/// `image_types` must already be normalized (see [`naming::normalize_extension`]).
pub fn gallery_subset(files: &[String], image_types: &[String]) -> Vec<String> {
    files
        .iter()
        .filter(|f| naming::has_extension(Path::new(f.as_str()), image_types))
        .cloned()
        .collect()
}

/// Replace `description` with the contents of `description_file`, if set.
fn inline_description_file(
    doc: &mut Fields,
    dir: &Path,
    doc_path: &Path,
) -> Result<(), ScanError> {
    let Some(rel) = string_field(doc, DESCRIPTION_FILE, doc_path)? else {
        return Ok(());
    };
    let path = dir.join(rel);
    let text = fs::read_to_string(&path)
        .map_err(|source| ScanError::DescriptionFile { path, source })?;
    doc.insert(DESCRIPTION.to_string(), Value::String(text));
    Ok(())
}
