//! Output tree generation.
//!
//! Stage 2 of the build. Mirrors the selected template directory into the
//! output directory, rendering templated files against the [`SiteContext`],
//! then writes one page per project.
//!
//! ## Template Tree
//!
//! ```text
//! templates/aquarius/          dist/
//! ├── _defaults.yaml           │   (ignored)
//! ├── _base.html               │   (ignored, used via {% extends %})
//! ├── _project.html            │   (ignored, rendered once per project)
//! ├── index.html          →    ├── index.html      (rendered)
//! ├── style.css           →    ├── style.css       (copied)
//! └── fonts/              →    ├── fonts/
//!     └── serif.woff2     →    │   └── serif.woff2 (copied)
//!                              ├── logo.png        (site `logo`, copied)
//!                              └── demo/
//!                                  ├── index.html  (_project.html)
//!                                  └── photo.png   (project_files)
//! ```
//!
//! ## Classification
//!
//! - **Ignored**: name starts with `_`. Ignored directories are pruned with
//!   their whole subtree.
//! - **Directory**: created in the output (idempotent).
//! - **Templated**: extension in the templated set → rendered text.
//! - **Everything else**: byte-copied.
//!
//! The first failure stops generation. Output written so far stays on disk.

use crate::naming::{self, PROJECT_PAGE, PROJECT_TEMPLATE};
use crate::render::{RenderError, Renderer};
use crate::types::{ProjectContext, SiteContext};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Template walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Project '{project}' lists a file outside its directory: {file}")]
    UnsafePath { project: String, file: String },
}

fn io_at(path: &Path) -> impl FnOnce(std::io::Error) -> GenerateError + '_ {
    move |source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Where generation reads from and writes to.
#[derive(Debug, Clone, Copy)]
pub struct SiteLayout<'a> {
    pub template_root: &'a Path,
    pub base_dir: &'a Path,
    pub output_dir: &'a Path,
    /// Normalized extensions (`.html`) of files rendered instead of copied.
    pub templated_extensions: &'a [String],
}

/// What one generation pass produced, as output-relative paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateSummary {
    pub rendered: Vec<String>,
    pub copied: Vec<String>,
    pub logo: Option<String>,
    pub projects: Vec<ProjectSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSummary {
    pub name: String,
    pub page: String,
    pub files: Vec<String>,
}

/// Generate the full output tree for `site`.
pub fn render_site(
    site: &SiteContext,
    renderer: &dyn Renderer,
    layout: &SiteLayout<'_>,
) -> Result<GenerateSummary, GenerateError> {
    fs::create_dir_all(layout.output_dir).map_err(io_at(layout.output_dir))?;

    let mut summary = GenerateSummary::default();
    walk_template_tree(site, renderer, layout, &mut summary)?;
    summary.logo = copy_logo(site, layout)?;

    for project in site.projects.values() {
        summary
            .projects
            .push(render_project(site, project, renderer, layout)?);
    }

    info!(
        rendered = summary.rendered.len(),
        copied = summary.copied.len(),
        projects = summary.projects.len(),
        "generated site"
    );
    Ok(summary)
}

fn walk_template_tree(
    site: &SiteContext,
    renderer: &dyn Renderer,
    layout: &SiteLayout<'_>,
    summary: &mut GenerateSummary,
) -> Result<(), GenerateError> {
    let walker = WalkDir::new(layout.template_root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0 || !naming::is_ignored(&e.file_name().to_string_lossy())
        });

    for entry in walker {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(layout.template_root)
            .unwrap_or(entry.path());
        let dest = layout.output_dir.join(rel);
        let rel_name = naming::slash_path(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(io_at(&dest))?;
        } else if naming::has_extension(entry.path(), layout.templated_extensions) {
            let text = renderer.render(site, None, &rel_name)?;
            fs::write(&dest, text).map_err(io_at(&dest))?;
            debug!(file = %rel_name, "rendered");
            summary.rendered.push(rel_name);
        } else {
            fs::copy(entry.path(), &dest).map_err(io_at(&dest))?;
            debug!(file = %rel_name, "copied");
            summary.copied.push(rel_name);
        }
    }
    Ok(())
}

/// Copy the site logo into the output root, if set and present.
fn copy_logo(
    site: &SiteContext,
    layout: &SiteLayout<'_>,
) -> Result<Option<String>, GenerateError> {
    let Some(logo) = site.logo() else {
        return Ok(None);
    };
    let source = layout.base_dir.join(logo);
    let Some(file_name) = source.file_name().filter(|_| source.is_file()) else {
        warn!(logo, "logo file not found, skipping");
        return Ok(None);
    };
    let dest = layout.output_dir.join(file_name);
    fs::copy(&source, &dest).map_err(io_at(&dest))?;
    Ok(Some(file_name.to_string_lossy().to_string()))
}

fn render_project(
    site: &SiteContext,
    project: &ProjectContext,
    renderer: &dyn Renderer,
    layout: &SiteLayout<'_>,
) -> Result<ProjectSummary, GenerateError> {
    let out_dir = layout.output_dir.join(&project.name);
    fs::create_dir_all(&out_dir).map_err(io_at(&out_dir))?;

    let html = renderer.render(site, Some(project), PROJECT_TEMPLATE)?;
    let page = out_dir.join(PROJECT_PAGE);
    fs::write(&page, html).map_err(io_at(&page))?;

    let source_dir = project.source_dir(layout.base_dir);
    let files = project.project_files();
    for file in &files {
        if !is_contained(Path::new(file)) {
            return Err(GenerateError::UnsafePath {
                project: project.name.clone(),
                file: file.clone(),
            });
        }
        let dest = out_dir.join(file);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(io_at(parent))?;
        }
        let source = source_dir.join(file);
        fs::copy(&source, &dest).map_err(io_at(&source))?;
    }
    debug!(project = %project.name, files = files.len(), "generated project");

    Ok(ProjectSummary {
        name: project.name.clone(),
        page: format!("{}/{}", project.name, PROJECT_PAGE),
        files,
    })
}

/// A relative path that cannot climb out of the directory it is joined to.
fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && path.components().any(|c| matches!(c, Component::Normal(_)))
}
