//! Template renderer trait and the Tera-backed implementation.
//!
//! The generate stage only needs one operation from a template engine:
//! render a named template file against the site context, optionally with one
//! project bound. [`Renderer`] captures exactly that, so the tree walk can be
//! tested with a recording mock and the engine stays swappable.
//!
//! [`TeraRenderer`] registers every templated file of a template directory
//! under its `/`-separated relative path, including `_`-prefixed layouts and
//! partials. That makes `{% extends "_base.html" %}` and
//! `{% include "_partials/nav.html" %}` work even though those files are never
//! written to the output themselves.
//!
//! Template variables:
//!
//! | Name | Value |
//! |------|-------|
//! | every site field | e.g. `title`, `description`, `logo` |
//! | `projects` | mapping of project name → project fields |
//! | `project` | the current project's fields (`_project.html` only) |
//!
//! Undefined variables are render errors. Use `{% if x %}` or
//! `{{ x | default(value="") }}` for fields that may be absent.

use crate::naming;
use crate::types::{PROJECT, ProjectContext, SiteContext};
use std::path::Path;
use tera::{Context, Tera};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Template directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Template not found: {0}")]
    MissingTemplate(String),
    #[error("Failed to render {template}: {message}")]
    Template { template: String, message: String },
}

impl RenderError {
    /// Flatten a Tera error and its source chain into one message.
    ///
    /// Tera's top-level message is usually just "Failed to render 'x'"; the
    /// useful part (undefined variable, bad filter) sits further down.
    fn from_tera(template: &str, err: &tera::Error) -> Self {
        let mut parts = vec![err.to_string()];
        let mut source = std::error::Error::source(err);
        while let Some(inner) = source {
            parts.push(inner.to_string());
            source = inner.source();
        }
        RenderError::Template {
            template: template.to_string(),
            message: parts.join(": "),
        }
    }
}

/// Renders one template file to text.
pub trait Renderer {
    /// Render `template` (path relative to the template root, `/`-separated).
    ///
    /// `project` is bound as the `project` variable when given. The site
    /// context is never modified, so consecutive calls cannot leak state.
    fn render(
        &self,
        site: &SiteContext,
        project: Option<&ProjectContext>,
        template: &str,
    ) -> Result<String, RenderError>;
}

/// [`Renderer`] backed by a [Tera](https://keats.github.io/tera/) instance.
pub struct TeraRenderer {
    tera: Tera,
}

impl TeraRenderer {
    /// Load every templated file under `template_root`.
    ///
    /// `extensions` must be normalized (`.html`). Ignored files (layouts,
    /// partials, `_project.html`) are also registered when they share the
    /// project template's extension, so project pages render whatever
    /// extensions the generic walk uses.
    pub fn load(template_root: &Path, extensions: &[String]) -> Result<Self, RenderError> {
        let mut ignored_extensions = extensions.to_vec();
        if let Some(key) = naming::extension_key(Path::new(naming::PROJECT_TEMPLATE)) {
            ignored_extensions.push(key);
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(template_root).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(template_root)
                .unwrap_or(entry.path());
            let wanted: &[String] = if naming::has_ignored_component(rel) {
                &ignored_extensions
            } else {
                extensions
            };
            if naming::has_extension(rel, wanted) {
                files.push((entry.path().to_path_buf(), Some(naming::slash_path(rel))));
            }
        }

        let mut tera = Tera::default();
        tera.add_template_files(files)
            .map_err(|e| RenderError::from_tera(&template_root.display().to_string(), &e))?;
        Ok(Self { tera })
    }

    /// Build a renderer from in-memory `(name, source)` pairs.
    pub fn from_sources(templates: &[(&str, &str)]) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates.iter().copied())
            .map_err(|e| RenderError::from_tera("<inline>", &e))?;
        Ok(Self { tera })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }
}

impl Renderer for TeraRenderer {
    fn render(
        &self,
        site: &SiteContext,
        project: Option<&ProjectContext>,
        template: &str,
    ) -> Result<String, RenderError> {
        if !self.has_template(template) {
            return Err(RenderError::MissingTemplate(template.to_string()));
        }
        let mut context =
            Context::from_serialize(site).map_err(|e| RenderError::from_tera(template, &e))?;
        if let Some(project) = project {
            context.insert(PROJECT, project);
        }
        self.tera
            .render(template, &context)
            .map_err(|e| RenderError::from_tera(template, &e))
    }
}
