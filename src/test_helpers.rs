//! Shared test utilities for the webloft test suite.
//!
//! Provides throwaway site and template-library trees, context lookups, output
//! tree listings and a recording [`Renderer`] mock.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let library = template_library();
//! let site = site_dir("title: Home\n");
//! write_file(site.path(), "demo/project.yaml", "title: Demo\n");
//!
//! let ctx = build_context(&ScanOptions { .. }).unwrap();
//! let demo = find_project(&ctx, "demo");
//! ```

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::naming;
use crate::render::{RenderError, Renderer};
use crate::types::{ProjectContext, SiteContext};

/// Template name inside [`template_library`].
pub const TEST_TEMPLATE: &str = "basic";

// =========================================================================
// Fixture setup
// =========================================================================

/// Write `content` at `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// A fresh base directory holding only `index.yaml`.
pub fn site_dir(index_yaml: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_file(tmp.path(), "index.yaml", index_yaml);
    tmp
}

/// A template library with global defaults and one template, [`TEST_TEMPLATE`].
///
/// ```text
/// defaults.yaml
/// basic/
///   _base.html           layout, never emitted
///   _partials/nav.html   included by _base.html
///   _project.html        per-project page
///   index.html
///   pages/about.html
///   style.css
///   img/dot.bin
///   assets/              empty
/// ```
///
/// No `_defaults.yaml` is written; tests that need one add it.
pub fn template_library() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_file(
        root,
        "defaults.yaml",
        "site:\n  title: Untitled\n  author: Anonymous\n  description: null\n  logo: null\n\
         project:\n  image_types: [.png, .jpg, .jpeg, .gif]\n",
    );

    let t = |rel: &str| format!("{TEST_TEMPLATE}/{rel}");
    write_file(
        root,
        &t("_base.html"),
        "<!doctype html>\n<html>\n<head><title>{{ title }}</title></head>\n<body>\n\
         {% include \"_partials/nav.html\" %}\n{% block body %}{% endblock body %}\n</body>\n</html>\n",
    );
    write_file(
        root,
        &t("_partials/nav.html"),
        "<nav>{% for name, p in projects %}<a href=\"{{ name }}/\">{{ p.title | default(value=name) }}</a>{% endfor %}</nav>",
    );
    write_file(
        root,
        &t("index.html"),
        "{% extends \"_base.html\" %}{% block body %}<h1>{{ title }}</h1>\n\
         {% if description %}<div>{{ description | safe }}</div>{% endif %}{% endblock body %}",
    );
    write_file(
        root,
        &t("_project.html"),
        "{% extends \"_base.html\" %}{% block body %}<h1>{{ project.title | default(value=\"Untitled\") }}</h1>\n\
         {% for image in project.gallery_images %}<img src=\"{{ image }}\">{% endfor %}{% endblock body %}",
    );
    write_file(
        root,
        &t("pages/about.html"),
        "{% extends \"_base.html\" %}{% block body %}<p>About {{ author }}</p>{% endblock body %}",
    );
    write_file(root, &t("style.css"), "body { margin: 0; }\n");
    write_file(root, &t("img/dot.bin"), "\u{1}\u{2}\u{3}");
    fs::create_dir_all(root.join(t("assets"))).unwrap();
    tmp
}

// =========================================================================
// Context lookups, panicking with a clear message on miss
// =========================================================================

/// Find a project by name. Panics if not found.
pub fn find_project<'a>(ctx: &'a SiteContext, name: &str) -> &'a ProjectContext {
    ctx.projects.get(name).unwrap_or_else(|| {
        let names: Vec<&str> = ctx.projects.keys().map(String::as_str).collect();
        panic!("project '{name}' not found. Available: {names:?}")
    })
}

// =========================================================================
// Output inspection
// =========================================================================

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}

/// Sorted `/`-separated paths of every file under `root`.
pub fn tree_listing(root: &Path) -> Vec<String> {
    tree_snapshot(root).into_iter().map(|(rel, _)| rel).collect()
}

/// Sorted `(path, bytes)` pairs of every file under `root`.
pub fn tree_snapshot(root: &Path) -> Vec<(String, Vec<u8>)> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap();
            (naming::slash_path(rel), fs::read(e.path()).unwrap())
        })
        .collect()
}

// =========================================================================
// Recording renderer
// =========================================================================

/// [`Renderer`] that records every call and renders a fixed line.
///
/// Output is `rendered {template} for {project name | site}`.
#[derive(Default)]
pub struct MockRenderer {
    calls: RefCell<Vec<(String, Option<String>)>>,
    fail_on: Option<String>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that fails when asked to render `template`.
    pub fn failing_on(template: &str) -> Self {
        Self {
            fail_on: Some(template.to_string()),
            ..Self::default()
        }
    }

    /// `(template, project name)` pairs in call order.
    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.borrow().clone()
    }
}

impl Renderer for MockRenderer {
    fn render(
        &self,
        _site: &SiteContext,
        project: Option<&ProjectContext>,
        template: &str,
    ) -> Result<String, RenderError> {
        let name = project.map(|p| p.name.clone());
        self.calls
            .borrow_mut()
            .push((template.to_string(), name.clone()));
        if self.fail_on.as_deref() == Some(template) {
            return Err(RenderError::Template {
                template: template.to_string(),
                message: "mock failure".to_string(),
            });
        }
        Ok(format!(
            "rendered {template} for {}",
            name.as_deref().unwrap_or("site")
        ))
    }
}
