//! Build orchestration: `build`, `check` and `delete`.
//!
//! ```text
//! build:  ensure output dir → scan (context) → load renderer → generate
//! check:  scan only, nothing written
//! delete: remove the output dir
//! ```
//!
//! Every error is fatal for the current invocation. [`BuildError::kind`]
//! collapses the per-stage error types into the four categories reported to
//! users.

use crate::config::{self, ConfigError, DEFAULT_TEMPLATE};
use crate::generate::{self, GenerateError, GenerateSummary, SiteLayout};
use crate::naming;
use crate::render::{RenderError, TeraRenderer};
use crate::scan::{self, ScanError, ScanOptions};
use crate::types::SiteContext;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Default output directory name, relative to the base directory.
pub const DEFAULT_OUTPUT: &str = "dist";

/// Default set of templated extensions.
pub const DEFAULT_TEMPLATED_EXTENSIONS: &[&str] = &[".html"];

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Output directory not found: {0}")]
    NotFound(PathBuf),
}

/// User-facing error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Io,
    NotFound,
    Render,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Config => "config error",
            ErrorKind::Io => "io error",
            ErrorKind::NotFound => "not found",
            ErrorKind::Render => "render error",
        };
        f.write_str(name)
    }
}

impl BuildError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::Config(_) => ErrorKind::Config,
            BuildError::Scan(err) => match err {
                ScanError::Config(_) | ScanError::DuplicateProject { .. } => ErrorKind::Config,
                ScanError::Io(_) | ScanError::Walk(_) | ScanError::DescriptionFile { .. } => {
                    ErrorKind::Io
                }
            },
            BuildError::Render(err) => render_kind(err),
            BuildError::Generate(err) => match err {
                GenerateError::Render(inner) => render_kind(inner),
                GenerateError::UnsafePath { .. } => ErrorKind::Config,
                GenerateError::Io { .. } | GenerateError::Walk(_) => ErrorKind::Io,
            },
            BuildError::Io { .. } => ErrorKind::Io,
            BuildError::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

fn render_kind(err: &RenderError) -> ErrorKind {
    match err {
        RenderError::Io(_) | RenderError::Walk(_) => ErrorKind::Io,
        RenderError::MissingTemplate(_) | RenderError::Template { .. } => ErrorKind::Render,
    }
}

/// Everything a build needs to know.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub base_dir: PathBuf,
    pub template: String,
    /// Output directory; relative paths resolve against `base_dir`.
    pub output: PathBuf,
    /// Template library holding `defaults.yaml` and one directory per template.
    pub templates_dir: PathBuf,
    pub templated_extensions: Vec<String>,
}

impl BuildOptions {
    /// Options with every default applied.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            template: DEFAULT_TEMPLATE.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            templates_dir: config::bundled_templates_dir(),
            templated_extensions: DEFAULT_TEMPLATED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.base_dir.join(&self.output)
    }

    fn normalized_extensions(&self) -> Vec<String> {
        self.templated_extensions
            .iter()
            .map(|e| naming::normalize_extension(e))
            .collect()
    }
}

/// Result of a successful build.
#[derive(Debug)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    pub context: SiteContext,
    pub summary: GenerateSummary,
}

/// Assemble the site context without writing anything.
pub fn check(options: &BuildOptions) -> Result<SiteContext, BuildError> {
    config::template_root(&options.templates_dir, &options.template)?;
    let output_dir = options.output_dir();
    let context = scan::build_context(&ScanOptions {
        base_dir: &options.base_dir,
        templates_dir: &options.templates_dir,
        template: &options.template,
        exclude: Some(&output_dir),
    })?;
    Ok(context)
}

/// Run the full build.
pub fn build(options: &BuildOptions) -> Result<BuildReport, BuildError> {
    let output_dir = options.output_dir();
    fs::create_dir_all(&output_dir).map_err(|source| BuildError::Io {
        path: output_dir.clone(),
        source,
    })?;
    info!(
        base = %options.base_dir.display(),
        template = %options.template,
        output = %output_dir.display(),
        "building site"
    );

    let context = check(options)?;

    let template_root = config::template_root(&options.templates_dir, &options.template)?;
    let extensions = options.normalized_extensions();
    let renderer = TeraRenderer::load(&template_root, &extensions)?;

    let summary = generate::render_site(
        &context,
        &renderer,
        &SiteLayout {
            template_root: &template_root,
            base_dir: &options.base_dir,
            output_dir: &output_dir,
            templated_extensions: &extensions,
        },
    )?;

    Ok(BuildReport {
        output_dir,
        context,
        summary,
    })
}

/// Remove the output directory tree.
///
/// Fails with [`BuildError::NotFound`] when it does not exist.
pub fn delete(base_dir: &Path, output: &Path) -> Result<(), BuildError> {
    let output_dir = base_dir.join(output);
    if !output_dir.exists() {
        return Err(BuildError::NotFound(output_dir));
    }
    fs::remove_dir_all(&output_dir).map_err(|source| BuildError::Io {
        path: output_dir.clone(),
        source,
    })?;
    info!(output = %output_dir.display(), "deleted output directory");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn options(site: &TempDir, library: &TempDir) -> BuildOptions {
        BuildOptions {
            template: TEST_TEMPLATE.to_string(),
            templates_dir: library.path().to_path_buf(),
            ..BuildOptions::new(site.path())
        }
    }

    fn demo_site() -> TempDir {
        let site = site_dir("title: Home\ndescription: '**bold**'\n");
        write_file(site.path(), "demo/project.yaml", "title: Demo\n");
        write_file(site.path(), "demo/photo.png", "PNG");
        site
    }

    #[test]
    fn defaults_are_applied() {
        let opts = BuildOptions::new("/site");
        assert_eq!(opts.template, DEFAULT_TEMPLATE);
        assert_eq!(opts.output_dir(), Path::new("/site/dist"));
        assert_eq!(opts.templated_extensions, vec![".html"]);
    }

    #[test]
    fn build_end_to_end() {
        let library = template_library();
        let site = demo_site();
        let report = build(&options(&site, &library)).unwrap();

        let dist = site.path().join("dist");
        assert_eq!(report.output_dir, dist);
        let index = read(&dist.join("index.html"));
        assert!(index.contains("<h1>Home</h1>"));
        assert!(index.contains("<strong>bold</strong>"));
        assert!(index.contains(r#"<a href="demo/">Demo</a>"#));

        let page = read(&dist.join("demo/index.html"));
        assert!(page.contains("<h1>Demo</h1>"));
        assert!(page.contains(r#"<img src="photo.png">"#));
        assert_eq!(read(&dist.join("demo/photo.png")), "PNG");

        let demo = find_project(&report.context, "demo");
        assert_eq!(demo.gallery_images(), vec!["photo.png"]);
    }

    #[test]
    fn rebuild_is_byte_identical() {
        let library = template_library();
        let site = demo_site();
        let opts = options(&site, &library);
        let dist = opts.output_dir();

        build(&opts).unwrap();
        let first = tree_snapshot(&dist);
        build(&opts).unwrap();
        let second = tree_snapshot(&dist);

        assert_eq!(first, second);
        // The output dir itself is not mistaken for a project on rebuild
        assert!(!dist.join("dist").exists());
    }

    #[test]
    fn check_writes_nothing() {
        let library = template_library();
        let site = demo_site();
        let ctx = check(&options(&site, &library)).unwrap();

        assert_eq!(ctx.projects.len(), 1);
        assert!(!site.path().join("dist").exists());
    }

    #[test]
    fn unknown_template_is_config_error() {
        let library = template_library();
        let site = demo_site();
        let opts = BuildOptions {
            template: "nope".into(),
            ..options(&site, &library)
        };
        let err = build(&opts).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn undefined_variable_is_render_error() {
        let library = template_library();
        write_file(
            library.path(),
            &format!("{TEST_TEMPLATE}/broken.html"),
            "{{ no_such_field }}",
        );
        let site = demo_site();
        let err = build(&options(&site, &library)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Render);
    }

    #[test]
    fn missing_description_file_is_io_error() {
        let library = template_library();
        let site = site_dir("description_file: gone.md\n");
        let err = build(&options(&site, &library)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn project_pages_render_with_other_templated_extensions() {
        let library = template_library();
        write_file(
            library.path(),
            &format!("{TEST_TEMPLATE}/feed.xml"),
            "<title>{{ title }}</title>",
        );
        let site = demo_site();
        let opts = BuildOptions {
            templated_extensions: vec![".xml".to_string()],
            ..options(&site, &library)
        };
        let report = build(&opts).unwrap();

        let dist = site.path().join("dist");
        assert_eq!(read(&dist.join("feed.xml")), "<title>Home</title>");
        let page = read(&dist.join("demo/index.html"));
        assert!(page.contains("<h1>Demo</h1>"));
        // .html is no longer templated, so the home page is copied as-is
        assert!(read(&dist.join("index.html")).starts_with("{% extends"));
        assert_eq!(report.summary.rendered, vec!["feed.xml"]);
    }

    #[test]
    fn custom_output_directory() {
        let library = template_library();
        let site = demo_site();
        let opts = BuildOptions {
            output: PathBuf::from("public"),
            ..options(&site, &library)
        };
        build(&opts).unwrap();
        assert!(site.path().join("public/index.html").is_file());
    }

    #[test]
    fn delete_removes_output_tree() {
        let library = template_library();
        let site = demo_site();
        build(&options(&site, &library)).unwrap();

        delete(site.path(), Path::new(DEFAULT_OUTPUT)).unwrap();
        assert!(!site.path().join("dist").exists());
        // Inputs untouched
        assert!(site.path().join("demo/photo.png").exists());
    }

    #[test]
    fn delete_missing_output_is_not_found() {
        let site = demo_site();
        let before = tree_listing(site.path());

        let err = delete(site.path(), Path::new(DEFAULT_OUTPUT)).unwrap_err();
        assert!(matches!(err, BuildError::NotFound(_)));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(tree_listing(site.path()), before);
    }
}
