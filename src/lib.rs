//! # Webloft
//!
//! A small static site generator for project portfolios. A base directory
//! holds a site config and any number of project directories; a template
//! directory describes the output site. Webloft merges the two into a static
//! tree ready for any file server.
//!
//! # Architecture: Scan, Then Generate
//!
//! ```text
//! 1. Scan      index.yaml + */project.yaml  →  SiteContext   (data only)
//! 2. Generate  template tree + SiteContext  →  dist/         (files)
//! ```
//!
//! The scan stage never writes, so `--check` is just the first stage with its
//! result printed. The generate stage never reads user configs, only the
//! assembled [`types::SiteContext`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: discovers projects and assembles the site context |
//! | [`generate`] | Stage 2: mirrors the template tree into the output directory |
//! | [`render`] | `Renderer` trait and the Tera-backed implementation |
//! | [`pipeline`] | `build`, `check` and `delete` entry points plus the error taxonomy |
//! | [`config`] | YAML documents, the defaults cascade and field validation |
//! | [`markdown`] | Markdown rendering for description fields |
//! | [`types`] | `SiteContext`, `ProjectContext` and well-known field names |
//! | [`naming`] | File naming conventions: ignore marker, project marker, extensions |
//! | [`output`] | CLI output formatting for checks and builds |
//!
//! # Design Decisions
//!
//! ## Open Field Sets
//!
//! Site and project configs are free-form YAML mappings. Any field a user
//! writes is visible to templates; only a handful of fields
//! (`image_types`, `project_files`, `description_file`, ...) have meaning to
//! Webloft itself. Templates therefore decide what a site can express, and
//! adding a field never needs a release.
//!
//! ## Defaults Cascade
//!
//! ```text
//! templates/defaults.yaml            ← global defaults
//! templates/<template>/_defaults.yaml ← template overrides (per field)
//! index.yaml / project.yaml          ← user values (per field)
//! ```
//!
//! Merging is shallow: a user list replaces the default list. See
//! [`config::resolve_defaults`] and [`config::overlay`].
//!
//! ## The `_` Marker
//!
//! Any template file or directory whose name starts with `_` is never copied
//! to the output. Layouts, partials and `_project.html` live there, and
//! user project directories starting with `_` are skipped as drafts.

pub mod config;
pub mod generate;
pub mod markdown;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
