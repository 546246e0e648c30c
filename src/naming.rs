//! Centralized filename conventions.
//!
//! Every part of the pipeline that looks at names on disk goes through this
//! module, so the rules stay identical between project scanning and the
//! template walk:
//!
//! - **Ignore marker**: an entry whose name starts with `_` is never copied or
//!   rendered by the generic walk. `_project.html`, `_defaults.yaml` and
//!   layout partials such as `_base.html` rely on this.
//! - **Hidden entries**: names starting with `.` are skipped when listing
//!   project files (`.DS_Store`, editor swap files).
//! - **Extension keys**: extensions are compared as lower-cased, dot-prefixed
//!   strings, e.g. `Photo.PNG` → `".png"`.

use std::path::Path;

/// Prefix marking files and directories excluded from generic traversal.
pub const IGNORE_MARKER: char = '_';

/// Marker file identifying a project directory.
pub const PROJECT_MARKER: &str = "project.yaml";

/// Site configuration file at the base directory.
pub const SITE_CONFIG: &str = "index.yaml";

/// Template file rendered once per project.
pub const PROJECT_TEMPLATE: &str = "_project.html";

/// Site home page at the template root.
pub const SITE_PAGE: &str = "index.html";

/// Page written for each project inside its output directory.
pub const PROJECT_PAGE: &str = "index.html";

/// Whether a file or directory name carries the ignore marker.
pub fn is_ignored(name: &str) -> bool {
    name.starts_with(IGNORE_MARKER)
}

/// Whether a name is a hidden dotfile.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Whether any component of a relative path carries the ignore marker.
pub fn has_ignored_component(rel_path: &Path) -> bool {
    rel_path
        .components()
        .any(|c| is_ignored(&c.as_os_str().to_string_lossy()))
}

/// Normalize a user-written extension to the `.ext` lower-case form.
///
/// - `".PNG"` → `".png"`
/// - `"jpg"` → `".jpg"`
pub fn normalize_extension(ext: &str) -> String {
    let trimmed = ext.trim().to_lowercase();
    if trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{trimmed}")
    }
}

/// Extension key of a path, or `None` when the file has no extension.
pub fn extension_key(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
}

/// Whether `path` has one of the given (already normalized) extensions.
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    extension_key(path).is_some_and(|key| extensions.iter().any(|e| *e == key))
}

/// Render a relative path with `/` separators regardless of platform.
///
/// Template names and `project_files` entries are always slash-separated.
pub fn slash_path(rel_path: &Path) -> String {
    rel_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
