//! Path utilities shared by the backends.
//!
//! Backend paths are plain strings. Listings always use `/` as separator,
//! regardless of platform, so that a relative path listed on one backend can
//! be appended to a root on another.

use std::path::{Component, Path, PathBuf};

/// Separator used in listed relative paths.
pub const SEPARATOR: char = '/';

/// Append `rel` to `root` with exactly one separator between them.
///
/// An empty `root` yields `rel` unchanged; an empty `rel` yields `root`.
///
/// ```ignore
/// assert_eq!(join_path("/backup/", "a/b.txt"), "/backup/a/b.txt");
/// assert_eq!(join_path("/backup", "/a/b.txt"), "/backup/a/b.txt");
/// ```
pub fn join_path(root: &str, rel: &str) -> String {
    let rel = rel.trim_start_matches(SEPARATOR);
    if root.is_empty() {
        return rel.to_owned();
    }
    if rel.is_empty() {
        return root.to_owned();
    }
    if root.ends_with(SEPARATOR) || root.ends_with('\\') {
        format!("{root}{rel}")
    } else {
        format!("{root}{SEPARATOR}{rel}")
    }
}

/// Strip `root` from `full`, returning the remainder without a leading
/// separator.
///
/// Returns `None` if `full` is not `root` itself or a descendant of it.
pub fn relative_to(root: &str, full: &str) -> Option<String> {
    let root_trimmed = root.trim_end_matches(SEPARATOR);
    let rest = full.strip_prefix(root_trimmed)?;
    if !root_trimmed.is_empty() && !rest.is_empty() && !rest.starts_with(SEPARATOR) {
        // `/srv/ab` is not below `/srv/a`
        return None;
    }
    Some(rest.trim_start_matches(SEPARATOR).to_owned())
}

/// Render a relative local path with `/` separators.
pub fn to_slash(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        if let Component::Normal(part) = component {
            if !out.is_empty() {
                out.push(SEPARATOR);
            }
            out.push_str(&part.to_string_lossy());
        }
    }
    out
}

/// Convert a path to an extended-length path format on Windows.
///
/// Absolute paths like `C:\path` become `\\?\C:\path`, UNC paths like
/// `\\server\share` become `\\?\UNC\server\share`. Relative paths are made
/// absolute against the current directory first.
#[cfg(windows)]
pub fn to_extended_length_path(path: &Path) -> PathBuf {
    let path_str = path.as_os_str().to_string_lossy();
    if path_str.starts_with(r"\\?\") {
        return path.to_path_buf();
    }

    if let Some(without_prefix) = path_str.strip_prefix(r"\\") {
        return PathBuf::from(format!(r"\\?\UNC\{}", without_prefix));
    }

    let absolute_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    // Extended-length paths do not accept forward slashes
    let normalized = absolute_path.to_string_lossy().replace('/', r"\");
    PathBuf::from(format!(r"\\?\{}", normalized))
}

/// Convert a backend path string for use with local file operations.
///
/// On Windows, this converts the path to extended-length format so that
/// deep destination trees do not hit `MAX_PATH`. On other platforms, it
/// returns the path unchanged.
#[cfg(windows)]
pub fn safe_path(path: &str) -> PathBuf {
    to_extended_length_path(Path::new(path))
}

/// Convert a backend path string for use with local file operations.
///
/// On non-Windows platforms, this simply wraps the string.
#[cfg(not(windows))]
pub fn safe_path(path: &str) -> PathBuf {
    PathBuf::from(path)
}
