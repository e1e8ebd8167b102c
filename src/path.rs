//! Path arithmetic between a suite file and its member test files.
//!
//! Suite files store member paths relative to the suite's own directory, always with
//! `/` separators, so a suite written on one platform opens on another.

use std::{
    borrow::Cow,
    io,
    path::{Component, Path, PathBuf},
};

/// Splits a path into its ordered segments.
///
/// The root is kept as a leading `"/"` segment and a Windows prefix (`C:`, `\\server\share`)
/// as its own segment, so two paths only share a prefix when they share a root.
pub fn split_path(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|component| match component {
            Component::Prefix(prefix) => Some(prefix.as_os_str().to_string_lossy().into_owned()),
            Component::RootDir => Some("/".to_string()),
            Component::CurDir => None,
            Component::ParentDir => Some("..".to_string()),
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
        })
        .collect()
}

/// Computes the `/`-joined path leading from directory `from_dir` to `to`.
///
/// Paths on different roots have no relative form; the target comes back as an
/// absolute path with forward slashes.
pub fn relative_path(from_dir: &Path, to: &Path) -> String {
    let from = split_path(from_dir);
    let target = split_path(to);

    let base = from
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    if base == 0 && (from_dir.has_root() || to.has_root()) {
        return to.to_string_lossy().replace('\\', "/");
    }

    let mut result: Vec<&str> = Vec::with_capacity(from.len() - base + target.len() - base);
    result.extend(std::iter::repeat("..").take(from.len() - base));
    result.extend(target[base..].iter().map(String::as_str));
    result.join("/")
}

/// Computes the path of `to` relative to the directory containing `suite_file`.
pub fn suite_relative_path(suite_file: &Path, to: &Path) -> String {
    let dir = suite_file.parent().unwrap_or_else(|| Path::new(""));
    relative_path(dir, to)
}

/// Resolves a stored, suite-relative filename against the suite's directory.
pub fn resolve_relative(base_dir: &Path, filename: &str) -> PathBuf {
    let filename: Cow<'_, str> = if cfg!(windows) {
        Cow::Owned(filename.replace('/', "\\"))
    } else {
        Cow::Borrowed(filename)
    };
    base_dir.join(filename.as_ref())
}

/// Anchors a relative path at the working directory and folds `.` and `..` segments
/// lexically, without touching the filesystem.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}
