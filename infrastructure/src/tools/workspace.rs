//! Workspace confinement for the builtin tools
//!
//! Every path a builtin tool touches is resolved against the workspace root
//! and must stay inside it after normalization. Symlinks are followed for
//! the deepest part of the path that already exists.

use std::path::{Component, Path, PathBuf};
use toolgate_domain::tool::value_objects::ToolError;

/// Root directory the builtin tools are confined to
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create a workspace rooted at `root` (canonicalized when it exists)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let absolute = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&root))
                .unwrap_or(root)
        };
        let root = std::fs::canonicalize(&absolute).unwrap_or_else(|_| normalize(&absolute));
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a user-supplied path; escaping the root is `PERMISSION_DENIED`.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, ToolError> {
        let requested = Path::new(path);
        let joined = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            self.root.join(requested)
        };
        let normalized = normalize(&joined);

        match canonicalize_existing(&normalized) {
            Some(effective) if effective.starts_with(&self.root) => Ok(effective),
            _ => Err(outside(path)),
        }
    }

    /// Re-check a path that now exists on disk, e.g. after creating directories.
    pub fn confirm(&self, path: &Path, display: &str) -> Result<(), ToolError> {
        match std::fs::canonicalize(path) {
            Ok(real) if real.starts_with(&self.root) => Ok(()),
            _ => Err(outside(display)),
        }
    }

    /// Path relative to the root, for display
    pub fn display_path(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
            Ok(relative) => relative.display().to_string(),
            Err(_) => path.display().to_string(),
        }
    }
}

fn outside(path: &str) -> ToolError {
    ToolError::permission_denied(format!("{} is outside the workspace", path))
}

/// Canonicalize the deepest existing ancestor and re-append the missing tail.
///
/// Returns `None` when an existing component is a dangling symlink, since
/// creating through it would land wherever it points.
fn canonicalize_existing(path: &Path) -> Option<PathBuf> {
    let mut existing = path;
    let mut tail = Vec::new();
    loop {
        match std::fs::canonicalize(existing) {
            Ok(mut real) => {
                for name in tail.iter().rev() {
                    real.push(name);
                }
                return Some(real);
            }
            Err(_) if std::fs::symlink_metadata(existing).is_ok() => return None,
            Err(_) => match (existing.parent(), existing.file_name()) {
                (Some(parent), Some(name)) => {
                    tail.push(name.to_os_string());
                    existing = parent;
                }
                _ => return Some(path.to_path_buf()),
            },
        }
    }
}

/// Lexically resolve `.` and `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path());

        let resolved = workspace.resolve("notes/today.txt").unwrap();
        assert!(resolved.starts_with(workspace.root()));
        assert!(resolved.ends_with("notes/today.txt"));
    }

    #[test]
    fn test_dot_is_root() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path());

        let resolved = workspace.resolve(".").unwrap();
        assert_eq!(resolved, workspace.root());
        assert_eq!(workspace.display_path(&resolved), ".");
    }

    #[test]
    fn test_parent_escape_is_denied() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path());

        let err = workspace.resolve("../../etc/passwd").unwrap_err();
        assert_eq!(err.code, "PERMISSION_DENIED");
        assert!(err.message.contains("outside the workspace"));
    }

    #[test]
    fn test_absolute_path_outside_is_denied() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("inner"));

        assert!(workspace.resolve("/").is_err());
    }

    #[test]
    fn test_inner_parent_components_are_fine() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path());

        let resolved = workspace.resolve("a/../b.txt").unwrap();
        assert_eq!(workspace.display_path(&resolved), "b.txt");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_is_denied() {
        let outside = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();
        let workspace = Workspace::new(dir.path());

        assert!(workspace.resolve("link/secret.txt").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_through_missing_dirs_is_denied() {
        let outside = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();
        let workspace = Workspace::new(dir.path());

        let err = workspace.resolve("link/newdir/deeper/secret.txt").unwrap_err();
        assert_eq!(err.code, "PERMISSION_DENIED");
        assert!(workspace.resolve("fresh/newdir/file.txt").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_denied() {
        let outside = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path().join("gone"), dir.path().join("link")).unwrap();
        let workspace = Workspace::new(dir.path());

        assert!(workspace.resolve("link").is_err());
        assert!(workspace.resolve("link/file.txt").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_confirm_rejects_paths_that_resolve_outside() {
        let outside = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();
        let workspace = Workspace::new(dir.path());

        assert!(workspace.confirm(dir.path(), ".").is_ok());
        let err = workspace.confirm(&dir.path().join("link"), "link").unwrap_err();
        assert_eq!(err.code, "PERMISSION_DENIED");
    }
}
