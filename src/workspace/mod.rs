// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Workspace confinement
//!
//! Every path the agent hands us goes through [`Workspace::resolve`] (or the
//! two halves, [`Workspace::normalize`] and [`Workspace::contains`]) before
//! anything touches the disk. The root is canonicalized once and never changes.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::error::PathError;
use crate::{OrganizerError, Result};

/// A directory tree all operations are confined to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Open a workspace rooted at an existing directory
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let canonical = match std::fs::canonicalize(root) {
            Ok(path) => path,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(OrganizerError::RootNotFound(root.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };

        if !canonical.is_dir() {
            return Err(OrganizerError::NotADirectory(canonical));
        }

        Ok(Self { root: canonical })
    }

    /// Canonical absolute root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Turn a user- or agent-supplied string into a canonical absolute path.
    ///
    /// Relative inputs are joined under the root, a leading `~` expands to the
    /// home directory, symlinks and `.`/`..` are resolved. The path does not
    /// have to exist. No confinement check happens here.
    pub fn normalize(&self, path_str: &str) -> std::result::Result<PathBuf, PathError> {
        let expanded = expand_home(path_str)?;
        let candidate = if expanded.is_absolute() {
            expanded
        } else {
            self.root.join(expanded)
        };

        canonicalize_partial(&candidate).map_err(|e| {
            debug!("Rejected path {:?}: {}", path_str, e);
            PathError::InvalidPath(path_str.to_string())
        })
    }

    /// Whether a normalized path lies inside (or is) the root.
    ///
    /// Component-wise, so `/ws2` is not inside `/ws`.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }

    /// Normalize and confine in one step
    pub fn resolve(&self, path_str: &str) -> std::result::Result<PathBuf, PathError> {
        let resolved = self.normalize(path_str)?;
        if !self.contains(&resolved) {
            debug!("Path {:?} escapes workspace", path_str);
            return Err(PathError::OutsideWorkspace(path_str.to_string()));
        }
        Ok(resolved)
    }

    /// Render a confined path relative to the root (`.` for the root itself)
    pub fn relative(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
            Ok(rel) => rel.display().to_string(),
            // Never echo absolute locations outside the sandbox
            Err(_) => "<outside workspace>".to_string(),
        }
    }
}

fn expand_home(path_str: &str) -> std::result::Result<PathBuf, PathError> {
    let rest = if path_str == "~" {
        Some("")
    } else {
        path_str
            .strip_prefix("~/")
            .or_else(|| path_str.strip_prefix("~\\"))
    };

    match rest {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| PathError::InvalidPath(path_str.to_string()))?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path_str)),
    }
}

/// Resolve symlinks for the part of `path` that exists and apply the rest
/// lexically.
fn canonicalize_partial(path: &Path) -> std::io::Result<PathBuf> {
    let mut resolved = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(part) => {
                resolved.push(part);
                match std::fs::canonicalize(&resolved) {
                    Ok(real) => resolved = real,
                    Err(e) if e.kind() == ErrorKind::NotFound => {
                        // A link that points nowhere cannot be followed safely
                        if std::fs::symlink_metadata(&resolved)
                            .map(|m| m.file_type().is_symlink())
                            .unwrap_or(false)
                        {
                            return Err(std::io::Error::new(
                                ErrorKind::NotFound,
                                "dangling symlink",
                            ));
                        }
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Workspace) {
        let dir = TempDir::new().unwrap();
        let ws = Workspace::new(dir.path()).unwrap();
        (dir, ws)
    }

    #[test]
    fn test_relative_paths_resolve_under_root() {
        let (_dir, ws) = workspace();
        fs::write(ws.root().join("a.txt"), "a").unwrap();

        assert_eq!(ws.resolve("a.txt").unwrap(), ws.root().join("a.txt"));
        assert_eq!(ws.resolve("./sub/../a.txt").unwrap(), ws.root().join("a.txt"));
        assert_eq!(ws.resolve("").unwrap(), ws.root());
    }

    #[test]
    fn test_nonexistent_paths_are_allowed() {
        let (_dir, ws) = workspace();
        let resolved = ws.resolve("new/dir/file.md").unwrap();
        assert_eq!(resolved, ws.root().join("new").join("dir").join("file.md"));
    }

    #[test]
    fn test_absolute_path_inside_root() {
        let (_dir, ws) = workspace();
        let abs = ws.root().join("x.txt");
        assert_eq!(ws.resolve(abs.to_str().unwrap()).unwrap(), abs);
    }

    #[test]
    fn test_parent_escape_is_outside() {
        let (_dir, ws) = workspace();
        assert_eq!(
            ws.resolve("../outside.txt"),
            Err(PathError::OutsideWorkspace("../outside.txt".to_string()))
        );
        assert!(matches!(
            ws.resolve("a/../../b"),
            Err(PathError::OutsideWorkspace(_))
        ));
    }

    #[test]
    fn test_absolute_path_elsewhere_is_outside() {
        let (_dir, ws) = workspace();
        let other = TempDir::new().unwrap();
        let path = other.path().join("f.txt");
        assert!(matches!(
            ws.resolve(path.to_str().unwrap()),
            Err(PathError::OutsideWorkspace(_))
        ));
    }

    #[test]
    fn test_sibling_with_shared_prefix_is_outside() {
        let parent = TempDir::new().unwrap();
        fs::create_dir(parent.path().join("ws")).unwrap();
        fs::create_dir(parent.path().join("ws2")).unwrap();
        let ws = Workspace::new(parent.path().join("ws")).unwrap();

        let sibling = ws.root().parent().unwrap().join("ws2").join("f.txt");
        assert!(!ws.contains(&sibling));
        assert!(matches!(
            ws.resolve(sibling.to_str().unwrap()),
            Err(PathError::OutsideWorkspace(_))
        ));
    }

    #[test]
    fn test_home_expansion_leaves_workspace() {
        let (_dir, ws) = workspace();
        if dirs::home_dir().is_some() {
            assert!(ws.resolve("~/notes.txt").is_err());
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_is_outside() {
        let (_dir, ws) = workspace();
        let other = TempDir::new().unwrap();
        std::os::unix::fs::symlink(other.path(), ws.root().join("link")).unwrap();

        assert!(matches!(
            ws.resolve("link/secret.txt"),
            Err(PathError::OutsideWorkspace(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_invalid() {
        let (_dir, ws) = workspace();
        std::os::unix::fs::symlink(ws.root().join("nowhere"), ws.root().join("dangling")).unwrap();

        assert!(matches!(
            ws.normalize("dangling"),
            Err(PathError::InvalidPath(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_as_intermediate_is_invalid() {
        let (_dir, ws) = workspace();
        fs::write(ws.root().join("plain.txt"), "x").unwrap();
        assert!(matches!(
            ws.normalize("plain.txt/child"),
            Err(PathError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_relative_rendering() {
        let (_dir, ws) = workspace();
        assert_eq!(ws.relative(ws.root()), ".");
        assert_eq!(
            ws.relative(&ws.root().join("archive").join("a.txt")),
            Path::new("archive").join("a.txt").display().to_string()
        );
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Workspace::new(dir.path().join("missing")),
            Err(OrganizerError::RootNotFound(_))
        ));
    }
}
