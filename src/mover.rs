// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Confined file and directory moves
//!
//! [`move_path`] returns a proper `Result`; [`render`] flattens it to the
//! single line of text the agent reads.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{MoveError, PathRole};
use crate::workspace::Workspace;

/// A single relocation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveRequest {
    /// File or directory to move
    pub source: String,
    /// Target path, or an existing directory to drop the source into
    pub destination: String,
    /// Replace an existing destination
    #[serde(default)]
    pub overwrite: bool,
    /// Create missing parent directories of the destination
    #[serde(default = "default_true")]
    pub create_missing_dirs: bool,
}

fn default_true() -> bool {
    true
}

impl MoveRequest {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            overwrite: false,
            create_missing_dirs: true,
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn create_missing_dirs(mut self, create: bool) -> Self {
        self.create_missing_dirs = create;
        self
    }
}

/// Completed move, both paths relative to the workspace root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub source: String,
    pub destination: String,
}

impl std::fmt::Display for MoveOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Moved {} -> {}", self.source, self.destination)
    }
}

/// Move a file or directory inside the workspace
pub fn move_path(workspace: &Workspace, request: &MoveRequest) -> Result<MoveOutcome, MoveError> {
    let src = workspace
        .normalize(&request.source)
        .map_err(|_| MoveError::InvalidPath)?;
    let dst = workspace
        .normalize(&request.destination)
        .map_err(|_| MoveError::InvalidPath)?;

    for (role, path, supplied) in [
        (PathRole::Source, &src, &request.source),
        (PathRole::Destination, &dst, &request.destination),
    ] {
        if !workspace.contains(path) {
            return Err(MoveError::OutsideWorkspace {
                role,
                supplied: supplied.clone(),
            });
        }
    }

    if fs::symlink_metadata(&src).is_err() {
        return Err(MoveError::SourceNotFound(workspace.relative(&src)));
    }

    // Directory drop, like `mv file dir/`
    let target = if dst.is_dir() {
        match src.file_name() {
            Some(name) => dst.join(name),
            None => dst,
        }
    } else {
        dst
    };

    if target.starts_with(&src) {
        return Err(MoveError::IntoItself {
            source_path: workspace.relative(&src),
            destination: workspace.relative(&target),
        });
    }

    // Replacing an ancestor would delete the source with it
    if src.starts_with(&target) {
        return Err(MoveError::OntoAncestor {
            source_path: workspace.relative(&src),
            destination: workspace.relative(&target),
        });
    }

    let io_error = |error: std::io::Error| MoveError::Io {
        source_path: workspace.relative(&src),
        destination: workspace.relative(&target),
        error,
    };

    if let Some(parent) = target.parent() {
        if !parent.exists() {
            if request.create_missing_dirs {
                debug!("Creating destination directory {:?}", parent);
                fs::create_dir_all(parent).map_err(io_error)?;
            } else {
                return Err(MoveError::DestinationDirectoryMissing(workspace.relative(parent)));
            }
        }
    }

    if let Ok(meta) = fs::symlink_metadata(&target) {
        if !request.overwrite {
            return Err(MoveError::DestinationExists(workspace.relative(&target)));
        }
        debug!("Overwriting {:?}", target);
        if meta.is_dir() {
            fs::remove_dir_all(&target).map_err(io_error)?;
        } else {
            fs::remove_file(&target).map_err(io_error)?;
        }
    }

    relocate(&src, &target).map_err(io_error)?;

    Ok(MoveOutcome {
        source: workspace.relative(&src),
        destination: workspace.relative(&target),
    })
}

/// Text form of a move for the agent tool boundary
pub fn render(result: &Result<MoveOutcome, MoveError>) -> String {
    match result {
        Ok(outcome) => outcome.to_string(),
        Err(e) => e.to_string(),
    }
}

/// Run a request and log it, returning the tool text
pub fn move_and_render(workspace: &Workspace, request: &MoveRequest) -> String {
    let result = move_path(workspace, request);
    match &result {
        Ok(outcome) => info!("{}", outcome),
        Err(e) => warn!("Move refused: {}", e),
    }
    render(&result)
}

/// Rename, falling back to copy-then-delete across filesystems
fn relocate(src: &Path, dst: &Path) -> std::io::Result<()> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            debug!("Rename crosses devices, copying {:?} -> {:?}", src, dst);
            copy_then_remove(src, dst)
        }
        Err(e) => Err(e),
    }
}

/// Copy `src` to `dst` and delete `src`; a failed copy is removed again
fn copy_then_remove(src: &Path, dst: &Path) -> std::io::Result<()> {
    if let Err(copy_err) = copy_tree(src, dst) {
        if let Err(cleanup_err) = remove_any(dst) {
            warn!("Partial copy left at {:?}: {}", dst, cleanup_err);
        }
        return Err(copy_err);
    }
    remove_any(src)
}

fn copy_tree(src: &Path, dst: &Path) -> std::io::Result<()> {
    let meta = fs::symlink_metadata(src)?;
    if meta.is_dir() {
        fs::create_dir(dst)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            copy_tree(&entry.path(), &dst.join(entry.file_name()))?;
        }
        Ok(())
    } else if meta.file_type().is_symlink() {
        copy_symlink(src, dst)
    } else {
        fs::copy(src, dst).map(|_| ())
    }
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> std::io::Result<()> {
    let target = fs::read_link(src)?;
    std::os::unix::fs::symlink(target, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::copy(src, dst).map(|_| ())
}

fn remove_any(path: &Path) -> std::io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
