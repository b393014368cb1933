// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for Tidyroom

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Tidyroom operations
pub type Result<T> = std::result::Result<T, OrganizerError>;

/// Errors raised to program callers (CLI, library users)
#[derive(Error, Debug)]
pub enum OrganizerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Invalid semantics: {0}")]
    InvalidSemantics(String),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("Root path {0} does not exist")]
    RootNotFound(PathBuf),

    #[error("Root path {0} is not a directory")]
    NotADirectory(PathBuf),
}

/// Workspace path resolution failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Invalid path supplied: {0}")]
    InvalidPath(String),

    #[error("Path {0} is outside the workspace")]
    OutsideWorkspace(String),
}

/// Which side of a move a path belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRole {
    Source,
    Destination,
}

impl std::fmt::Display for PathRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathRole::Source => write!(f, "Source"),
            PathRole::Destination => write!(f, "Destination"),
        }
    }
}

/// Move refusals and failures.
///
/// The `Display` output is what the agent reads, so every message names paths
/// either as the caller supplied them or relative to the workspace root.
#[derive(Error, Debug)]
pub enum MoveError {
    #[error("Invalid path supplied.")]
    InvalidPath,

    #[error("{role} path {supplied} is outside the workspace.")]
    OutsideWorkspace { role: PathRole, supplied: String },

    #[error("Source path {0} does not exist.")]
    SourceNotFound(String),

    #[error("Destination directory {0} does not exist.")]
    DestinationDirectoryMissing(String),

    #[error("Destination {0} already exists.")]
    DestinationExists(String),

    #[error("Cannot move {source_path} into itself ({destination}).")]
    IntoItself {
        source_path: String,
        destination: String,
    },

    #[error("Cannot move {source_path} onto {destination}, which contains it.")]
    OntoAncestor {
        source_path: String,
        destination: String,
    },

    #[error("Failed to move {source_path} -> {destination}: {error}")]
    Io {
        source_path: String,
        destination: String,
        #[source]
        error: std::io::Error,
    },
}
