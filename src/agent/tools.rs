// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Tools exposed to the agent runtime
//!
//! Every tool answers in plain text, including failures, because the caller
//! is a model reading the transcript. `move_file` is the only one that writes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Component, Path};
use tracing::debug;

use crate::mover::{self, MoveRequest};
use crate::workspace::Workspace;

/// Default number of lines returned by `read_file`
const DEFAULT_READ_LIMIT: usize = 200;
/// Longest line `read_file` returns before truncating
const MAX_LINE_CHARS: usize = 2000;
/// Cap on `glob` matches
const MAX_GLOB_MATCHES: usize = 500;

/// Function-calling descriptor sent to the model
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

#[derive(Deserialize)]
struct LsArgs {
    #[serde(default = "default_dir")]
    path: String,
}

#[derive(Deserialize)]
struct ReadFileArgs {
    path: String,
    #[serde(default)]
    offset: usize,
    #[serde(default = "default_read_limit")]
    limit: usize,
}

#[derive(Deserialize)]
struct GlobArgs {
    pattern: String,
}

fn default_dir() -> String { ".".to_string() }
fn default_read_limit() -> usize { DEFAULT_READ_LIMIT }

/// The confined tool set handed to an agent runtime
#[derive(Debug, Clone)]
pub struct Toolbox {
    workspace: Workspace,
}

impl Toolbox {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Tool descriptors in JSON-schema form
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: "ls",
                description: "List the entries of a directory inside the workspace. \
                              Directories are shown with a trailing '/'.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "path": {
                            "type": "string",
                            "description": "Directory to list, relative to the workspace root",
                            "default": "."
                        }
                    }
                }),
            },
            ToolDefinition {
                name: "read_file",
                description: "Read a text file inside the workspace. Lines are numbered.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "path": {"type": "string", "description": "File to read"},
                        "offset": {"type": "integer", "description": "First line (0-based)", "default": 0},
                        "limit": {"type": "integer", "description": "Maximum lines", "default": DEFAULT_READ_LIMIT}
                    },
                    "required": ["path"]
                }),
            },
            ToolDefinition {
                name: "glob",
                description: "Find workspace paths matching a glob pattern such as '**/*.md'.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "pattern": {"type": "string", "description": "Pattern relative to the workspace root"}
                    },
                    "required": ["pattern"]
                }),
            },
            ToolDefinition {
                name: "move_file",
                description: "Move a file or directory to a new destination within the workspace. \
                              If the destination is an existing directory the source is moved into it.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "source": {"type": "string", "description": "Path to the file or directory to move"},
                        "destination": {"type": "string", "description": "Destination path or directory"},
                        "overwrite": {"type": "boolean", "description": "Replace an existing destination", "default": false},
                        "create_missing_dirs": {"type": "boolean", "description": "Create destination parents if they don't exist", "default": true}
                    },
                    "required": ["source", "destination"]
                }),
            },
        ]
    }

    /// Dispatch a tool call and return its text result
    pub fn call(&self, name: &str, args: &Value) -> String {
        debug!("Tool call {} {}", name, args);
        match name {
            "ls" => match parse::<LsArgs>(name, args) {
                Ok(a) => self.ls(&a.path),
                Err(msg) => msg,
            },
            "read_file" => match parse::<ReadFileArgs>(name, args) {
                Ok(a) => self.read_file(&a.path, a.offset, a.limit),
                Err(msg) => msg,
            },
            "glob" => match parse::<GlobArgs>(name, args) {
                Ok(a) => self.glob(&a.pattern),
                Err(msg) => msg,
            },
            "move_file" => match parse::<MoveRequest>(name, args) {
                Ok(request) => mover::move_and_render(&self.workspace, &request),
                Err(msg) => msg,
            },
            other => format!("Unknown tool '{}'.", other),
        }
    }

    fn ls(&self, path: &str) -> String {
        let dir = match self.workspace.resolve(path) {
            Ok(dir) => dir,
            Err(e) => return e.to_string(),
        };
        if !dir.is_dir() {
            return format!("{} is not a directory.", self.workspace.relative(&dir));
        }

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => return format!("Cannot list {}: {}", self.workspace.relative(&dir), e),
        };

        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| {
                let rel = self.workspace.relative(&dir.join(e.file_name()));
                if e.path().is_dir() {
                    format!("{}/", rel)
                } else {
                    rel
                }
            })
            .collect();
        names.sort();

        if names.is_empty() {
            format!("{} is empty.", self.workspace.relative(&dir))
        } else {
            names.join("\n")
        }
    }

    fn read_file(&self, path: &str, offset: usize, limit: usize) -> String {
        let file = match self.workspace.resolve(path) {
            Ok(file) => file,
            Err(e) => return e.to_string(),
        };
        let rel = self.workspace.relative(&file);
        if !file.is_file() {
            return format!("{} is not a file.", rel);
        }

        let reader = match File::open(&file) {
            Ok(f) => BufReader::new(f),
            Err(e) => return format!("Cannot read {}: {}", rel, e),
        };

        let mut lines = Vec::new();
        for (i, line) in reader.lines().enumerate().skip(offset).take(limit) {
            let line = match line {
                Ok(line) => line,
                Err(e) => return format!("Cannot read {}: {}", rel, e),
            };
            let line: String = line.chars().take(MAX_LINE_CHARS).collect();
            lines.push(format!("{:>6}\t{}", i + 1, line));
        }

        if lines.is_empty() {
            format!("{} has no lines from offset {}.", rel, offset)
        } else {
            lines.join("\n")
        }
    }

    fn glob(&self, pattern: &str) -> String {
        if Path::new(pattern).is_absolute() {
            return "Glob patterns must be relative to the workspace.".to_string();
        }
        if Path::new(pattern).components().any(|c| c == Component::ParentDir) {
            return "Glob patterns must stay inside the workspace.".to_string();
        }

        let root = glob::Pattern::escape(&self.workspace.root().to_string_lossy());
        let full = format!("{}/{}", root, pattern);
        let paths = match glob::glob(&full) {
            Ok(paths) => paths,
            Err(e) => return format!("Invalid glob pattern: {}", e),
        };

        let mut matches: Vec<String> = paths
            .filter_map(|p| p.ok())
            .filter_map(|p| self.workspace.resolve(&p.to_string_lossy()).ok())
            .map(|p| self.workspace.relative(&p))
            .take(MAX_GLOB_MATCHES)
            .collect();
        matches.sort();
        matches.dedup();

        if matches.is_empty() {
            format!("No paths match {}.", pattern)
        } else {
            matches.join("\n")
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(tool: &str, args: &Value) -> Result<T, String> {
    serde_json::from_value(args.clone())
        .map_err(|e| format!("Invalid arguments for {}: {}", tool, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn toolbox() -> (TempDir, Toolbox) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "one\ntwo\nthree\n").unwrap();
        fs::create_dir(dir.path().join("a_dir")).unwrap();
        fs::write(dir.path().join("a_dir/inner.md"), "# inner").unwrap();
        let tools = Toolbox::new(Workspace::new(dir.path()).unwrap());
        (dir, tools)
    }

    #[test]
    fn test_definitions_cover_all_tools() {
        let (_dir, tools) = toolbox();
        let names: Vec<_> = tools.definitions().iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["ls", "read_file", "glob", "move_file"]);
    }

    #[test]
    fn test_ls_lists_relative_entries() {
        let (_dir, tools) = toolbox();
        assert_eq!(tools.call("ls", &json!({})), "a_dir/\nb.txt");
    }

    #[test]
    fn test_ls_outside_is_refused() {
        let (_dir, tools) = toolbox();
        let text = tools.call("ls", &json!({"path": ".."}));
        assert!(text.contains("outside the workspace"));
    }

    #[test]
    fn test_read_file_with_window() {
        let (_dir, tools) = toolbox();
        let text = tools.call("read_file", &json!({"path": "b.txt", "offset": 1, "limit": 1}));
        assert_eq!(text, "     2\ttwo");
    }

    #[test]
    fn test_read_file_outside_is_refused() {
        let (dir, tools) = toolbox();
        let outside = dir.path().parent().unwrap().join("passwd");
        let text = tools.call("read_file", &json!({"path": outside.to_string_lossy()}));
        assert!(text.contains("outside the workspace"));
    }

    #[test]
    fn test_glob_matches_nested() {
        let (_dir, tools) = toolbox();
        let text = tools.call("glob", &json!({"pattern": "**/*.md"}));
        assert_eq!(text, Path::new("a_dir").join("inner.md").display().to_string());
    }

    #[test]
    fn test_glob_cannot_escape() {
        let (_dir, tools) = toolbox();
        assert_eq!(
            tools.call("glob", &json!({"pattern": "../*"})),
            "Glob patterns must stay inside the workspace."
        );
        assert_eq!(
            tools.call("glob", &json!({"pattern": "a_dir/../../*"})),
            "Glob patterns must stay inside the workspace."
        );
        assert_eq!(tools.call("glob", &json!({"pattern": "*.pdf"})), "No paths match *.pdf.");
    }

    #[test]
    fn test_read_file_streams_past_offset() {
        let (dir, tools) = toolbox();
        let body: String = (1..=5000).map(|i| format!("line {}\n", i)).collect();
        fs::write(dir.path().join("big.txt"), body).unwrap();

        let text = tools.call("read_file", &json!({"path": "big.txt", "offset": 4998, "limit": 10}));
        assert_eq!(text, "  4999\tline 4999\n  5000\tline 5000");
        assert_eq!(
            tools.call("read_file", &json!({"path": "big.txt", "offset": 9000})),
            "big.txt has no lines from offset 9000."
        );
    }

    #[test]
    fn test_move_file_uses_defaults() {
        let (dir, tools) = toolbox();
        let text = tools.call("move_file", &json!({"source": "b.txt", "destination": "a_dir"}));
        assert!(text.starts_with("Moved b.txt -> "));
        assert!(dir.path().join("a_dir/b.txt").exists());
    }

    #[test]
    fn test_bad_arguments_and_unknown_tool() {
        let (_dir, tools) = toolbox();
        assert!(tools
            .call("move_file", &json!({"source": "b.txt"}))
            .starts_with("Invalid arguments for move_file"));
        assert_eq!(tools.call("rm", &json!({})), "Unknown tool 'rm'.");
    }
}
