// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Agent invocation
//!
//! [`FileAgent::organize`] validates its inputs, turns the semantics into a
//! task description and hands it to an [`AgentRuntime`] together with the
//! confined [`Toolbox`]. Which file ends up where is the runtime's decision.

pub mod chat;
pub mod prompt;
pub mod tools;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::workspace::Workspace;
use crate::{AppConfig, OrganizerError, Result};

pub use chat::ChatRuntime;
pub use tools::{ToolDefinition, Toolbox};

/// Something that can drive a model through a tool-calling task
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Run `task` to completion and return the final summary text
    async fn run(&self, task: &str, toolbox: &Toolbox) -> Result<String>;
}

/// Organizes a workspace by delegating to an agent runtime
pub struct FileAgent {
    toolbox: Toolbox,
    runtime: Box<dyn AgentRuntime>,
}

impl FileAgent {
    pub fn new(workspace: Workspace, runtime: Box<dyn AgentRuntime>) -> Self {
        Self {
            toolbox: Toolbox::new(workspace),
            runtime,
        }
    }

    /// Build an agent backed by the configured chat endpoint.
    ///
    /// Fails when no API key is available.
    pub fn from_config(config: &AppConfig, workspace_root: &Path) -> Result<Self> {
        let workspace = Workspace::new(workspace_root)?;
        let runtime = ChatRuntime::from_config(&config.api)?;
        Ok(Self::new(workspace, Box::new(runtime)))
    }

    pub fn workspace(&self) -> &Workspace {
        self.toolbox.workspace()
    }

    /// Reorganize `root` according to `semantics` (folder name → description)
    pub async fn organize(&self, root: &Path, semantics: &BTreeMap<String, String>) -> Result<String> {
        validate_semantics(semantics)?;

        let workspace = self.workspace();
        let root_path = workspace.resolve(&root.to_string_lossy())?;
        if !root_path.exists() {
            return Err(OrganizerError::RootNotFound(root_path));
        }
        if !root_path.is_dir() {
            return Err(OrganizerError::NotADirectory(root_path));
        }

        let blob = prompt::semantics_json(semantics)?;
        let relative_root = workspace.relative(&root_path);
        let task = prompt::build_task(&relative_root, &root_path, &blob);

        info!(
            "Organizing '{}' into {} categories with {}",
            relative_root,
            semantics.len(),
            self.runtime.name()
        );

        let summary = self.runtime.run(&task, &self.toolbox).await?;
        info!("Agent finished: {}", summary);
        Ok(summary)
    }
}

fn validate_semantics(semantics: &BTreeMap<String, String>) -> Result<()> {
    if semantics.is_empty() {
        return Err(OrganizerError::InvalidSemantics(
            "semantics must be a non-empty mapping".to_string(),
        ));
    }
    if semantics.keys().any(|k| k.trim().is_empty()) {
        return Err(OrganizerError::InvalidSemantics(
            "semantic folder names must not be blank".to_string(),
        ));
    }
    Ok(())
}
