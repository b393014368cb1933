// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Task prompt construction

use std::collections::BTreeMap;
use std::path::Path;

use crate::Result;

/// System message for runtimes that take one
pub const SYSTEM_PROMPT: &str = "You are a careful filesystem assistant. \
    You can only act through the provided tools. \
    Tool results are plain text; read them before deciding the next step.";

/// Serialize semantics deterministically (sorted keys, pretty printed)
pub fn semantics_json(semantics: &BTreeMap<String, String>) -> Result<String> {
    Ok(serde_json::to_string_pretty(semantics)?)
}

/// Build the natural-language task for one organize run
pub fn build_task(relative_root: &str, root_path: &Path, semantics_blob: &str) -> String {
    format!(
        "You are a filesystem organization agent. \
         Your scope is limited to '{relative_root}' (full path: {root}). \
         Inspect the directory, create folders based on the provided semantics, and move \
         files or subdirectories into the correct semantic folder. Use the `ls`, `read_file` \
         and `glob` tools to inspect contents and the `move_file` tool to relocate items.\n\n\
         Guidelines:\n\
         1. Operate strictly inside the scope directory.\n\
         2. Create one folder per semantic key if it does not already exist.\n\
         3. Move each file or subdirectory into the folder whose semantics best match it.\n\
         4. Preserve file contents; do not delete anything.\n\
         5. Provide a concise summary of what you moved when finished.\n\n\
         Semantics JSON:\n\
         {semantics_blob}",
        root = root_path.display(),
    )
}
