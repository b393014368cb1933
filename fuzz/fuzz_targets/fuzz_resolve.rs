// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;
use tempfile::TempDir;
use tidyroom::workspace::Workspace;

static WORKSPACE: OnceLock<(TempDir, Workspace)> = OnceLock::new();

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    if input.contains('\0') {
        return;
    }

    let (_dir, ws) = WORKSPACE.get_or_init(|| {
        let dir = TempDir::new().expect("temp dir");
        std::fs::create_dir_all(dir.path().join("a/b")).expect("fixture");
        let ws = Workspace::new(dir.path()).expect("workspace");
        (dir, ws)
    });

    // Anything resolve accepts must sit inside the root
    if let Ok(path) = ws.resolve(input) {
        assert!(path.starts_with(ws.root()));
        assert!(ws.contains(&path));
    }
});
