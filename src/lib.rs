// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Tidyroom: LLM-driven workspace organizer
//!
//! An external model decides where files belong; this crate confines what it
//! can touch. Every path goes through [`workspace::Workspace`], and the only
//! mutating tool is [`mover::move_path`].

pub mod agent;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod mover;
pub mod workspace;

pub use config::AppConfig;
pub use error::{MoveError, OrganizerError, PathError, Result};
