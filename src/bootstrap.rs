// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Disposable sample workspace for demos and tests

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::{AppConfig, Result};

/// Directory name of the sample workspace under `workspace.data_dir`
pub const WORKSPACE_DIR_NAME: &str = "agent_workspace";

/// Fixed sample documents, a mix of work and private material
pub const SAMPLE_FILES: &[(&str, &str)] = &[
    (
        "project_plan.md",
        r#"# Project Plan

## Objective
Launch the new client onboarding portal by the end of Q3 while meeting security and compliance requirements.

## Milestones
- Discovery interviews with stakeholders
- Wireframes + UX validation sprint
- Backend API implementation
- Integration testing and security review
- Beta rollout to top 5 customers

## Action Items
- Assign tasks to engineering team
- Track deliverables in Jira
- Prepare executive progress report
"#,
    ),
    (
        "meeting_notes.txt",
        r#"Meeting Notes (Work)

Participants: Product, Finance, Sales Engineering

- Follow up with finance on budget adjustments for cloud spend
- Prepare slide deck covering roadmap risks
- Email client regarding onboarding timeline expectations
- Capture questions about single sign-on support
- Schedule next sync for Tuesday 10am
"#,
    ),
    (
        "holiday_itinerary.txt",
        r#"Holiday Itinerary (Private)

Destination: Lisbon + Cascais

1. Book flights to Lisbon departing July 8, returning July 18
2. Reserve Airbnb near the beach for nights 1-5, boutique hotel in city center for nights 6-10
3. Compile restaurant list (Time Out Market, Cervejaria Ramiro, Ao 26 Vegan)
4. Plan day trips to Sintra and Cascais with train schedules
5. Create packing checklist for camera gear, sunscreen, and adapters
"#,
    ),
    (
        "family_budget.xlsx.txt",
        r#"Family Budget (Private)

Categories:
- Rent / Mortgage
- Utilities (power, water, internet)
- Groceries and household essentials
- Transportation (fuel, metro cards, maintenance)
- Kids activities and daycare
- Savings goals: emergency fund + vacation fund

Notes:
- Review subscription services for potential cuts
- Track monthly spending in spreadsheet tab "2025"
"#,
    ),
    (
        "recipe_book.md",
        r#"# Favorite Recipes (Private)

## Comfort Foods
- Grandma's lasagna with homemade ricotta
- Vegan ramen with miso broth

## Quick Meals
- Chickpea tacos with lime slaw
- 10-minute stir-fry with seasonal veggies

## Drinks & Treats
- Quick breakfast smoothies (banana + spinach + oat milk)
- Cold brew concentrate with vanilla syrup
- Dark chocolate energy bites
"#,
    ),
];

/// Where the sample workspace lives for a given configuration
pub fn default_workspace_dir(config: &AppConfig) -> PathBuf {
    Path::new(&config.workspace.data_dir).join(WORKSPACE_DIR_NAME)
}

/// Wipe `dir` and refill it with the sample documents
pub fn reset_workspace(dir: &Path) -> Result<PathBuf> {
    if dir.exists() {
        debug!("Removing existing workspace {:?}", dir);
        std::fs::remove_dir_all(dir)?;
    }
    std::fs::create_dir_all(dir)?;

    for (name, content) in SAMPLE_FILES {
        let mut text = content.trim().to_string();
        text.push('\n');
        std::fs::write(dir.join(name), text)?;
    }

    info!("Sample workspace ready at {:?} ({} files)", dir, SAMPLE_FILES.len());
    Ok(dir.to_path_buf())
}

/// Two-category taxonomy used by the demo
pub fn demo_semantics() -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "work".to_string(),
            "Documents related to professional projects, planning, clients, or company meetings."
                .to_string(),
        ),
        (
            "private".to_string(),
            "Personal files such as travel plans, recipes, or family finances.".to_string(),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reset_writes_all_samples() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("agent_workspace");

        let created = reset_workspace(&root).unwrap();

        assert_eq!(created, root);
        for (name, _) in SAMPLE_FILES {
            let text = std::fs::read_to_string(root.join(name)).unwrap();
            assert!(text.ends_with('\n'));
            assert!(!text.ends_with("\n\n"));
            assert_eq!(text.trim_end(), text.trim_end_matches('\n'));
        }
    }

    #[test]
    fn test_reset_clears_previous_contents() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("ws");
        std::fs::create_dir_all(root.join("work")).unwrap();
        std::fs::write(root.join("work/stray.txt"), "x").unwrap();

        reset_workspace(&root).unwrap();

        assert!(!root.join("work").exists());
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), SAMPLE_FILES.len());
    }

    #[test]
    fn test_default_dir_follows_config() {
        let mut config = AppConfig::default();
        config.workspace.data_dir = "/srv/tidy".to_string();
        assert_eq!(
            default_workspace_dir(&config),
            Path::new("/srv/tidy").join("agent_workspace")
        );
    }

    #[test]
    fn test_demo_semantics_keys_sorted() {
        let keys: Vec<_> = demo_semantics().into_keys().collect();
        assert_eq!(keys, vec!["private", "work"]);
    }
}
