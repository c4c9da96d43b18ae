//! Installation lookup: where is a script registered?
//!
//! Commands have the project-root placeholder expanded, quotes stripped, and
//! are split on whitespace. A token naming the script's file is compared by
//! canonical path. When the token cannot be resolved (the file does not
//! exist yet), a filename suffix match is accepted and the tier is flagged.

use crate::models::{InstallationRecord, SettingsLayer};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const PROJECT_DIR_VAR: &str = "CLAUDE_PROJECT_DIR";

/// Replace `"$CLAUDE_PROJECT_DIR"`, `'$CLAUDE_PROJECT_DIR'` and the bare form.
pub fn expand_project_dir(command: &str, project_dir: &Path) -> String {
    let dir = project_dir.to_string_lossy();
    let bare = format!("${}", PROJECT_DIR_VAR);
    command
        .replace(&format!("\"{}\"", bare), &dir)
        .replace(&format!("'{}'", bare), &dir)
        .replace(&bare, &dir)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Match {
    Path,
    FileName,
}

fn match_command(command: &str, name: &str, target: &Path, project_dir: &Path) -> Option<Match> {
    let expanded = expand_project_dir(command, project_dir);
    if !expanded.contains(name) {
        return None;
    }
    let cleaned = expanded.replace(['"', '\''], "");
    let mut fallback = None;
    for part in cleaned.split_whitespace().filter(|p| p.contains(name)) {
        let candidate = Path::new(part);
        let candidate = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            project_dir.join(candidate)
        };
        match fs::canonicalize(&candidate) {
            Ok(resolved) if resolved == target => return Some(Match::Path),
            Ok(_) => {}
            Err(_) if part.ends_with(name) => fallback = Some(Match::FileName),
            Err(_) => {}
        }
    }
    fallback
}

/// Cross-reference `script` against every loaded layer's command entries.
pub fn locate(script: &Path, layers: &[SettingsLayer], project_dir: &Path) -> InstallationRecord {
    let mut record = InstallationRecord::default();
    let Some(name) = script.file_name().map(|n| n.to_string_lossy().to_string()) else {
        return record;
    };
    let target = fs::canonicalize(script).unwrap_or_else(|_| script.to_path_buf());
    let mut by_path = BTreeSet::new();
    let mut by_name = BTreeSet::new();

    for layer in layers.iter().filter(|l| l.is_loaded()) {
        for (event, group, command) in layer.commands() {
            let Some(kind) = match_command(command, &name, &target, project_dir) else {
                continue;
            };
            tracing::debug!(tier = %layer.tier, event, command, ?kind, "script registered");
            record.mark(layer.tier);
            record.events.insert(event.to_string());
            if let Some(m) = group.effective_matcher() {
                record.matchers.insert(m.to_string());
            }
            match kind {
                Match::Path => by_path.insert(layer.tier),
                Match::FileName => by_name.insert(layer.tier),
            };
        }
    }
    record.fallback_tiers = by_name.difference(&by_path).copied().collect();
    record
}
