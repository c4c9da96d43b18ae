//! Settings layer loading and structural validation.
//!
//! Three tiers are read independently. A missing file is normal (empty
//! layer); malformed JSON invalidates only that layer. Entries are extracted
//! in document order so findings come out in the order a reader sees them.

use crate::locate::expand_project_dir;
use crate::models::{
    EventHooks, EventRegistry, HookEntry, HookGroup, LayerState, SettingsLayer, Tier,
    ValidationReport,
};
use serde_json::Value as Json;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
/// Well-known settings file locations for one project.
pub struct SettingsPaths {
    pub local: PathBuf,
    pub project: PathBuf,
    pub user: PathBuf,
}

impl SettingsPaths {
    /// Paths for `project_dir`; the user file defaults to `~/.claude/settings.json`.
    pub fn for_project(project_dir: &Path, user_override: Option<PathBuf>) -> Self {
        let claude = project_dir.join(".claude");
        let user = user_override.unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_default()
                .join(".claude")
                .join("settings.json")
        });
        Self {
            local: claude.join("settings.local.json"),
            project: claude.join("settings.json"),
            user,
        }
    }

    pub fn path(&self, tier: Tier) -> &Path {
        match tier {
            Tier::Local => &self.local,
            Tier::Project => &self.project,
            Tier::User => &self.user,
        }
    }
}

/// Load one tier's settings file without ever failing the run.
pub fn load_layer(tier: Tier, path: &Path) -> SettingsLayer {
    if !path.exists() {
        tracing::debug!(%tier, path = %path.display(), "settings file absent");
        return SettingsLayer::empty(tier, path.to_path_buf(), LayerState::Missing);
    }
    let text = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            return SettingsLayer::empty(
                tier,
                path.to_path_buf(),
                LayerState::Invalid(format!("Cannot read {}: {}", path.display(), e)),
            )
        }
    };
    let doc: Json = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(%tier, error = %e, "settings file is not valid JSON");
            return SettingsLayer::empty(
                tier,
                path.to_path_buf(),
                LayerState::Invalid(format!("Invalid JSON in {}: {}", path.display(), e)),
            );
        }
    };
    let mut layer = SettingsLayer::empty(tier, path.to_path_buf(), LayerState::Loaded);
    extract_hooks(&doc, &mut layer);
    tracing::debug!(%tier, events = layer.events.len(), "settings layer loaded");
    layer
}

impl SettingsLayer {
    pub fn load(tier: Tier, path: &Path) -> Self {
        load_layer(tier, path)
    }
}

/// Load every tier, narrowest first.
pub fn load_layers(paths: &SettingsPaths) -> Vec<SettingsLayer> {
    Tier::all()
        .into_iter()
        .map(|t| SettingsLayer::load(t, paths.path(t)))
        .collect()
}

fn extract_hooks(doc: &Json, layer: &mut SettingsLayer) {
    let Some(root) = doc.as_object() else {
        layer
            .structure_errors
            .push("Settings root must be a JSON object".into());
        return;
    };
    let hooks = match root.get("hooks") {
        None | Some(Json::Null) => return,
        Some(Json::Object(m)) => m,
        Some(_) => {
            layer
                .structure_errors
                .push("`hooks` must be an object mapping event names to arrays".into());
            return;
        }
    };
    for (event, configs) in hooks {
        let mut groups = Vec::new();
        match configs.as_array() {
            Some(items) => {
                for (i, cfg) in items.iter().enumerate() {
                    match parse_group(cfg) {
                        Ok(g) => groups.push(g),
                        Err(msg) => layer
                            .structure_errors
                            .push(format!("{}[{}]: {}", event, i, msg)),
                    }
                }
            }
            None => layer
                .structure_errors
                .push(format!("{}: expected an array of matcher groups", event)),
        }
        layer.events.push(EventHooks {
            event: event.clone(),
            groups,
        });
    }
}

fn parse_group(cfg: &Json) -> Result<HookGroup, String> {
    let obj = cfg.as_object().ok_or("expected an object")?;
    let matcher = obj.get("matcher").map(|m| match m {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    });
    let hooks = match obj.get("hooks") {
        None => Vec::new(),
        Some(Json::Array(list)) => list.iter().map(parse_entry).collect(),
        Some(_) => return Err("`hooks` must be an array".into()),
    };
    Ok(HookGroup { matcher, hooks })
}

fn parse_entry(entry: &Json) -> HookEntry {
    let text = |key: &str| {
        entry
            .get(key)
            .and_then(Json::as_str)
            .unwrap_or_default()
            .to_string()
    };
    match entry.get("type").map(|t| t.as_str()) {
        None | Some(Some("command")) => HookEntry::Command(text("command")),
        Some(Some("prompt")) => HookEntry::Prompt(text("prompt")),
        Some(Some(other)) => HookEntry::Other(other.to_string()),
        Some(None) => HookEntry::Other(entry["type"].to_string()),
    }
}

/// First `.py`/`.sh` token of an expanded command, resolved against `project_dir`.
fn referenced_script(command: &str, project_dir: &Path) -> Option<PathBuf> {
    let expanded = expand_project_dir(command, project_dir);
    expanded
        .replace(['"', '\''], "")
        .split_whitespace()
        .find(|p| p.ends_with(".py") || p.ends_with(".sh"))
        .map(|p| {
            let p = Path::new(p);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                project_dir.join(p)
            }
        })
}

/// Validate one loaded layer against the event registry.
pub fn validate_layer(
    layer: &SettingsLayer,
    project_dir: &Path,
    registry: &EventRegistry,
) -> ValidationReport {
    let mut result = ValidationReport::new();
    match &layer.state {
        LayerState::Missing => {
            result.info("File not found (no hooks at this level)");
            return result;
        }
        LayerState::Invalid(msg) => {
            result.error(msg.clone());
            return result;
        }
        LayerState::Loaded => result.ok("Valid JSON"),
    }
    for msg in &layer.structure_errors {
        result.error(msg.clone());
    }
    if layer.events.is_empty() {
        if layer.structure_errors.is_empty() {
            result.info("No hooks configured");
        }
        return result;
    }
    result.ok(format!("{} event type(s) configured", layer.events.len()));

    for eh in &layer.events {
        let Some(spec) = registry.get(&eh.event) else {
            result.error(format!("Unknown event type: {}", eh.event));
            continue;
        };
        for (i, group) in eh.groups.iter().enumerate() {
            if group.matcher.is_some() && !spec.has_matcher {
                result.warn(format!(
                    "{}[{}]: Matcher specified but {} doesn't support matchers",
                    eh.event, i, eh.event
                ));
            }
            for (j, hook) in group.hooks.iter().enumerate() {
                let at = format!("{}[{}].hooks[{}]", eh.event, i, j);
                match hook {
                    HookEntry::Command(cmd) if cmd.trim().is_empty() => {
                        result.error(format!("{}: Empty command", at));
                    }
                    HookEntry::Command(cmd) => match referenced_script(cmd, project_dir) {
                        Some(script) if script.exists() => {
                            let name = script
                                .file_name()
                                .map(|n| n.to_string_lossy().to_string())
                                .unwrap_or_default();
                            result.ok(format!("{}: Script exists: {}", eh.event, name));
                            if !is_executable(&script) {
                                result.error(format!(
                                    "{}: Script not executable: {}",
                                    eh.event, name
                                ));
                            }
                        }
                        Some(script) => result.error(format!(
                            "{}: Script not found: {}",
                            eh.event,
                            script.display()
                        )),
                        None => result.warn(format!("{}: Could not identify script in command", at)),
                    },
                    HookEntry::Prompt(p) if p.trim().is_empty() => {
                        result.error(format!("{}: Empty prompt", at));
                    }
                    HookEntry::Prompt(_) => {
                        result.ok(format!("{}: Prompt-based hook configured", eh.event));
                        if !spec.can_block {
                            result.warn(format!(
                                "{}: Prompt hooks on {} cannot block operations",
                                eh.event, eh.event
                            ));
                        }
                    }
                    HookEntry::Other(kind) => {
                        result.warn(format!("{}: Unknown hook type '{}'", at, kind));
                    }
                }
            }
        }
    }
    result
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}
