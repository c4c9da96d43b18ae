//! Report composition for scripts, settings layers, and whole projects.
//!
//! Every unit gets its own `ValidationReport`; project runs compose them
//! without merging, and the verdict is the AND of all parts.

use crate::inspect::{check_script, inspect, Interpreter};
use crate::locate::locate;
use crate::models::{
    EventRegistry, LayerReport, ProjectReport, SamplePayloads, ScriptReport, SettingsLayer,
    ValidationReport,
};
use crate::probe::{probe, record_probe};
use crate::settings::{load_layers, validate_layer, SettingsPaths};
use glob::glob;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Interpreters {
    pub python: String,
    pub shell: String,
}

impl Default for Interpreters {
    fn default() -> Self {
        Self {
            python: "python3".into(),
            shell: "bash".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeOptions {
    pub enabled: bool,
    pub timeout: Duration,
    pub syntax_timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: Duration::from_secs(10),
            syntax_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
/// Read-only inputs shared by every check in one run.
pub struct ValidationContext {
    pub project_dir: PathBuf,
    pub settings: SettingsPaths,
    pub hooks_dir: PathBuf,
    pub registry: EventRegistry,
    pub samples: SamplePayloads,
    pub interpreters: Interpreters,
    pub probe: ProbeOptions,
}

impl ValidationContext {
    pub fn new(project_dir: PathBuf, settings: SettingsPaths, hooks_dir: PathBuf) -> Self {
        Self {
            project_dir,
            settings,
            hooks_dir,
            registry: EventRegistry::builtin(),
            samples: SamplePayloads::builtin(),
            interpreters: Interpreters::default(),
            probe: ProbeOptions::default(),
        }
    }

    /// Context rooted at `dir` that never touches the real user settings.
    #[cfg(test)]
    pub fn for_tests(dir: &Path) -> Self {
        let root = std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        let settings = SettingsPaths::for_project(&root, Some(root.join(".user/settings.json")));
        let hooks_dir = root.join(".claude/hooks");
        Self::new(root, settings, hooks_dir)
    }
}

/// Validate one script: static checks, runtime probe, then installation.
pub fn validate_script(
    path: &Path,
    event_override: Option<&str>,
    layers: &[SettingsLayer],
    ctx: &ValidationContext,
) -> ValidationReport {
    let _span = tracing::debug_span!("validate_script", path = %path.display()).entered();
    let mut report = ValidationReport::new();
    let script = match inspect(path) {
        Ok(s) => s,
        Err(e) => {
            report.error(e.to_string());
            return report;
        }
    };
    report.ok(format!("Script exists: {}", script.file_name()));

    let facts = check_script(&script, event_override, ctx, &mut report);
    if !facts.syntax_ok {
        return report;
    }

    if let Some(event) = facts.event.as_deref() {
        if !ctx.probe.enabled {
            report.info("Runtime test disabled");
        } else if script.interpreter == Interpreter::Unknown {
            report.warn("Runtime test skipped (unknown interpreter)");
        } else {
            record_probe(probe(&script, event, ctx), event, &mut report);
        }
    }

    let installation = locate(&script.path, layers, &ctx.project_dir);
    for tier in &installation.fallback_tiers {
        report.warn(format!(
            "{} settings matched by filename only; the referenced path does not exist",
            tier.as_str().to_uppercase()
        ));
    }
    report.installation = Some(installation);
    report
}

/// Validate every settings tier independently.
pub fn validate_settings(layers: &[SettingsLayer], ctx: &ValidationContext) -> Vec<LayerReport> {
    layers
        .iter()
        .map(|layer| LayerReport {
            tier: layer.tier,
            path: layer.path.clone(),
            exists: layer.path.exists(),
            report: validate_layer(layer, &ctx.project_dir, &ctx.registry),
        })
        .collect()
}

/// Hook scripts in `hooks_dir`: `.py`/`.sh` files or names starting with `hook`.
pub fn discover_hooks(hooks_dir: &Path) -> Vec<PathBuf> {
    let pattern = hooks_dir.join("*").to_string_lossy().to_string();
    let Ok(entries) = glob(&pattern) else {
        tracing::warn!(pattern = %pattern, "invalid hooks directory pattern");
        return Vec::new();
    };
    let mut hooks: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|p| p.is_file())
        .filter(|p| {
            let ext_ok = matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("py") | Some("sh")
            );
            let name_ok = p
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("hook"));
            ext_ok || name_ok
        })
        .collect();
    hooks.sort();
    hooks
}

/// Validate many scripts in parallel; results come back sorted by path.
pub fn validate_scripts(
    scripts: &[PathBuf],
    event_override: Option<&str>,
    layers: &[SettingsLayer],
    ctx: &ValidationContext,
) -> Vec<ScriptReport> {
    let mut reports: Vec<ScriptReport> = scripts
        .par_iter()
        .map(|path| ScriptReport {
            path: path.clone(),
            report: validate_script(path, event_override, layers, ctx),
        })
        .collect();
    reports.sort_by(|a, b| a.path.cmp(&b.path));
    reports
}

/// Full project run: every settings tier plus every discovered script.
pub fn validate_project(ctx: &ValidationContext) -> ProjectReport {
    let layers = load_layers(&ctx.settings);
    let settings = validate_settings(&layers, ctx);
    let scripts = discover_hooks(&ctx.hooks_dir);
    tracing::info!(
        project = %ctx.project_dir.display(),
        scripts = scripts.len(),
        "validating project"
    );
    ProjectReport {
        project_dir: ctx.project_dir.clone(),
        settings,
        scripts: validate_scripts(&scripts, None, &layers, ctx),
    }
}
