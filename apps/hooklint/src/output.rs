//! Output rendering for script, settings, and project reports.
//!
//! Supports `human` (default) and `json` outputs. The JSON form mirrors the
//! report models and adds a `status`/`success` summary per unit.

use crate::models::{
    Finding, InstallationRecord, LayerReport, Level, ProjectReport, ReportStatus, ScriptReport,
    Tier, ValidationReport,
};
use crate::utils::display_path;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::path::Path;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn paint(text: &str, color: bool, style: fn(&str) -> String) -> String {
    if color {
        style(text)
    } else {
        text.to_string()
    }
}

fn print_json(value: &JsonVal) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("{} {}", crate::utils::error_prefix(), e),
    }
}

fn finding_line(f: &Finding, color: bool) -> String {
    let (icon, text) = match f.level {
        Level::Ok => ("✅", paint(&f.message, color, |s| s.green().to_string())),
        Level::Info => ("ℹ️ ", f.message.clone()),
        Level::Warn => ("⚠️ ", paint(&f.message, color, |s| s.yellow().to_string())),
        Level::Error => ("❌", paint(&f.message, color, |s| s.red().to_string())),
    };
    format!("  {} {}", icon, text)
}

/// One-line verdict for a unit report.
pub fn status_line(report: &ValidationReport) -> String {
    match report.status() {
        ReportStatus::Passed => format!(
            "PASSED ({} checks, {} warnings)",
            report.passed.len(),
            report.warnings.len()
        ),
        ReportStatus::ValidNotInstalled => "SCRIPT VALID but NOT INSTALLED".to_string(),
        ReportStatus::Failed => format!(
            "FAILED ({} errors, {} warnings)",
            report.errors.len(),
            report.warnings.len()
        ),
    }
}

fn print_findings(report: &ValidationReport, color: bool) {
    for f in report.passed.iter().chain(&report.warnings).chain(&report.errors) {
        println!("{}", finding_line(f, color));
    }
}

fn print_installation(inst: &InstallationRecord, color: bool) {
    println!();
    println!("{}", paint("Installation:", color, |s| s.bold().to_string()));
    for tier in Tier::all() {
        let mark = if inst.registered_in(tier) {
            paint("✅ registered", color, |s| s.green().to_string())
        } else {
            paint("❌ not registered", color, |s| s.bright_black().to_string())
        };
        println!("  {}: {}", tier.label(), mark);
    }
    println!("  Scope: {}", inst.scope().description());
    if !inst.events.is_empty() {
        let events: Vec<&str> = inst.events.iter().map(String::as_str).collect();
        println!("  Events: {}", events.join(", "));
    }
    if !inst.matchers.is_empty() {
        let matchers: Vec<&str> = inst.matchers.iter().map(String::as_str).collect();
        println!("  Matchers: {}", matchers.join(", "));
    }
    for tier in &inst.fallback_tiers {
        println!(
            "  Note: {} match is by filename only; the referenced path does not exist",
            tier.as_str().to_uppercase()
        );
    }
    if !inst.is_installed() {
        println!(
            "  {}",
            paint(
                "⚠️  Script is NOT registered in any settings file; add it under \"hooks\" to activate it",
                color,
                |s| s.yellow().to_string()
            )
        );
    }
}

fn print_status(report: &ValidationReport, color: bool) {
    let line = status_line(report);
    let line = match report.status() {
        ReportStatus::Passed => paint(&line, color, |s| s.green().bold().to_string()),
        ReportStatus::ValidNotInstalled => paint(&line, color, |s| s.yellow().bold().to_string()),
        ReportStatus::Failed => paint(&line, color, |s| s.red().bold().to_string()),
    };
    println!("{}", line);
}

/// Print a single script report under `title`.
pub fn print_script_report(title: &str, report: &ValidationReport, output: &str) {
    match output {
        "json" => print_json(&compose_report_json(title, report)),
        _ => {
            let color = use_colors(output);
            print_script_human(title, report, color);
        }
    }
}

fn print_script_human(title: &str, report: &ValidationReport, color: bool) {
    let header = format!("=== Validating: {} ===", title);
    println!("{}", paint(&header, color, |s| s.cyan().bold().to_string()));
    print_findings(report, color);
    if let Some(inst) = &report.installation {
        print_installation(inst, color);
    }
    println!();
    print_status(report, color);
}

/// Print many script reports (the `--all` mode).
pub fn print_scripts(scripts: &[ScriptReport], project_dir: &Path, output: &str) {
    match output {
        "json" => {
            let items: Vec<_> = scripts
                .iter()
                .map(|s| compose_report_json(&display_path(&s.path, project_dir), &s.report))
                .collect();
            let failed = scripts.iter().filter(|s| !s.report.success()).count();
            print_json(&json!({
                "results": items,
                "summary": {"total": scripts.len(), "failed": failed, "success": failed == 0},
            }));
        }
        _ => {
            let color = use_colors(output);
            for s in scripts {
                print_script_human(&display_path(&s.path, project_dir), &s.report, color);
                println!();
            }
            print_overall(scripts.iter().all(|s| s.report.success()), color);
        }
    }
}

/// Print per-tier settings reports (the `--settings` mode).
pub fn print_settings(layers: &[LayerReport], output: &str) {
    match output {
        "json" => {
            let items: Vec<_> = layers.iter().map(compose_layer_json).collect();
            let ok = layers.iter().all(|l| l.report.success());
            print_json(&json!({"settings": items, "success": ok}));
        }
        _ => {
            let color = use_colors(output);
            for l in layers {
                let header = format!("=== {} ===", l.tier.label());
                println!("{}", paint(&header, color, |s| s.cyan().bold().to_string()));
                println!("  {}", l.path.display());
                print_findings(&l.report, color);
                println!();
            }
            print_overall(layers.iter().all(|l| l.report.success()), color);
        }
    }
}

/// Print a whole-project run: tier summary, script reports, verdict.
pub fn print_project(pr: &ProjectReport, output: &str) {
    match output {
        "json" => print_json(&compose_project_json(pr)),
        _ => {
            let color = use_colors(output);
            let header = format!("=== Project: {} ===", pr.project_dir.display());
            println!("{}", paint(&header, color, |s| s.cyan().bold().to_string()));
            println!();
            println!("{}", paint("Settings:", color, |s| s.bold().to_string()));
            for l in &pr.settings {
                let icon = if !l.exists {
                    "⚪"
                } else if l.report.success() {
                    "✅"
                } else {
                    "❌"
                };
                println!("  {} {}", icon, l.tier.label());
                for f in l.report.errors.iter().chain(&l.report.warnings) {
                    println!("  {}", finding_line(f, color));
                }
            }
            println!();
            if pr.scripts.is_empty() {
                println!("No hook scripts found");
                println!();
            }
            for s in &pr.scripts {
                print_script_human(&display_path(&s.path, &pr.project_dir), &s.report, color);
                println!();
            }
            print_overall(pr.success(), color);
        }
    }
}

fn print_overall(ok: bool, color: bool) {
    if ok {
        println!("{}", paint("All checks passed", color, |s| s.green().bold().to_string()));
    } else {
        println!("{}", paint("Validation failed", color, |s| s.red().bold().to_string()));
    }
}

fn messages(findings: &[Finding]) -> Vec<&str> {
    findings.iter().map(|f| f.message.as_str()).collect()
}

/// Compose a script report JSON object (pure) for testing/snapshot purposes.
pub fn compose_report_json(title: &str, report: &ValidationReport) -> JsonVal {
    let installation = report.installation.as_ref().map(|inst| {
        json!({
            "local": inst.local,
            "project": inst.project,
            "user": inst.user,
            "scope": inst.scope(),
            "events": inst.events,
            "matchers": inst.matchers,
            "fallback_tiers": inst.fallback_tiers,
        })
    });
    json!({
        "script": title,
        "status": report.status(),
        "success": report.success(),
        "errors": messages(&report.errors),
        "warnings": messages(&report.warnings),
        "passed": messages(&report.passed),
        "installation": installation,
    })
}

fn compose_layer_json(l: &LayerReport) -> JsonVal {
    json!({
        "tier": l.tier,
        "path": l.path,
        "exists": l.exists,
        "success": l.report.success(),
        "errors": messages(&l.report.errors),
        "warnings": messages(&l.report.warnings),
        "passed": messages(&l.report.passed),
    })
}

/// Compose a project report JSON object (pure) for testing/snapshot purposes.
pub fn compose_project_json(pr: &ProjectReport) -> JsonVal {
    let scripts: Vec<_> = pr
        .scripts
        .iter()
        .map(|s| compose_report_json(&display_path(&s.path, &pr.project_dir), &s.report))
        .collect();
    json!({
        "project_dir": pr.project_dir,
        "settings": pr.settings.iter().map(compose_layer_json).collect::<Vec<_>>(),
        "scripts": scripts,
        "success": pr.success(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn installed_report() -> ValidationReport {
        let mut r = ValidationReport::new();
        r.ok("Script exists: guard.sh");
        r.warn("No stdin JSON handling found - may not handle input correctly");
        let mut inst = InstallationRecord::default();
        inst.mark(Tier::Project);
        inst.events.insert("PreToolUse".into());
        inst.matchers.insert("Bash".into());
        r.installation = Some(inst);
        r
    }

    #[test]
    fn test_status_lines() {
        let r = installed_report();
        assert_eq!(status_line(&r), "PASSED (1 checks, 1 warnings)");

        let mut nr = ValidationReport::new();
        nr.installation = Some(InstallationRecord::default());
        assert_eq!(status_line(&nr), "SCRIPT VALID but NOT INSTALLED");

        nr.error("Python syntax error: bad");
        assert_eq!(status_line(&nr), "FAILED (1 errors, 0 warnings)");
    }

    #[test]
    fn test_compose_report_json_shape() {
        let out = compose_report_json(".claude/hooks/guard.sh", &installed_report());
        assert_eq!(out["status"], "passed");
        assert_eq!(out["success"], true);
        assert_eq!(out["installation"]["project"], true);
        assert_eq!(out["installation"]["scope"], "this_project");
        assert_eq!(out["installation"]["events"][0], "PreToolUse");
        assert_eq!(out["warnings"].as_array().map(|a| a.len()), Some(1));

        let bare = compose_report_json("x.sh", &ValidationReport::new());
        assert!(bare["installation"].is_null());
    }

    #[test]
    fn test_compose_project_json_relativizes_scripts() {
        let root = PathBuf::from("/work/proj");
        let mut bad = ValidationReport::new();
        bad.error("Unknown event type: Bogus");
        let pr = ProjectReport {
            project_dir: root.clone(),
            settings: vec![LayerReport {
                tier: Tier::Local,
                path: root.join(".claude/settings.local.json"),
                exists: true,
                report: bad,
            }],
            scripts: vec![ScriptReport {
                path: root.join(".claude/hooks/guard.sh"),
                report: installed_report(),
            }],
        };
        let out = compose_project_json(&pr);
        assert_eq!(out["success"], false);
        assert_eq!(out["settings"][0]["tier"], "local");
        assert_eq!(out["settings"][0]["errors"][0], "Unknown event type: Bogus");
        assert_eq!(out["scripts"][0]["script"], ".claude/hooks/guard.sh");
    }
}
