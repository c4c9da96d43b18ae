//! Runtime probe: run a hook once against a sample payload.
//!
//! Exit codes 0, 1 and 2 are the hook vocabulary (success, non-blocking
//! error, blocking denial) and all count as a working hook.

use crate::error::{HookError, Result};
use crate::inspect::{HookScript, Interpreter};
use crate::locate::PROJECT_DIR_VAR;
use crate::models::ValidationReport;
use crate::runner::{format_timeout, run_with_timeout, ProcessOutput};
use crate::validate::ValidationContext;
use serde_json::Value as Json;
use std::process::Command;

const TEXT_OUTPUT_LIMIT: usize = 200;
const KNOWN_OUTPUT_KEYS: &[&str] = &[
    "decision",
    "reason",
    "continue",
    "stopReason",
    "suppressOutput",
    "systemMessage",
    "hookSpecificOutput",
];

/// Execute `script` with the sample payload for `event` on stdin.
pub fn probe(script: &HookScript, event: &str, ctx: &ValidationContext) -> Result<ProcessOutput> {
    let program = match script.interpreter {
        Interpreter::Python => &ctx.interpreters.python,
        Interpreter::Shell => &ctx.interpreters.shell,
        Interpreter::Unknown => {
            return Err(HookError::Spawn {
                program: script.path.display().to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::Unsupported,
                    "unknown interpreter",
                ),
            })
        }
    };
    let payload = ctx.samples.payload_for(event).to_string();
    let mut cmd = Command::new(program);
    cmd.arg(&script.path)
        .current_dir(&ctx.project_dir)
        .env(PROJECT_DIR_VAR, &ctx.project_dir);
    tracing::debug!(script = %script.path.display(), event, "probing hook");
    run_with_timeout(cmd, Some(payload.as_bytes()), ctx.probe.timeout)
}

/// Turn a probe outcome into report findings.
pub fn record_probe(outcome: Result<ProcessOutput>, event: &str, report: &mut ValidationReport) {
    let out = match outcome {
        Ok(out) => out,
        Err(HookError::Timeout { timeout, .. }) => {
            report.error(format!(
                "Script timed out (>{}) on test input",
                format_timeout(&timeout)
            ));
            return;
        }
        Err(e) => {
            report.error(format!("Runtime test failed: {}", e));
            return;
        }
    };
    let Some(code) = out.code else {
        report.error("Runtime test failed: script terminated by a signal");
        return;
    };
    if matches!(code, 0..=2) {
        report.ok(format!("Runtime test passed (exit code: {})", code));
        let stdout = out.stdout.trim();
        if !stdout.is_empty() {
            match serde_json::from_str::<Json>(stdout) {
                Ok(doc) => {
                    report.ok("Outputs valid JSON");
                    check_output_schema(&doc, event, report);
                }
                Err(_) if out.stdout.len() < TEXT_OUTPUT_LIMIT => {
                    report.ok(format!("Outputs text: {}", truncate(stdout, 50)));
                }
                Err(_) => {}
            }
        }
    } else {
        report.error(format!("Unexpected exit code: {}", code));
    }
    let stderr = out.stderr.trim();
    if !stderr.is_empty() && code != 2 {
        report.warn(format!("Stderr output: {}", truncate(stderr, 100)));
    }
}

fn check_output_schema(doc: &Json, event: &str, report: &mut ValidationReport) {
    let Some(obj) = doc.as_object() else {
        report.warn("JSON output is not an object; hook output fields will be ignored");
        return;
    };
    let unknown: Vec<&str> = obj
        .keys()
        .map(String::as_str)
        .filter(|k| !KNOWN_OUTPUT_KEYS.contains(k))
        .collect();
    if !unknown.is_empty() {
        report.warn(format!("Unrecognized output field(s): {}", unknown.join(", ")));
    }
    if let Some(decision) = obj.get("decision") {
        if !matches!(decision.as_str(), Some("block") | Some("approve")) {
            report.warn(format!(
                "Output decision {} is not \"block\" or \"approve\"",
                decision
            ));
        }
    }
    let declared = obj
        .get("hookSpecificOutput")
        .and_then(|h| h.get("hookEventName"))
        .and_then(Json::as_str);
    if let Some(name) = declared {
        if name != event {
            report.warn(format!(
                "hookSpecificOutput.hookEventName is {} but the hook was run as {}",
                name, event
            ));
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
