//! Static inspection of one hook script.
//!
//! `inspect` reads the file and derives interpreter and capability flags;
//! `check_script` turns those facts into ordered report findings. A syntax
//! failure stops the checks for that script.

use crate::error::{HookError, Result};
use crate::infer;
use crate::models::ValidationReport;
use crate::runner::run_with_timeout;
use crate::validate::ValidationContext;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const PY_SYNTAX_CHECK: &str = "import ast, sys\n\
path = sys.argv[1]\n\
try:\n    ast.parse(open(path, encoding='utf-8').read(), path)\n\
except SyntaxError as e:\n    print(f'{e.msg} (line {e.lineno})')\n    sys.exit(1)\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpreter {
    Python,
    Shell,
    Unknown,
}

impl Interpreter {
    fn from_extension(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("py") => Interpreter::Python,
            Some("sh") => Interpreter::Shell,
            _ => Interpreter::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shebang {
    Missing,
    Python(String),
    Shell(String),
    Unusual(String),
}

impl Shebang {
    fn parse(first_line: Option<&str>) -> Self {
        let line = match first_line {
            Some(l) if l.starts_with("#!") => l.trim_end().to_string(),
            _ => return Shebang::Missing,
        };
        if line.contains("python") {
            Shebang::Python(line)
        } else if line.contains("bash") || line.contains("sh") {
            Shebang::Shell(line)
        } else {
            Shebang::Unusual(line)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub reads_stdin_json: bool,
    pub has_reentry_guard: bool,
    pub exits_blocking: bool,
    pub exits_success: bool,
    pub exits_generic_failure: bool,
}

#[derive(Debug, Clone)]
/// A hook script as read from disk for one validation run.
pub struct HookScript {
    pub path: PathBuf,
    pub source: String,
    pub shebang: Shebang,
    pub interpreter: Interpreter,
    pub executable: bool,
    pub caps: Capabilities,
}

impl HookScript {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Read `path` and derive its interpreter and capability flags.
pub fn inspect(path: &Path) -> Result<HookScript> {
    if !path.exists() {
        return Err(HookError::NotFound(path.to_path_buf()));
    }
    let abs = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let source = fs::read_to_string(&abs).map_err(|source| HookError::Read {
        path: abs.clone(),
        source,
    })?;
    let shebang = Shebang::parse(source.lines().next());
    let interpreter = match &shebang {
        Shebang::Python(_) => Interpreter::Python,
        Shebang::Shell(_) => Interpreter::Shell,
        Shebang::Missing | Shebang::Unusual(_) => Interpreter::from_extension(&abs),
    };
    let caps = scan_capabilities(&source, interpreter);
    tracing::debug!(path = %abs.display(), ?interpreter, ?caps, "inspected hook script");
    Ok(HookScript {
        executable: is_executable(&abs),
        path: abs,
        source,
        shebang,
        interpreter,
        caps,
    })
}

fn scan_capabilities(src: &str, interp: Interpreter) -> Capabilities {
    let py = matches!(interp, Interpreter::Python | Interpreter::Unknown);
    let sh = matches!(interp, Interpreter::Shell | Interpreter::Unknown);
    let exits = |code: u8| {
        (py && src.contains(&format!("sys.exit({})", code)))
            || (sh && src.contains(&format!("exit {}", code)))
    };
    Capabilities {
        reads_stdin_json: (py && (src.contains("json.load(sys.stdin)") || src.contains("json.loads")))
            || (sh && (src.contains("cat") || src.contains("INPUT=$(") || src.contains("read"))),
        has_reentry_guard: infer::has_reentry_guard(src),
        exits_blocking: exits(2),
        exits_success: exits(0),
        exits_generic_failure: exits(1),
    }
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

enum Syntax {
    Valid,
    Invalid(String),
    Unchecked(String),
}

fn check_syntax(script: &HookScript, ctx: &ValidationContext) -> Syntax {
    let mut cmd = match script.interpreter {
        Interpreter::Python => {
            let mut c = Command::new(&ctx.interpreters.python);
            c.arg("-c").arg(PY_SYNTAX_CHECK).arg(&script.path);
            c
        }
        Interpreter::Shell => {
            let mut c = Command::new(&ctx.interpreters.shell);
            c.arg("-n").arg(&script.path);
            c
        }
        Interpreter::Unknown => {
            return Syntax::Unchecked("Syntax not checked (unknown interpreter)".into())
        }
    };
    cmd.current_dir(&ctx.project_dir);
    match run_with_timeout(cmd, None, ctx.probe.syntax_timeout) {
        Ok(out) if out.code == Some(0) => Syntax::Valid,
        Ok(out) => {
            let detail = if out.stdout.trim().is_empty() {
                out.stderr.trim().to_string()
            } else {
                out.stdout.trim().to_string()
            };
            Syntax::Invalid(detail)
        }
        Err(HookError::Timeout { .. }) => Syntax::Unchecked("Syntax check timed out".into()),
        Err(e) => Syntax::Unchecked(format!("Cannot check syntax ({})", e)),
    }
}

/// Facts later stages need from a completed inspection.
pub struct Inspection {
    pub event: Option<String>,
    pub syntax_ok: bool,
}

/// Record static checks for `script` into `report`, in a fixed order.
pub fn check_script(
    script: &HookScript,
    event_override: Option<&str>,
    ctx: &ValidationContext,
    report: &mut ValidationReport,
) -> Inspection {
    if script.executable {
        report.ok("Script is executable");
    } else {
        report.error("Script is not executable (run: chmod +x)");
    }

    match &script.shebang {
        Shebang::Missing => report.error(
            "Missing shebang (should start with #!/usr/bin/env python3 or #!/bin/bash)",
        ),
        Shebang::Python(_) => report.ok("Valid Python shebang"),
        Shebang::Shell(_) => report.ok("Valid Bash shebang"),
        Shebang::Unusual(line) => report.warn(format!("Unusual shebang: {}", line)),
    }

    let lang = match script.interpreter {
        Interpreter::Python => "Python",
        Interpreter::Shell => "Bash",
        Interpreter::Unknown => "Script",
    };
    match check_syntax(script, ctx) {
        Syntax::Valid => report.ok(format!("{} syntax valid", lang)),
        Syntax::Invalid(detail) => {
            report.error(format!("{} syntax error: {}", lang, detail));
            return Inspection {
                event: None,
                syntax_ok: false,
            };
        }
        Syntax::Unchecked(why) => report.warn(why),
    }

    if script.caps.reads_stdin_json {
        report.ok("Handles JSON input from stdin");
    } else {
        report.warn("No stdin JSON handling found - may not handle input correctly");
    }

    let event = match event_override {
        Some(name) if !ctx.registry.contains(name) => {
            report.error(format!("Unknown event type: {}", name));
            None
        }
        Some(name) => Some(name.to_string()),
        None => infer::infer_event(&script.source, &ctx.registry),
    };
    match &event {
        Some(ev) => {
            report.ok(format!("Detected event type: {}", ev));
            if ev == "Stop" || ev == "SubagentStop" {
                if script.caps.has_reentry_guard {
                    report.ok("Has stop_hook_active check (prevents infinite loops)");
                } else {
                    report.error("Stop hook missing stop_hook_active check (infinite loop risk!)");
                }
            }
        }
        None if event_override.is_none() => report.warn(
            "Could not detect event type from script content (event checks and runtime test skipped)",
        ),
        None => {}
    }

    if script.caps.exits_blocking {
        report.ok("Uses exit code 2 for blocking");
    }
    if script.caps.exits_success {
        report.ok("Uses exit code 0 for success");
    }
    if script.caps.exits_generic_failure {
        report.warn("Uses exit code 1 - non-blocking error (logged only)");
    }

    Inspection {
        event,
        syntax_ok: true,
    }
}
