//! Configuration discovery and effective settings resolution.
//!
//! hooklint reads `hooklint.toml|yaml|yml` from the project root and merges
//! it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `output`: `human`
//! - `hooks_dir`: `.claude/hooks`
//! - `user_settings`: `~/.claude/settings.json`
//! - `probe.enabled`: true
//! - `probe.timeout_secs`: 10, `probe.syntax_timeout_secs`: 5
//! - `probe.python`: `python3`, `probe.shell`: `bash`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::HookError;
use crate::settings::SettingsPaths;
use crate::validate::{Interpreters, ProbeOptions, ValidationContext};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_NAMES: [&str; 3] = ["hooklint.toml", "hooklint.yaml", "hooklint.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Runtime probe section under `[probe]`.
pub struct ProbeCfg {
    pub enabled: Option<bool>,
    pub timeout_secs: Option<u64>,
    pub syntax_timeout_secs: Option<u64>,
    pub python: Option<String>,
    pub shell: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `hooklint.toml|yaml`.
pub struct HooklintConfig {
    pub output: Option<String>,
    pub hooks_dir: Option<String>,
    pub user_settings: Option<String>,
    #[serde(default)]
    pub probe: Option<ProbeCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by the binary after applying precedence.
pub struct Effective {
    pub project_dir: PathBuf,
    pub output: String,
    pub hooks_dir: PathBuf,
    pub user_settings: Option<PathBuf>,
    pub probe_enabled: bool,
    pub timeout_secs: u64,
    pub syntax_timeout_secs: u64,
    pub python: String,
    pub shell: String,
}

impl Effective {
    /// Build the read-only context every validation in this run shares.
    pub fn context(&self) -> ValidationContext {
        let settings = SettingsPaths::for_project(&self.project_dir, self.user_settings.clone());
        let mut ctx =
            ValidationContext::new(self.project_dir.clone(), settings, self.hooks_dir.clone());
        ctx.interpreters = Interpreters {
            python: self.python.clone(),
            shell: self.shell.clone(),
        };
        ctx.probe = ProbeOptions {
            enabled: self.probe_enabled,
            timeout: Duration::from_secs(self.timeout_secs),
            syntax_timeout: Duration::from_secs(self.syntax_timeout_secs),
        };
        ctx
    }
}

/// Walk upward from `start` to detect the project root.
///
/// Stops at the first directory holding `.claude`, a hooklint config, or `.git`.
pub fn detect_project_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if cur.join(".claude").is_dir() || CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `HooklintConfig` from `hooklint.toml` or `hooklint.yaml|yml` if present.
pub fn load_config(root: &Path) -> Result<Option<HooklintConfig>, HookError> {
    for name in CONFIG_NAMES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let text = fs::read_to_string(&path).map_err(|source| HookError::Read {
            path: path.clone(),
            source,
        })?;
        let parsed = if name.ends_with(".toml") {
            toml::from_str::<HooklintConfig>(&text).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<HooklintConfig>(&text).map_err(|e| e.to_string())
        };
        let cfg = parsed.map_err(|message| HookError::Config {
            path: path.clone(),
            message,
        })?;
        if let Some(key) = zero_timeout(&cfg) {
            return Err(HookError::Config {
                path,
                message: format!("probe.{} must be at least 1", key),
            });
        }
        return Ok(Some(cfg));
    }
    Ok(None)
}

fn zero_timeout(cfg: &HooklintConfig) -> Option<&'static str> {
    let probe = cfg.probe.as_ref()?;
    if probe.timeout_secs == Some(0) {
        Some("timeout_secs")
    } else if probe.syntax_timeout_secs == Some(0) {
        Some("syntax_timeout_secs")
    } else {
        None
    }
}

/// Expand a leading `~/` against the home directory.
fn expand_home(p: &str) -> PathBuf {
    match p.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().unwrap_or_default().join(rest),
        None => PathBuf::from(p),
    }
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
///
/// A config file that fails to parse is returned alongside defaults so the
/// caller can surface it without aborting.
pub fn resolve_effective(
    cli_dir: Option<&str>,
    cli_output: Option<&str>,
    cli_timeout: Option<u64>,
    cli_no_probe: bool,
) -> (Effective, Option<HookError>) {
    let project_dir = match cli_dir {
        Some(d) => PathBuf::from(d),
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            detect_project_root(&cwd)
        }
    };
    let project_dir = fs::canonicalize(&project_dir).unwrap_or(project_dir);
    let (cfg, problem) = match load_config(&project_dir) {
        Ok(c) => (c.unwrap_or_default(), None),
        Err(e) => (HooklintConfig::default(), Some(e)),
    };
    let probe = cfg.probe.unwrap_or_default();

    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    let hooks_dir = cfg
        .hooks_dir
        .map(|d| project_dir.join(d))
        .unwrap_or_else(|| project_dir.join(".claude").join("hooks"));
    let user_settings = cfg
        .user_settings
        .as_deref()
        .map(expand_home)
        .map(|p| if p.is_absolute() { p } else { project_dir.join(p) });
    let probe_enabled = !cli_no_probe && probe.enabled.unwrap_or(true);
    let timeout_secs = cli_timeout.or(probe.timeout_secs).unwrap_or(10);
    let syntax_timeout_secs = probe.syntax_timeout_secs.unwrap_or(5);

    (
        Effective {
            project_dir,
            output,
            hooks_dir,
            user_settings,
            probe_enabled,
            timeout_secs,
            syntax_timeout_secs,
            python: probe.python.unwrap_or_else(|| "python3".to_string()),
            shell: probe.shell.unwrap_or_else(|| "bash".to_string()),
        },
        problem,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_config() {
        let dir = tempdir().unwrap();
        let (eff, problem) = resolve_effective(dir.path().to_str(), None, None, false);
        assert!(problem.is_none());
        assert_eq!(eff.output, "human");
        assert!(eff.hooks_dir.ends_with(".claude/hooks"));
        assert!(eff.user_settings.is_none());
        assert!(eff.probe_enabled);
        assert_eq!(eff.timeout_secs, 10);
        assert_eq!(eff.syntax_timeout_secs, 5);
        assert_eq!(eff.python, "python3");
    }

    #[test]
    fn test_load_toml_and_cli_precedence() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("hooklint.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
output = "json"
hooks_dir = "scripts/hooks"
user_settings = "fixtures/user.json"
[probe]
enabled = true
timeout_secs = 3
python = "python3.12"
"#
        )
        .unwrap();

        let (eff, _) = resolve_effective(root.to_str(), None, None, false);
        assert_eq!(eff.output, "json");
        assert!(eff.hooks_dir.ends_with("scripts/hooks"));
        assert!(eff
            .user_settings
            .as_ref()
            .is_some_and(|p| p.is_absolute() && p.ends_with("fixtures/user.json")));
        assert_eq!(eff.timeout_secs, 3);
        assert_eq!(eff.python, "python3.12");

        // CLI wins over file
        let (eff, _) = resolve_effective(root.to_str(), Some("human"), Some(20), true);
        assert_eq!(eff.output, "human");
        assert_eq!(eff.timeout_secs, 20);
        assert!(!eff.probe_enabled);
    }

    #[test]
    fn test_load_yaml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("hooklint.yaml"),
            "output: json\nprobe:\n  enabled: false\n  shell: /bin/bash\n",
        )
        .unwrap();
        let (eff, _) = resolve_effective(root.to_str(), None, None, false);
        assert_eq!(eff.output, "json");
        assert!(!eff.probe_enabled);
        assert_eq!(eff.shell, "/bin/bash");
    }

    #[test]
    fn test_bad_config_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("hooklint.toml"), "output = [").unwrap();
        let (eff, problem) = resolve_effective(dir.path().to_str(), None, None, false);
        assert!(matches!(problem, Some(HookError::Config { .. })));
        assert_eq!(eff.output, "human");
    }

    #[test]
    fn test_zero_timeout_in_config_is_rejected() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("hooklint.toml"),
            "output = \"json\"\n[probe]\ntimeout_secs = 0\n",
        )
        .unwrap();
        let (eff, problem) = resolve_effective(dir.path().to_str(), None, None, false);
        match problem {
            Some(HookError::Config { message, .. }) => {
                assert!(message.contains("probe.timeout_secs"))
            }
            other => panic!("expected config error, got {:?}", other),
        }
        assert_eq!(eff.timeout_secs, 10);
        assert_eq!(eff.output, "human");
    }

    #[test]
    fn test_detect_root_walks_up_to_claude_dir() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".claude")).unwrap();
        let nested = root.join("src/deep");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(detect_project_root(&nested), root.to_path_buf());
    }

    #[test]
    fn test_context_carries_effective_values() {
        let dir = tempdir().unwrap();
        let (eff, _) = resolve_effective(dir.path().to_str(), None, Some(7), false);
        let ctx = eff.context();
        assert_eq!(ctx.probe.timeout, Duration::from_secs(7));
        assert!(ctx.settings.project.ends_with(".claude/settings.json"));
        assert!(ctx.settings.local.ends_with(".claude/settings.local.json"));
    }
}
