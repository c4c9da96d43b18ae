//! CLI argument parsing via `clap`.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "hooklint",
    version,
    about = "Validate hook scripts and report where they are installed",
    long_about = "hooklint checks lifecycle hook scripts (shebang, syntax, stdin JSON handling, event conventions), \
runs them once against a sample payload, and reports which settings tier registers them.\n\n\
Installation tiers:\n  LOCAL   .claude/settings.local.json  (this project, gitignored)\n  PROJECT .claude/settings.json        (this project)\n  USER    ~/.claude/settings.json      (every project)\n\n\
Configuration precedence: CLI > hooklint.toml > defaults.",
    after_help = "Examples:\n  hooklint .claude/hooks/guard.py\n  hooklint --all --event PreToolUse\n  hooklint --settings\n  hooklint --project --output json\n\nExit codes: 0 passed, 1 validation errors, 2 fatal error"
)]
/// Top-level CLI options. With no script and no mode flag, `--project` is implied.
pub struct Cli {
    #[arg(help = "Hook script to validate (relative paths resolve against --dir)")]
    pub script: Option<String>,
    #[arg(long, action = clap::ArgAction::SetTrue, conflicts_with = "script", help = "Validate every script in the hooks directory")]
    pub all: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, conflicts_with = "script", help = "Validate the local, project and user settings files")]
    pub settings: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, conflicts_with = "script", help = "Full project validation (settings + all scripts)")]
    pub project: bool,
    #[arg(long, help = "Event type to assume instead of inferring it")]
    pub event: Option<String>,
    #[arg(long, help = "Project directory (default: nearest ancestor with .claude)")]
    pub dir: Option<String>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..), help = "Runtime test timeout in seconds (default: 10)")]
    pub timeout: Option<u64>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Skip running scripts against sample input")]
    pub no_probe: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Script,
    All,
    Settings,
    Project,
}

impl Cli {
    /// Selected run mode; project wins when several flags are set.
    pub fn mode(&self) -> Mode {
        if self.project {
            Mode::Project
        } else if self.settings {
            Mode::Settings
        } else if self.all {
            Mode::All
        } else if self.script.is_some() {
            Mode::Script
        } else {
            Mode::Project
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("hooklint").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_to_project_mode() {
        assert_eq!(parse(&[]).mode(), Mode::Project);
    }

    #[test]
    fn test_script_mode_with_event_override() {
        let cli = parse(&["hooks/a.py", "--event", "Stop", "--dir", "/tmp/p"]);
        assert_eq!(cli.mode(), Mode::Script);
        assert_eq!(cli.event.as_deref(), Some("Stop"));
        assert_eq!(cli.dir.as_deref(), Some("/tmp/p"));
    }

    #[test]
    fn test_mode_flags() {
        assert_eq!(parse(&["--all"]).mode(), Mode::All);
        assert_eq!(parse(&["--settings"]).mode(), Mode::Settings);
        assert_eq!(parse(&["--all", "--project"]).mode(), Mode::Project);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        assert!(Cli::try_parse_from(["hooklint", "--timeout", "0"]).is_err());
        assert_eq!(parse(&["--timeout", "3"]).timeout, Some(3));
    }

    #[test]
    fn test_script_conflicts_with_mode_flags() {
        assert!(Cli::try_parse_from(["hooklint", "a.py", "--all"]).is_err());
    }
}
