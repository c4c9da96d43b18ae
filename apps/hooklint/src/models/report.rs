//! Validation findings, installation records, and report composition.

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
/// Settings precedence tier, narrowest scope first.
pub enum Tier {
    Local,
    Project,
    User,
}

impl Tier {
    pub fn all() -> [Tier; 3] {
        [Tier::Local, Tier::Project, Tier::User]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Local => "local",
            Tier::Project => "project",
            Tier::User => "user",
        }
    }

    /// Human label naming the well-known file for this tier.
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Local => "LOCAL (.claude/settings.local.json)",
            Tier::Project => "PROJECT (.claude/settings.json)",
            Tier::User => "USER (~/.claude/settings.json)",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
/// Where a registered hook takes effect.
pub enum Scope {
    AllProjects,
    ThisProject,
    NotInstalled,
}

impl Scope {
    pub fn from_tiers(local: bool, project: bool, user: bool) -> Self {
        match (user, local || project) {
            (true, _) => Scope::AllProjects,
            (false, true) => Scope::ThisProject,
            (false, false) => Scope::NotInstalled,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scope::AllProjects => "Will run in ALL projects",
            Scope::ThisProject => "Will run in THIS project only",
            Scope::NotInstalled => "Will NOT run (not registered in any settings file)",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Where one script is registered across the settings tiers.
pub struct InstallationRecord {
    pub local: bool,
    pub project: bool,
    pub user: bool,
    pub events: BTreeSet<String>,
    pub matchers: BTreeSet<String>,
    /// Tiers whose match came only from the filename fallback.
    pub fallback_tiers: BTreeSet<Tier>,
}

impl InstallationRecord {
    pub fn is_installed(&self) -> bool {
        self.local || self.project || self.user
    }

    pub fn registered_in(&self, tier: Tier) -> bool {
        match tier {
            Tier::Local => self.local,
            Tier::Project => self.project,
            Tier::User => self.user,
        }
    }

    pub fn mark(&mut self, tier: Tier) {
        match tier {
            Tier::Local => self.local = true,
            Tier::Project => self.project = true,
            Tier::User => self.user = true,
        }
    }

    pub fn scope(&self) -> Scope {
        Scope::from_tiers(self.local, self.project, self.user)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Ok,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub level: Level,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Passed,
    ValidNotInstalled,
    Failed,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Findings for one unit (a script or a settings layer).
pub struct ValidationReport {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub passed: Vec<Finding>,
    pub installation: Option<InstallationRecord>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(finding(Level::Error, msg));
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(finding(Level::Warn, msg));
    }

    pub fn ok(&mut self, msg: impl Into<String>) {
        self.passed.push(finding(Level::Ok, msg));
    }

    pub fn info(&mut self, msg: impl Into<String>) {
        self.passed.push(finding(Level::Info, msg));
    }

    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn status(&self) -> ReportStatus {
        if !self.success() {
            ReportStatus::Failed
        } else if self
            .installation
            .as_ref()
            .is_some_and(|i| !i.is_installed())
        {
            ReportStatus::ValidNotInstalled
        } else {
            ReportStatus::Passed
        }
    }

    pub fn has_error(&self, needle: &str) -> bool {
        self.errors.iter().any(|f| f.message.contains(needle))
    }

    pub fn has_warning(&self, needle: &str) -> bool {
        self.warnings.iter().any(|f| f.message.contains(needle))
    }

    pub fn has_passed(&self, needle: &str) -> bool {
        self.passed.iter().any(|f| f.message.contains(needle))
    }
}

fn finding(level: Level, msg: impl Into<String>) -> Finding {
    Finding {
        level,
        message: msg.into(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LayerReport {
    pub tier: Tier,
    pub path: PathBuf,
    pub exists: bool,
    pub report: ValidationReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScriptReport {
    pub path: PathBuf,
    pub report: ValidationReport,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Composition of every layer and script report for one project run.
pub struct ProjectReport {
    pub project_dir: PathBuf,
    pub settings: Vec<LayerReport>,
    pub scripts: Vec<ScriptReport>,
}

impl ProjectReport {
    pub fn success(&self) -> bool {
        self.settings.iter().all(|l| l.report.success())
            && self.scripts.iter().all(|s| s.report.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_is_a_function_of_tiers() {
        assert_eq!(Scope::from_tiers(false, false, true), Scope::AllProjects);
        assert_eq!(Scope::from_tiers(true, true, true), Scope::AllProjects);
        assert_eq!(Scope::from_tiers(true, false, false), Scope::ThisProject);
        assert_eq!(Scope::from_tiers(false, true, false), Scope::ThisProject);
        assert_eq!(Scope::from_tiers(false, false, false), Scope::NotInstalled);
    }

    #[test]
    fn test_status_distinguishes_valid_but_not_installed() {
        let mut r = ValidationReport::new();
        r.ok("fine");
        assert_eq!(r.status(), ReportStatus::Passed);

        r.installation = Some(InstallationRecord::default());
        assert_eq!(r.status(), ReportStatus::ValidNotInstalled);
        assert!(r.success());

        let mut installed = InstallationRecord::default();
        installed.mark(Tier::User);
        r.installation = Some(installed);
        assert_eq!(r.status(), ReportStatus::Passed);

        r.error("broken");
        assert_eq!(r.status(), ReportStatus::Failed);
    }

    #[test]
    fn test_warnings_do_not_fail_a_report() {
        let mut r = ValidationReport::new();
        r.warn("advisory");
        r.info("note");
        assert!(r.success());
        assert_eq!(r.passed[0].level, Level::Info);
    }

    #[test]
    fn test_project_success_is_and_of_parts() {
        let ok = ValidationReport::new();
        let mut bad = ValidationReport::new();
        bad.error("x");
        let mut pr = ProjectReport::default();
        pr.settings.push(LayerReport {
            tier: Tier::Project,
            path: PathBuf::from("s.json"),
            exists: true,
            report: ok.clone(),
        });
        pr.scripts.push(ScriptReport {
            path: PathBuf::from("a.py"),
            report: ok,
        });
        assert!(pr.success());
        pr.scripts.push(ScriptReport {
            path: PathBuf::from("b.py"),
            report: bad,
        });
        assert!(!pr.success());
    }
}
