//! Shared data models: event registry, settings layers, and reports.

pub mod event;
pub mod report;
pub mod settings;

pub use event::{EventRegistry, EventSpec, SamplePayloads};
pub use report::{
    Finding, InstallationRecord, LayerReport, Level, ProjectReport, ReportStatus, Scope,
    ScriptReport, Tier, ValidationReport,
};
pub use settings::{EventHooks, HookEntry, HookGroup, LayerState, SettingsLayer};
