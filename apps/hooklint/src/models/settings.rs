//! Settings document schema: `hooks.<Event>[].hooks[]` entries per tier.

use super::report::Tier;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One hook descriptor inside a matcher group.
pub enum HookEntry {
    Command(String),
    Prompt(String),
    /// Descriptor with a `type` the framework does not define.
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookGroup {
    /// Raw `matcher` value when the key is present (wildcards included).
    pub matcher: Option<String>,
    pub hooks: Vec<HookEntry>,
}

impl HookGroup {
    /// Matcher text that actually narrows the event, if any.
    pub fn effective_matcher(&self) -> Option<&str> {
        self.matcher
            .as_deref()
            .filter(|m| !m.is_empty() && *m != "*")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventHooks {
    pub event: String,
    pub groups: Vec<HookGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerState {
    Missing,
    Invalid(String),
    Loaded,
}

#[derive(Debug, Clone)]
/// One settings file at one tier, in document order.
pub struct SettingsLayer {
    pub tier: Tier,
    pub path: PathBuf,
    pub state: LayerState,
    pub events: Vec<EventHooks>,
    /// Shape problems found while extracting entries (wrong JSON types).
    pub structure_errors: Vec<String>,
}

impl SettingsLayer {
    pub fn empty(tier: Tier, path: PathBuf, state: LayerState) -> Self {
        Self {
            tier,
            path,
            state,
            events: Vec::new(),
            structure_errors: Vec::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LayerState::Loaded
    }

    /// Every `(event, group, command)` triple of command-type entries.
    pub fn commands(&self) -> impl Iterator<Item = (&str, &HookGroup, &str)> + '_ {
        self.events.iter().flat_map(|eh| {
            eh.groups.iter().flat_map(move |g| {
                g.hooks.iter().filter_map(move |h| match h {
                    HookEntry::Command(c) => Some((eh.event.as_str(), g, c.as_str())),
                    _ => None,
                })
            })
        })
    }
}
