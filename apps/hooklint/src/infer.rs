//! Event inference for scripts without an explicit event override.
//!
//! Ordered, first match wins, and the list always ends in `None`:
//! 1. an `Event: <Name>` marker naming a registered event;
//! 2. content heuristics, in the order of `HEURISTICS`.
//!
//! False negatives degrade to a warning upstream, never to a failure.

use crate::models::EventRegistry;
use regex::Regex;
use std::sync::OnceLock;

const REENTRY_GUARD: &str = "stop_hook_active";
const TOOL_NAME: &str = "tool_name";

fn event_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Event:\s*(\w+)").expect("static regex"))
}

/// Whether `content` references `field` as a quoted key (`"field"` or `'field'`).
fn quoted(content: &str, field: &str) -> bool {
    content.contains(&format!("\"{}\"", field)) || content.contains(&format!("'{}'", field))
}

type Heuristic = (&'static str, fn(&str) -> bool);

const HEURISTICS: &[Heuristic] = &[
    ("Stop", |c: &str| c.contains(REENTRY_GUARD)),
    ("PostToolUse", |c: &str| c.contains("tool_response")),
    ("UserPromptSubmit", |c: &str| {
        c.contains("prompt") && !c.contains(TOOL_NAME)
    }),
    ("Notification", |c: &str| c.contains("notification_type")),
    ("SessionStart", |c: &str| quoted(c, "source") && c.contains("startup")),
    ("SessionEnd", |c: &str| quoted(c, "reason") && !c.contains(TOOL_NAME)),
    ("PreToolUse", |c: &str| c.contains(TOOL_NAME)),
];

/// The event named by the first `Event:` marker, if it is registered.
pub fn declared_event(content: &str, registry: &EventRegistry) -> Option<String> {
    let name = event_marker().captures(content)?.get(1)?.as_str();
    registry.contains(name).then(|| name.to_string())
}

/// Infer the lifecycle event a script is written for.
pub fn infer_event(content: &str, registry: &EventRegistry) -> Option<String> {
    if let Some(ev) = declared_event(content, registry) {
        tracing::debug!(event = %ev, "event taken from header marker");
        return Some(ev);
    }
    let inferred = HEURISTICS
        .iter()
        .find(|(_, signal)| signal(content))
        .map(|(name, _)| name.to_string());
    tracing::debug!(event = ?inferred, "event inferred from content");
    inferred
}

/// Whether the reentry guard field is referenced anywhere in the script.
pub fn has_reentry_guard(content: &str) -> bool {
    content.contains(REENTRY_GUARD)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(c: &str) -> Option<String> {
        infer_event(c, &EventRegistry::builtin())
    }

    #[test]
    fn test_header_marker_wins_over_heuristics() {
        let src = "\"\"\"\nEvent: SubagentStop\n\"\"\"\nif data.get('stop_hook_active'): pass\n";
        assert_eq!(infer(src).as_deref(), Some("SubagentStop"));
        let stop = "# Event: Stop\nif data['stop_hook_active']: sys.exit(0)\n";
        assert_eq!(infer(stop).as_deref(), Some("Stop"));
    }

    #[test]
    fn test_unknown_marker_falls_through_to_heuristics() {
        let src = "# Event: Bogus\nname = data['tool_name']\n";
        assert_eq!(infer(src).as_deref(), Some("PreToolUse"));
    }

    #[test]
    fn test_heuristics_follow_fixed_precedence() {
        assert_eq!(infer("x = d['stop_hook_active']").as_deref(), Some("Stop"));
        assert_eq!(
            infer("d['tool_name']; d['tool_response']").as_deref(),
            Some("PostToolUse")
        );
        assert_eq!(infer("p = d['prompt']").as_deref(), Some("UserPromptSubmit"));
        assert_eq!(
            infer("prompt = d['tool_name']").as_deref(),
            Some("PreToolUse")
        );
        assert_eq!(
            infer("t = d['notification_type']").as_deref(),
            Some("Notification")
        );
        assert_eq!(
            infer("if d.get(\"source\") == \"startup\": pass").as_deref(),
            Some("SessionStart")
        );
        assert_eq!(infer("r = d.get('reason')").as_deref(), Some("SessionEnd"));
        assert_eq!(infer("t = d['tool_name']").as_deref(), Some("PreToolUse"));
    }

    #[test]
    fn test_source_without_startup_is_not_session_start() {
        assert_eq!(infer("s = d['source']"), None);
    }

    #[test]
    fn test_nothing_matches_yields_none() {
        assert_eq!(infer("#!/bin/bash\necho hi\n"), None);
    }

    #[test]
    fn test_inference_is_deterministic() {
        let src = "# reason: cleanup\nr = d.get(\"reason\")\nprint('prompt')";
        let first = infer(src);
        for _ in 0..5 {
            assert_eq!(infer(src), first);
        }
        assert_eq!(first.as_deref(), Some("UserPromptSubmit"));
    }
}
