//! Event schema registry and sample payload catalog.
//!
//! Both are plain immutable values. The engine receives them through a
//! `ValidationContext`, so tests can swap in their own registry or payloads.

use serde_json::{json, Value as Json};
use std::collections::HashMap;

/// Payload shape and capabilities of one lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSpec {
    pub name: &'static str,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
    pub has_matcher: bool,
    pub can_block: bool,
}

const TOOL_OPTIONAL: &[&str] = &["tool_use_id", "session_id"];
const STOP_OPTIONAL: &[&str] = &["transcript_path", "session_id"];
const SESSION_ONLY: &[&str] = &["session_id"];

const BUILTIN_EVENTS: &[EventSpec] = &[
    EventSpec {
        name: "PreToolUse",
        required: &["tool_name", "tool_input"],
        optional: TOOL_OPTIONAL,
        has_matcher: true,
        can_block: true,
    },
    EventSpec {
        name: "PostToolUse",
        required: &["tool_name", "tool_input", "tool_response"],
        optional: TOOL_OPTIONAL,
        has_matcher: true,
        can_block: false,
    },
    EventSpec {
        name: "UserPromptSubmit",
        required: &["prompt"],
        optional: SESSION_ONLY,
        has_matcher: false,
        can_block: true,
    },
    EventSpec {
        name: "Stop",
        required: &["stop_hook_active"],
        optional: STOP_OPTIONAL,
        has_matcher: false,
        can_block: true,
    },
    EventSpec {
        name: "SubagentStop",
        required: &["stop_hook_active"],
        optional: STOP_OPTIONAL,
        has_matcher: false,
        can_block: true,
    },
    EventSpec {
        name: "SessionStart",
        required: &["source"],
        optional: SESSION_ONLY,
        has_matcher: true,
        can_block: false,
    },
    EventSpec {
        name: "SessionEnd",
        required: &["reason"],
        optional: SESSION_ONLY,
        has_matcher: false,
        can_block: false,
    },
    EventSpec {
        name: "PermissionRequest",
        required: &["tool_name", "tool_input"],
        optional: TOOL_OPTIONAL,
        has_matcher: true,
        can_block: true,
    },
    EventSpec {
        name: "PreCompact",
        required: &["trigger"],
        optional: &["custom_instructions", "session_id"],
        has_matcher: true,
        can_block: false,
    },
    EventSpec {
        name: "Notification",
        required: &["message", "notification_type"],
        optional: SESSION_ONLY,
        has_matcher: true,
        can_block: false,
    },
];

/// Read-only lookup table of known events.
#[derive(Debug, Clone)]
pub struct EventRegistry {
    specs: Vec<EventSpec>,
}

impl EventRegistry {
    pub fn new(specs: Vec<EventSpec>) -> Self {
        Self { specs }
    }

    /// Registry with every event the framework defines.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_EVENTS.to_vec())
    }

    pub fn get(&self, name: &str) -> Option<&EventSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.iter().map(|s| s.name)
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Representative stdin payloads used by the runtime probe.
#[derive(Debug, Clone)]
pub struct SamplePayloads {
    payloads: HashMap<String, Json>,
}

impl SamplePayloads {
    pub fn empty() -> Self {
        Self {
            payloads: HashMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let write_input = json!({"file_path": "/tmp/test.txt", "content": "test"});
        Self::empty()
            .with(
                "PreToolUse",
                json!({
                    "hook_event_name": "PreToolUse",
                    "tool_name": "Write",
                    "tool_input": write_input.clone(),
                    "tool_use_id": "test-123",
                    "session_id": "session-abc",
                }),
            )
            .with(
                "PostToolUse",
                json!({
                    "hook_event_name": "PostToolUse",
                    "tool_name": "Write",
                    "tool_input": write_input,
                    "tool_response": {"success": true},
                    "tool_use_id": "test-123",
                    "session_id": "session-abc",
                }),
            )
            .with(
                "UserPromptSubmit",
                json!({
                    "hook_event_name": "UserPromptSubmit",
                    "prompt": "Hello, world!",
                    "session_id": "session-abc",
                }),
            )
            .with("Stop", stop_payload("Stop"))
            .with("SubagentStop", stop_payload("SubagentStop"))
            .with(
                "SessionStart",
                json!({
                    "hook_event_name": "SessionStart",
                    "source": "startup",
                    "session_id": "session-abc",
                }),
            )
            .with(
                "SessionEnd",
                json!({
                    "hook_event_name": "SessionEnd",
                    "reason": "logout",
                    "session_id": "session-abc",
                }),
            )
            .with(
                "PermissionRequest",
                json!({
                    "hook_event_name": "PermissionRequest",
                    "tool_name": "Bash",
                    "tool_input": {"command": "ls -la"},
                    "tool_use_id": "test-123",
                    "session_id": "session-abc",
                }),
            )
            .with(
                "PreCompact",
                json!({
                    "hook_event_name": "PreCompact",
                    "trigger": "manual",
                    "custom_instructions": "",
                    "session_id": "session-abc",
                }),
            )
            .with(
                "Notification",
                json!({
                    "hook_event_name": "Notification",
                    "message": "Test notification",
                    "notification_type": "idle_prompt",
                    "session_id": "session-abc",
                }),
            )
    }

    /// Replace or add the payload for `event`.
    pub fn with(mut self, event: &str, payload: Json) -> Self {
        self.payloads.insert(event.to_string(), payload);
        self
    }

    /// Payload for `event`; unknown events get a bare `hook_event_name` object.
    pub fn payload_for(&self, event: &str) -> Json {
        self.payloads
            .get(event)
            .cloned()
            .unwrap_or_else(|| json!({ "hook_event_name": event }))
    }
}

impl Default for SamplePayloads {
    fn default() -> Self {
        Self::builtin()
    }
}

fn stop_payload(event: &str) -> Json {
    json!({
        "hook_event_name": event,
        "stop_hook_active": false,
        "transcript_path": "/tmp/transcript.json",
        "session_id": "session-abc",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_builtin_event_has_a_required_field() {
        let reg = EventRegistry::builtin();
        assert_eq!(reg.names().count(), 10);
        for name in reg.names() {
            let spec = reg.get(name).unwrap();
            assert!(!spec.required.is_empty(), "{} has no required fields", name);
        }
    }

    #[test]
    fn test_unknown_event_lookup_fails() {
        let reg = EventRegistry::builtin();
        assert!(reg.get("PreToolUsed").is_none());
        assert!(reg.get("pretooluse").is_none());
        assert!(reg.get("").is_none());
    }

    #[test]
    fn test_sample_payloads_cover_required_fields() {
        let reg = EventRegistry::builtin();
        let samples = SamplePayloads::builtin();
        for name in reg.names() {
            let payload = samples.payload_for(name);
            assert_eq!(payload["hook_event_name"], name);
            for field in reg.get(name).unwrap().required {
                assert!(payload.get(*field).is_some(), "{} sample lacks {}", name, field);
            }
        }
    }

    #[test]
    fn test_unknown_event_payload_falls_back() {
        let samples = SamplePayloads::empty().with("Stop", json!({"x": 1}));
        assert_eq!(samples.payload_for("Stop"), json!({"x": 1}));
        assert_eq!(
            samples.payload_for("Custom"),
            json!({"hook_event_name": "Custom"})
        );
    }
}
