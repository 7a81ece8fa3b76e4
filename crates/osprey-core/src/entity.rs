//! Result model handed back by tool adapters.
//!
//! Adapters convert a tool's raw output into [`Entity`] values (usernames,
//! emails, domains, ...) wrapped in a [`ToolResult`]. Correlation and
//! deduplication of entities happens elsewhere; this crate only defines the
//! wire shape.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_confidence() -> f64 {
    1.0
}

/// One piece of information discovered about a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Category, e.g. `username`, `email`, `domain`, `ip`, `phone`.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// The discovered value itself.
    pub value: String,
    /// Which tool produced it.
    pub source: String,
    /// How much the producing tool trusts this finding, 0.0–1.0.
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// Tool-specific extras (profile URL, breach name, ...).
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Entity {
    /// New entity with full confidence and no metadata.
    #[must_use]
    pub fn new(
        entity_type: impl Into<String>,
        value: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            value: value.into(),
            source: source.into(),
            confidence: 1.0,
            metadata: HashMap::new(),
        }
    }

    /// Override the confidence score.
    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Attach one metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Everything one adapter invocation produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Name of the tool that ran.
    pub tool: String,
    /// Extracted entities, possibly empty.
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// Combined stdout/stderr of the underlying run.
    #[serde(default)]
    pub raw_output: String,
    /// Set when the run failed; the adapter still returns a result.
    #[serde(default)]
    pub error: Option<String>,
    /// Adapter-specific extras (timing, mode used, ...).
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl ToolResult {
    /// Successful run with raw output and no entities yet.
    #[must_use]
    pub fn ok(tool: impl Into<String>, raw_output: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            entities: Vec::new(),
            raw_output: raw_output.into(),
            error: None,
            metadata: HashMap::new(),
        }
    }

    /// Failed run; the error message is carried in-band.
    #[must_use]
    pub fn failed(tool: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            entities: Vec::new(),
            raw_output: String::new(),
            error: Some(error.into()),
            metadata: HashMap::new(),
        }
    }

    /// Attach extracted entities.
    #[must_use]
    pub fn with_entities(mut self, entities: Vec<Entity>) -> Self {
        self.entities = entities;
        self
    }

    /// True when the run produced no in-band error.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_defaults_to_full_confidence() {
        let entity = Entity::new("username", "jdoe", "sherlock");
        assert!((entity.confidence - 1.0).abs() < f64::EPSILON);
        assert!(entity.metadata.is_empty());
    }

    #[test]
    fn entity_confidence_is_clamped() {
        let entity = Entity::new("email", "a@b.c", "theharvester").with_confidence(3.0);
        assert!((entity.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn entity_serializes_type_field() {
        let entity = Entity::new("domain", "example.com", "subfinder");
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["type"], "domain");
        assert_eq!(json["confidence"], 1.0);
    }

    #[test]
    fn entity_deserializes_without_optional_fields() {
        let entity: Entity = serde_json::from_str(
            r#"{"type": "ip", "value": "192.0.2.1", "source": "shodan"}"#,
        )
        .unwrap();
        assert!((entity.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tool_result_success_and_failure() {
        let ok = ToolResult::ok("sherlock", "found 3 profiles");
        assert!(ok.is_success());
        assert_eq!(ok.raw_output, "found 3 profiles");

        let failed = ToolResult::failed("sherlock", "binary not found");
        assert!(!failed.is_success());
        assert_eq!(failed.error.as_deref(), Some("binary not found"));
    }

    #[test]
    fn tool_result_round_trips() {
        let result = ToolResult::ok("holehe", "out").with_entities(vec![Entity::new(
            "email",
            "a@b.c",
            "holehe",
        )]);
        let json = serde_json::to_string(&result).unwrap();
        let back: ToolResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
