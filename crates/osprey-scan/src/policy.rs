//! Scoring policy for scan verdicts.

use serde::{Deserialize, Serialize};

fn default_error_penalty() -> f64 {
    0.5
}

fn default_warning_penalty() -> f64 {
    0.1
}

fn default_tool_confidence_floor() -> f64 {
    0.7
}

/// Confidence penalties and the tool-plugin pass threshold.
///
/// Confidence starts at 1.0 and loses `error_penalty` per error-severity
/// violation and `warning_penalty` per warning, clamped to `[0, 1]`. A
/// `tool` bundle passes with zero errors and confidence at or above
/// `tool_confidence_floor`; a `core` bundle passes only when spotless.
///
/// The stock values (0.5 / 0.1 / 0.7) are policy choices, not derived
/// quantities; they can be overridden from the `[scanner]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanPolicy {
    /// Confidence deducted per error-severity violation.
    #[serde(default = "default_error_penalty")]
    pub error_penalty: f64,
    /// Confidence deducted per warning-severity violation.
    #[serde(default = "default_warning_penalty")]
    pub warning_penalty: f64,
    /// Minimum confidence for a `tool` bundle to pass.
    #[serde(default = "default_tool_confidence_floor")]
    pub tool_confidence_floor: f64,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            error_penalty: default_error_penalty(),
            warning_penalty: default_warning_penalty(),
            tool_confidence_floor: default_tool_confidence_floor(),
        }
    }
}
