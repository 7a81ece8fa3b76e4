//! Scan findings and verdicts.

use osprey_core::PluginKind;
use serde::{Deserialize, Serialize};

use crate::policy::ScanPolicy;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fails the bundle outright, regardless of kind.
    Error,
    /// Tolerated for `tool` bundles up to the confidence floor.
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// Denylist category a finding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    /// Shell execution (`os.system`, `subprocess` with `shell=True`).
    #[serde(rename = "Command Injection")]
    CommandInjection,
    /// Raw HTTP client use that bypasses the execution backend.
    #[serde(rename = "Network Access")]
    NetworkAccess,
    /// Importing raw socket/telnet/ftp modules.
    #[serde(rename = "Dangerous Import")]
    DangerousImport,
    /// Dynamic code evaluation (`eval`, `exec`).
    #[serde(rename = "Dangerous Builtin")]
    DangerousBuiltin,
    /// Direct environment-variable access.
    #[serde(rename = "Credential Access")]
    CredentialAccess,
    /// Direct filesystem `open`.
    #[serde(rename = "File System Access")]
    FileSystemAccess,
    /// The file could not be parsed at all.
    #[serde(rename = "Syntax Error")]
    SyntaxError,
    /// The scanner itself could not process the file.
    #[serde(rename = "Scanner Error")]
    ScannerError,
}

impl Rule {
    /// Human-readable category name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CommandInjection => "Command Injection",
            Self::NetworkAccess => "Network Access",
            Self::DangerousImport => "Dangerous Import",
            Self::DangerousBuiltin => "Dangerous Builtin",
            Self::CredentialAccess => "Credential Access",
            Self::FileSystemAccess => "File System Access",
            Self::SyntaxError => "Syntax Error",
            Self::ScannerError => "Scanner Error",
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One static-analysis finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityViolation {
    /// Denylist category.
    pub rule: Rule,
    /// Error or warning.
    pub severity: Severity,
    /// 1-based source line (0 when unknown).
    pub line: usize,
    /// Trimmed source line the finding points at.
    pub snippet: String,
    /// What was found and which approved channel to use instead.
    pub message: String,
}

impl SecurityViolation {
    /// New finding.
    #[must_use]
    pub fn new(
        rule: Rule,
        severity: Severity,
        line: usize,
        snippet: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule,
            severity,
            line,
            snippet: snippet.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SecurityViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: [{}] {}: {}",
            self.line, self.severity, self.rule, self.message
        )
    }
}

/// Aggregate verdict for one source file or one bundle.
///
/// For a single file the verdict derives deterministically from the
/// violation counts under the active [`ScanPolicy`]. A bundle verdict is
/// the conjunction of its per-file verdicts (see [`ScanResult::merge`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Whether the pass bar for the scanned kind was met.
    pub passed: bool,
    /// Scalar safety estimate, 0.0–1.0.
    pub confidence: f64,
    /// Error-severity findings, in source order.
    pub errors: Vec<SecurityViolation>,
    /// Warning-severity findings, in source order.
    pub warnings: Vec<SecurityViolation>,
}

impl ScanResult {
    /// Verdict for a file that produced no findings at all.
    #[must_use]
    pub fn clean() -> Self {
        Self {
            passed: true,
            confidence: 1.0,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Evaluate findings against the policy for the given plugin kind.
    #[must_use]
    pub fn evaluate(
        policy: &ScanPolicy,
        kind: PluginKind,
        violations: Vec<SecurityViolation>,
    ) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = violations
            .into_iter()
            .partition(|v| v.severity == Severity::Error);

        #[allow(clippy::cast_precision_loss)]
        let confidence = (1.0
            - policy.error_penalty * errors.len() as f64
            - policy.warning_penalty * warnings.len() as f64)
            .clamp(0.0, 1.0);

        let passed = match kind {
            PluginKind::Core => errors.is_empty() && warnings.is_empty(),
            PluginKind::Tool => errors.is_empty() && confidence >= policy.tool_confidence_floor,
        };

        Self {
            passed,
            confidence,
            errors,
            warnings,
        }
    }

    /// Fail-closed verdict: the file could not be analyzed at all.
    ///
    /// Used for unparseable or unreadable files; confidence is forced to
    /// 0.0 rather than derived from the single carried violation.
    #[must_use]
    pub fn rejected(violation: SecurityViolation) -> Self {
        Self {
            passed: false,
            confidence: 0.0,
            errors: vec![violation],
            warnings: Vec::new(),
        }
    }

    /// Fold per-file verdicts into a bundle verdict.
    ///
    /// The bundle passes only when every file passed; confidence is the
    /// minimum across files (1.0 for an empty bundle); findings are
    /// concatenated in file order.
    #[must_use]
    pub fn merge(results: impl IntoIterator<Item = Self>) -> Self {
        let mut merged = Self::clean();
        for result in results {
            merged.passed = merged.passed && result.passed;
            merged.confidence = merged.confidence.min(result.confidence);
            merged.errors.extend(result.errors);
            merged.warnings.extend(result.warnings);
        }
        merged
    }

    /// Total number of findings of either severity.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.errors.len().saturating_add(self.warnings.len())
    }

    /// All findings, errors first, each in source order.
    pub fn all_violations(&self) -> impl Iterator<Item = &SecurityViolation> {
        self.errors.iter().chain(self.warnings.iter())
    }
}
