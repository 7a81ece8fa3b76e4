//! Syntax-tree denylist walk over Python sources.

use std::path::Path;

use osprey_core::PluginKind;
use tracing::{debug, warn};
use tree_sitter::{Language, Node, Parser};

use crate::policy::ScanPolicy;
use crate::report::{Rule, ScanResult, SecurityViolation, Severity};

/// Modules whose import alone fails a bundle.
const DANGEROUS_MODULES: &[&str] = &["socket", "telnetlib", "ftplib"];

/// Members of the `subprocess` module that spawn processes.
const SUBPROCESS_SPAWNERS: &[&str] = &["run", "call", "check_call", "check_output", "Popen"];

/// Static analyzer for plugin bundle sources.
///
/// Stateless apart from its [`ScanPolicy`]; safe to share and reuse across
/// files. Every failure mode folds into a failing [`ScanResult`] — the
/// scanner never panics and never lets an unreadable file pass.
pub struct SecurityScanner {
    policy: ScanPolicy,
    language: Language,
}

impl Default for SecurityScanner {
    fn default() -> Self {
        Self::new(ScanPolicy::default())
    }
}

impl SecurityScanner {
    /// Scanner with an explicit scoring policy.
    #[must_use]
    pub fn new(policy: ScanPolicy) -> Self {
        Self {
            policy,
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }

    /// Active scoring policy.
    #[must_use]
    pub fn policy(&self) -> &ScanPolicy {
        &self.policy
    }

    /// Scan one source file with the pass bar of the given plugin kind.
    ///
    /// An unreadable file yields a failing verdict with a single
    /// "Scanner Error" finding rather than an error.
    #[must_use]
    pub fn scan_file(&self, path: &Path, kind: PluginKind) -> ScanResult {
        match std::fs::read_to_string(path) {
            Ok(source) => {
                let result = self.scan_source(&source, kind);
                debug!(
                    path = %path.display(),
                    passed = result.passed,
                    confidence = result.confidence,
                    findings = result.violation_count(),
                    "scanned plugin source"
                );
                result
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not read plugin source");
                ScanResult::rejected(SecurityViolation::new(
                    Rule::ScannerError,
                    Severity::Error,
                    0,
                    "",
                    format!("Could not read file: {err}"),
                ))
            },
        }
    }

    /// Scan an in-memory source string with the pass bar of the given kind.
    #[must_use]
    pub fn scan_source(&self, source: &str, kind: PluginKind) -> ScanResult {
        let mut parser = Parser::new();
        if parser.set_language(&self.language).is_err() {
            return ScanResult::rejected(SecurityViolation::new(
                Rule::ScannerError,
                Severity::Error,
                0,
                "",
                "Python grammar was rejected by the parser.",
            ));
        }

        let Some(tree) = parser.parse(source, None) else {
            return ScanResult::rejected(SecurityViolation::new(
                Rule::ScannerError,
                Severity::Error,
                0,
                "",
                "Parser produced no syntax tree.",
            ));
        };

        let root = tree.root_node();
        let lines: Vec<&str> = source.lines().collect();

        if root.has_error() {
            let row = first_error_row(root);
            let snippet = lines.get(row).map(|l| l.trim()).unwrap_or_default();
            return ScanResult::rejected(SecurityViolation::new(
                Rule::SyntaxError,
                Severity::Error,
                row.saturating_add(1),
                snippet,
                "File could not be parsed as Python.",
            ));
        }

        let mut walk = DenylistWalk {
            source: source.as_bytes(),
            lines,
            violations: Vec::new(),
        };
        walk.visit(root);

        ScanResult::evaluate(&self.policy, kind, walk.violations)
    }
}

impl std::fmt::Debug for SecurityScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityScanner")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Row (0-based) of the first error or missing node in the tree.
fn first_error_row(node: Node<'_>) -> usize {
    if node.is_error() || node.is_missing() {
        return node.start_position().row;
    }
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.has_error() {
                return first_error_row(child);
            }
        }
    }
    node.start_position().row
}

/// Recursive walk collecting denylist findings.
struct DenylistWalk<'a> {
    source: &'a [u8],
    lines: Vec<&'a str>,
    violations: Vec<SecurityViolation>,
}

impl DenylistWalk<'_> {
    fn visit(&mut self, node: Node<'_>) {
        match node.kind() {
            "call" => self.check_call(node),
            "attribute" => self.check_attribute(node),
            "import_statement" => self.check_import(node),
            "import_from_statement" => self.check_import_from(node),
            _ => {},
        }
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                self.visit(child);
            }
        }
    }

    fn text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn push(&mut self, rule: Rule, severity: Severity, node: Node<'_>, message: impl Into<String>) {
        let row = node.start_position().row;
        let snippet = self.lines.get(row).map(|l| l.trim()).unwrap_or_default();
        self.violations.push(SecurityViolation::new(
            rule,
            severity,
            row.saturating_add(1),
            snippet,
            message,
        ));
    }

    fn check_call(&mut self, call: Node<'_>) {
        let Some(func) = call.child_by_field_name("function") else {
            return;
        };

        match func.kind() {
            "identifier" => match self.text(func) {
                "eval" | "exec" => self.push(
                    Rule::DangerousBuiltin,
                    Severity::Error,
                    call,
                    "Dynamic code evaluation is forbidden.",
                ),
                "open" => self.push(
                    Rule::FileSystemAccess,
                    Severity::Warning,
                    call,
                    "Direct file access; confine file operations to allowed directories.",
                ),
                _ => {},
            },
            "attribute" => self.check_attribute_call(call, func),
            _ => {},
        }
    }

    fn check_attribute_call(&mut self, call: Node<'_>, func: Node<'_>) {
        let Some(object) = func.child_by_field_name("object") else {
            return;
        };
        let Some(attr) = func.child_by_field_name("attribute") else {
            return;
        };
        let attr_name = self.text(attr);

        match object.kind() {
            "identifier" => {
                let obj_name = self.text(object);
                match (obj_name, attr_name) {
                    ("os", "system") => self.push(
                        Rule::CommandInjection,
                        Severity::Error,
                        call,
                        "Direct use of os.system() is forbidden. Use ExecutionStrategy.",
                    ),
                    ("os", "getenv") => self.push(
                        Rule::CredentialAccess,
                        Severity::Warning,
                        call,
                        "Direct environment access; use the credential store.",
                    ),
                    ("subprocess", name) if SUBPROCESS_SPAWNERS.contains(&name) => {
                        if call_has_shell_true(call, self.source) {
                            self.push(
                                Rule::CommandInjection,
                                Severity::Error,
                                call,
                                format!(
                                    "subprocess.{name}() with shell=True is forbidden. \
                                     Use ExecutionStrategy."
                                ),
                            );
                        }
                    },
                    ("requests", _) => self.push(
                        Rule::NetworkAccess,
                        Severity::Error,
                        call,
                        "Direct network access is forbidden. Use ExecutionStrategy.",
                    ),
                    ("urllib", "request") => self.push(
                        Rule::NetworkAccess,
                        Severity::Error,
                        call,
                        "Direct network access is forbidden. Use ExecutionStrategy.",
                    ),
                    _ => {},
                }
            },
            // Nested chains like urllib.request.urlopen(...).
            "attribute" => {
                let inner_obj = object.child_by_field_name("object");
                let inner_attr = object.child_by_field_name("attribute");
                if let (Some(obj), Some(attr)) = (inner_obj, inner_attr) {
                    if obj.kind() == "identifier"
                        && self.text(obj) == "urllib"
                        && self.text(attr) == "request"
                    {
                        self.push(
                            Rule::NetworkAccess,
                            Severity::Error,
                            call,
                            "Direct network access is forbidden. Use ExecutionStrategy.",
                        );
                    }
                }
            },
            _ => {},
        }
    }

    /// `os.environ` in any position: attribute chains, subscripts, bare reads.
    fn check_attribute(&mut self, node: Node<'_>) {
        let object = node.child_by_field_name("object");
        let attr = node.child_by_field_name("attribute");
        if let (Some(object), Some(attr)) = (object, attr) {
            if object.kind() == "identifier"
                && self.text(object) == "os"
                && self.text(attr) == "environ"
            {
                self.push(
                    Rule::CredentialAccess,
                    Severity::Warning,
                    node,
                    "Direct environment access; use the credential store.",
                );
            }
        }
    }

    fn check_import(&mut self, node: Node<'_>) {
        for i in 0..node.named_child_count() {
            let Some(child) = node.named_child(i) else {
                continue;
            };
            let target = match child.kind() {
                "dotted_name" => Some(child),
                "aliased_import" => child.child_by_field_name("name"),
                _ => None,
            };
            if let Some(name) = target {
                self.check_module_name(name, node);
            }
        }
    }

    fn check_import_from(&mut self, node: Node<'_>) {
        if let Some(module) = node.child_by_field_name("module_name") {
            if module.kind() == "dotted_name" {
                self.check_module_name(module, node);
            }
        }
    }

    fn check_module_name(&mut self, name: Node<'_>, statement: Node<'_>) {
        let text = self.text(name);
        let top_level = text.split('.').next().unwrap_or(text);
        if DANGEROUS_MODULES.contains(&top_level) {
            self.push(
                Rule::DangerousImport,
                Severity::Error,
                statement,
                format!("Importing '{top_level}' is forbidden. Use ExecutionStrategy."),
            );
        }
    }
}

/// True when the call carries an explicit `shell=True` keyword argument.
fn call_has_shell_true(call: Node<'_>, source: &[u8]) -> bool {
    let Some(args) = call.child_by_field_name("arguments") else {
        return false;
    };
    for i in 0..args.named_child_count() {
        let Some(arg) = args.named_child(i) else {
            continue;
        };
        if arg.kind() != "keyword_argument" {
            continue;
        }
        let is_shell = arg
            .child_by_field_name("name")
            .is_some_and(|n| n.utf8_text(source) == Ok("shell"));
        let is_true = arg
            .child_by_field_name("value")
            .is_some_and(|v| v.kind() == "true");
        if is_shell && is_true {
            return true;
        }
    }
    false
}
