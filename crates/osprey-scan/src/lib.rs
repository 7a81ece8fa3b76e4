//! Static security analysis of plugin bundle sources.
//!
//! Plugin bundles ship Python scripts written by third parties. Before a
//! bundle is ever loaded, every one of its source files is parsed into a
//! syntax tree and walked against a denylist of operations that bypass the
//! host's approved channels: shell execution, raw network access, dangerous
//! imports, dynamic evaluation, direct environment or filesystem access.
//!
//! The verdict is a [`ScanResult`] with a confidence score derived from the
//! violation counts under a configurable [`ScanPolicy`]. The pass bar is
//! kind-dependent: `core` bundles must come back spotless, `tool` bundles
//! tolerate a few warnings because their commands run through a sandboxed
//! execution backend anyway.
//!
//! This is a best-effort gate over syntactic patterns, not a soundness
//! proof: a determined author can hide a forbidden call behind indirection.
//! The isolation boundary for untrusted code remains the container backend.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod policy;
pub mod report;
pub mod scanner;

pub use policy::ScanPolicy;
pub use report::{Rule, ScanResult, SecurityViolation, Severity};
pub use scanner::SecurityScanner;
