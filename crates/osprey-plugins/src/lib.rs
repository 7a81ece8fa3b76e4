//! Plugin bundle discovery, vetting, and loading.
//!
//! A bundle is a directory holding a `plugin.json` descriptor and one or
//! more Python tool scripts. The [`PluginLoader`] walks the configured
//! plugin roots, scans every source file of a candidate bundle with the
//! security scanner, registers any declared container image with the
//! execution strategy, and instantiates the bundle's adapter from the
//! compiled-in [`AdapterCatalog`]. Failures are scoped per bundle: one bad
//! plugin is logged and skipped, never fatal to the discovery run.
//!
//! Loaded adapters live in an [`AdapterRegistry`] and run through the
//! bounded [`BatchExecutor`].

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod adapter;
pub mod catalog;
pub mod error;
pub mod executor;
pub mod loader;
pub mod manifest;
pub mod registry;

pub use adapter::{CommandAdapter, ToolAdapter};
pub use catalog::{AdapterCatalog, AdapterFactory};
pub use error::{PluginError, PluginResult};
pub use executor::{BatchExecutor, ToolRequest, ToolRun};
pub use loader::{PluginLoader, python_sources};
pub use manifest::PluginManifest;
pub use registry::AdapterRegistry;
