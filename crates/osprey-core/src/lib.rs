//! Core types and collaborator traits for the Osprey OSINT runtime.
//!
//! Everything in this crate is shared vocabulary between the vetting,
//! execution, and loading layers:
//!
//! - [`PluginKind`] / [`ExecutionMode`]: trust tier and backend selection
//! - [`Entity`] / [`ToolResult`]: what tool adapters hand back to the host
//! - [`CredentialStore`]: narrow read-only credential lookup seam
//! - [`OspreyHome`]: global state directory (`~/.osprey/` or `$OSPREY_HOME`)
//!
//! The crate stays leaf-level on purpose: no execution, no I/O beyond
//! environment and directory resolution.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod credentials;
pub mod entity;
pub mod home;
pub mod kinds;

pub use credentials::{CredentialStore, EnvCredentialStore, StaticCredentialStore};
pub use entity::{Entity, ToolResult};
pub use home::OspreyHome;
pub use kinds::{ExecutionMode, PluginKind};
