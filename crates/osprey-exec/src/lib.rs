//! Isolated execution backends for vetted OSINT tools.
//!
//! Tool adapters never spawn processes themselves — the security scanner
//! rejects bundles that try. Instead every command line goes through an
//! [`ExecutionStrategy`], a closed set of three backends:
//!
//! - [`NativeExecutor`]: child process on the host, resolved from the
//!   search path
//! - [`ContainerExecutor`]: container run through a [`ContainerManager`]
//!   collaborator, with a trusted tool-to-image mapping plugins can extend
//!   but never shadow
//! - Hybrid: native preferred, container as fallback
//!
//! Both backends share the same proxy sanitization: a malformed
//! `proxy_url` is skipped with a warning, never an error.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod config;
pub mod container;
pub mod docker_cli;
pub mod error;
pub mod manager;
pub mod native;
pub mod proxy;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testing;

pub use config::RunConfig;
pub use container::ContainerExecutor;
pub use docker_cli::DockerCli;
pub use error::{ExecError, ExecResult};
pub use manager::ContainerManager;
pub use native::NativeExecutor;
pub use strategy::ExecutionStrategy;
