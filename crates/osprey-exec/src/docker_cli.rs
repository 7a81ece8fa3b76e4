//! [`ContainerManager`] implementation shelling out to the docker CLI.

use std::collections::HashMap;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{ExecError, ExecResult};
use crate::manager::ContainerManager;

/// Docker CLI front end.
///
/// Availability is probed once at construction (`docker version`) and
/// cached; a daemon that comes up later requires a new probe.
#[derive(Debug, Clone)]
pub struct DockerCli {
    available: bool,
}

impl DockerCli {
    /// Probe the docker daemon and cache the result.
    #[must_use]
    pub fn probe() -> Self {
        let available = std::process::Command::new("docker")
            .arg("version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false);

        debug!(available, "probed docker daemon");
        Self { available }
    }
}

#[async_trait]
impl ContainerManager for DockerCli {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn run(
        &self,
        image: &str,
        args: &[String],
        env: &HashMap<String, String>,
    ) -> ExecResult<String> {
        let mut command = Command::new("docker");
        command.arg("run").arg("--rm");

        // Sorted for a stable command line in logs and tests.
        let mut env_pairs: Vec<_> = env.iter().collect();
        env_pairs.sort_by_key(|(key, _)| key.as_str());
        for (key, value) in env_pairs {
            command.arg("-e").arg(format!("{key}={value}"));
        }

        command.arg(image).args(args);
        command.stdin(Stdio::null());

        debug!(image, ?args, "running container");
        let output = command
            .output()
            .await
            .map_err(|err| ExecError::ContainerRuntime(format!("docker run failed: {err}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            warn!(image, code = output.status.code(), "container exited non-zero");
        }

        let mut combined = stdout.into_owned();
        if !stderr.is_empty() {
            if !combined.is_empty() {
                combined.push('\n');
            }
            combined.push_str(&stderr);
        }
        Ok(combined)
    }
}
