//! Shared test doubles for the execution backends.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::ExecResult;
use crate::manager::ContainerManager;

/// Scripted [`ContainerManager`] spy.
pub(crate) struct FakeContainerManager {
    available: bool,
    output: String,
    runs: AtomicUsize,
    last: Mutex<Option<(String, Vec<String>, HashMap<String, String>)>>,
}

impl FakeContainerManager {
    /// Reachable runtime that answers every run with `output`.
    pub(crate) fn up(output: &str) -> Self {
        Self {
            available: true,
            output: output.to_string(),
            runs: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    /// Unreachable runtime.
    pub(crate) fn down() -> Self {
        Self {
            available: false,
            output: String::new(),
            runs: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    /// How many times `run` was invoked.
    pub(crate) fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    /// Image of the most recent run.
    pub(crate) fn last_image(&self) -> Option<String> {
        self.last
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|(image, _, _)| image.clone()))
    }

    /// Environment of the most recent run.
    pub(crate) fn last_env(&self) -> HashMap<String, String> {
        self.last
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|(_, _, env)| env.clone()))
            .unwrap_or_default()
    }
}

#[async_trait]
impl ContainerManager for FakeContainerManager {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn run(
        &self,
        image: &str,
        args: &[String],
        env: &HashMap<String, String>,
    ) -> ExecResult<String> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last.lock() {
            *guard = Some((image.to_string(), args.to_vec(), env.clone()));
        }
        Ok(self.output.clone())
    }
}
