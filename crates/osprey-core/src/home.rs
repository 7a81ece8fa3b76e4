//! Global Osprey state directory.
//!
//! ```text
//! ~/.osprey/                    (OspreyHome)
//! ├── plugins/                    (user-installed plugin bundles)
//! └── config.toml                 (runtime config)
//! ```

use std::io;
use std::path::{Path, PathBuf};

/// Global home directory (`~/.osprey/` or `$OSPREY_HOME`).
#[derive(Debug, Clone)]
pub struct OspreyHome {
    root: PathBuf,
}

impl OspreyHome {
    /// Resolve the home directory.
    ///
    /// Checks `$OSPREY_HOME` first, then falls back to `$HOME/.osprey/`.
    ///
    /// # Errors
    ///
    /// Returns an error if `$OSPREY_HOME` is set but not absolute, or if
    /// neither `$OSPREY_HOME` nor `$HOME` is set.
    pub fn resolve() -> io::Result<Self> {
        let root = if let Ok(custom) = std::env::var("OSPREY_HOME") {
            let p = PathBuf::from(&custom);
            if !p.is_absolute() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "OSPREY_HOME must be an absolute path",
                ));
            }
            p
        } else {
            let home = std::env::var("HOME").map_err(|_| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    "neither OSPREY_HOME nor HOME environment variable is set",
                )
            })?;
            PathBuf::from(home).join(".osprey")
        };

        Ok(Self { root })
    }

    /// Create from an explicit path (useful for testing).
    #[must_use]
    pub fn from_path(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Ensure the directory structure exists.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure(&self) -> io::Result<()> {
        std::fs::create_dir_all(self.plugins_dir())
    }

    /// Root directory path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// User plugin bundles directory (`~/.osprey/plugins/`).
    #[must_use]
    pub fn plugins_dir(&self) -> PathBuf {
        self.root.join("plugins")
    }

    /// Path to the runtime configuration file (`~/.osprey/config.toml`).
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// `set_var`/`remove_var` are process-wide; serialize the tests that use them.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn resolve_honors_env_override() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_path_buf();

        // SAFETY: serialized by ENV_MUTEX
        unsafe { std::env::set_var("OSPREY_HOME", &path) };
        let home = OspreyHome::resolve().unwrap();
        assert_eq!(home.root(), path);
        unsafe { std::env::remove_var("OSPREY_HOME") };
    }

    #[test]
    fn resolve_defaults_under_home() {
        let _guard = ENV_MUTEX.lock().unwrap();
        // SAFETY: serialized by ENV_MUTEX
        unsafe { std::env::remove_var("OSPREY_HOME") };
        let home = OspreyHome::resolve().unwrap();
        let expected = PathBuf::from(std::env::var("HOME").unwrap()).join(".osprey");
        assert_eq!(home.root(), expected);
    }

    #[test]
    fn resolve_rejects_relative_override() {
        let _guard = ENV_MUTEX.lock().unwrap();
        // SAFETY: serialized by ENV_MUTEX
        unsafe { std::env::set_var("OSPREY_HOME", "relative/path") };
        let result = OspreyHome::resolve();
        assert!(result.is_err());
        unsafe { std::env::remove_var("OSPREY_HOME") };
    }

    #[test]
    fn ensure_creates_plugin_dir() {
        let dir = tempfile::tempdir().unwrap();
        let home = OspreyHome::from_path(dir.path());
        home.ensure().unwrap();
        assert!(home.plugins_dir().is_dir());
    }

    #[test]
    fn path_accessors() {
        let home = OspreyHome::from_path("/tmp/osprey-home");
        assert_eq!(home.plugins_dir(), PathBuf::from("/tmp/osprey-home/plugins"));
        assert_eq!(
            home.config_path(),
            PathBuf::from("/tmp/osprey-home/config.toml")
        );
    }
}
