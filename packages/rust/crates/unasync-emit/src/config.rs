//! Emitter configuration.
//!
//! Defaults describe the Tideline layout. An optional `unasync.yaml` in the
//! source root overlays the layout fields; the rename tables themselves are
//! not configurable.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Source root used when the CLI is given none.
pub const DEFAULT_SOURCE_ROOT: &str = "src/tideline";
/// Optional settings file inside the source root.
pub const SETTINGS_FILE: &str = "unasync.yaml";

const DEFAULT_MIRROR: &str = "_sync";
const DEFAULT_MODULES: &[&str] = &["client.py", "registry.py", "_pagination.py"];
const DEFAULT_RESOURCES_DIR: &str = "resources";
const DEFAULT_EXTENSION: &str = "py";
const DEFAULT_REGENERATE_COMMAND: &str = "make sync";
const DEFAULT_CLIENT_MODULE: &str = "client";
const DEFAULT_REGISTRY_MODULE: &str = "registry";
const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Where to read async sources and how to lay out the mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitConfig {
    /// Async package directory.
    pub source_root: PathBuf,
    /// Importable package name, the source root's directory name by default.
    pub package: String,
    /// Mirror subdirectory of the source root.
    pub mirror: String,
    /// Fixed top-level modules, relative to the source root.
    pub modules: Vec<String>,
    /// Flat directory of per-resource modules.
    pub resources_dir: String,
    /// Extension of resource modules.
    pub extension: String,
    /// Command named in the banner of every generated file.
    pub regenerate_command: String,
    /// Module holding the entry-point type, without extension.
    pub client_module: String,
    /// Module holding the factory functions, without extension.
    pub registry_module: String,
    /// Largest source file accepted, in bytes.
    pub max_file_size: u64,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self::for_root(DEFAULT_SOURCE_ROOT)
    }
}

impl EmitConfig {
    /// Default layout for `source_root`.
    #[must_use]
    pub fn for_root<P: AsRef<Path>>(source_root: P) -> Self {
        let source_root = source_root.as_ref().to_path_buf();
        let package = source_root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "tideline".to_string());
        Self {
            source_root,
            package,
            mirror: DEFAULT_MIRROR.to_string(),
            modules: DEFAULT_MODULES.iter().map(ToString::to_string).collect(),
            resources_dir: DEFAULT_RESOURCES_DIR.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            regenerate_command: DEFAULT_REGENERATE_COMMAND.to_string(),
            client_module: DEFAULT_CLIENT_MODULE.to_string(),
            registry_module: DEFAULT_REGISTRY_MODULE.to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Default layout for `source_root` with its `unasync.yaml` applied.
    #[must_use]
    pub fn load<P: AsRef<Path>>(source_root: P) -> Self {
        let source_root = source_root.as_ref();
        Self::for_root(source_root).with_settings(load_settings(&source_root.join(SETTINGS_FILE)))
    }

    /// Overlay settings; unset fields keep their current value.
    #[must_use]
    pub fn with_settings(self, settings: EmitSettings) -> Self {
        Self {
            source_root: self.source_root,
            package: settings.package.unwrap_or(self.package),
            mirror: settings.mirror.unwrap_or(self.mirror),
            modules: settings.modules.unwrap_or(self.modules),
            resources_dir: settings.resources_dir.unwrap_or(self.resources_dir),
            extension: settings.extension.unwrap_or(self.extension),
            regenerate_command: settings
                .regenerate_command
                .unwrap_or(self.regenerate_command),
            client_module: settings.client_module.unwrap_or(self.client_module),
            registry_module: settings.registry_module.unwrap_or(self.registry_module),
            max_file_size: settings.max_file_size.unwrap_or(self.max_file_size),
        }
    }

    /// Live mirror directory.
    #[must_use]
    pub fn mirror_root(&self) -> PathBuf {
        self.source_root.join(&self.mirror)
    }

    /// Directory the next mirror is built in before publishing.
    #[must_use]
    pub fn staging_root(&self) -> PathBuf {
        self.source_root.join(format!(".{}.staging", self.mirror))
    }

    /// First line of every generated file.
    #[must_use]
    pub fn banner(&self) -> String {
        format!(
            "# AUTO-GENERATED — do not edit. Run '{}' to regenerate.\n",
            self.regenerate_command
        )
    }

    /// Dotted import path of a mirror module.
    #[must_use]
    pub fn mirror_module(&self, module: &str) -> String {
        format!("{}.{}.{module}", self.package, self.mirror)
    }

    /// Relative path of a top-level module named without extension.
    #[must_use]
    pub fn module_file(&self, module: &str) -> PathBuf {
        PathBuf::from(format!("{module}.{}", self.extension))
    }
}

/// Contents of `unasync.yaml`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmitSettings {
    /// See [`EmitConfig::package`].
    pub package: Option<String>,
    /// See [`EmitConfig::mirror`].
    pub mirror: Option<String>,
    /// See [`EmitConfig::modules`].
    pub modules: Option<Vec<String>>,
    /// See [`EmitConfig::resources_dir`].
    pub resources_dir: Option<String>,
    /// See [`EmitConfig::extension`].
    pub extension: Option<String>,
    /// See [`EmitConfig::regenerate_command`].
    pub regenerate_command: Option<String>,
    /// See [`EmitConfig::client_module`].
    pub client_module: Option<String>,
    /// See [`EmitConfig::registry_module`].
    pub registry_module: Option<String>,
    /// See [`EmitConfig::max_file_size`].
    pub max_file_size: Option<u64>,
}

/// Read settings from `path`. A missing, unreadable or invalid file yields
/// empty settings.
#[must_use]
pub fn load_settings(path: &Path) -> EmitSettings {
    if !path.exists() {
        return EmitSettings::default();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to read settings file; ignoring"
            );
            return EmitSettings::default();
        }
    };
    if raw.trim().is_empty() {
        return EmitSettings::default();
    }
    match serde_yaml::from_str::<EmitSettings>(&raw) {
        Ok(value) => {
            tracing::debug!(path = %path.display(), "loaded settings");
            value
        }
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to parse settings yaml; ignoring file"
            );
            EmitSettings::default()
        }
    }
}
