//! Configuration loading and discovery.
//!
//! This module provides configuration file discovery by:
//! 1. Walking up from the current directory to find project config
//! 2. Loading user config from XDG config directory
//! 3. Picking up the `"changelog"` object of the project's `package.json`
//! 4. Merging with sensible defaults
//!
//! # Supported formats
//!
//! - TOML (`.toml`)
//! - YAML (`.yaml`, `.yml`)
//! - JSON (`.json`)
//!
//! # Config file locations (in order of precedence, highest first):
//! - files passed explicitly (`--config`)
//! - `.changeling.<ext>` in current directory or any parent
//! - `changeling.<ext>` in current directory or any parent
//! - `"changelog"` key of `package.json` in the project root
//! - `~/.config/changeling/config.<ext>` (user config)
//!
//! # Label order
//!
//! Categories are rendered in the order their labels are listed. Labels may
//! be a table (`label = "category"`) or an array of tables:
//!
//! ```toml
//! [[labels]]
//! label = "breaking"
//! category = ":boom: Breaking Change"
//!
//! [[labels]]
//! label = "bug"
//! category = ":bug: Bug Fix"
//! ```
//!
//! Figment stores tables as sorted maps, so each file's `labels` key is read
//! a second time with the format's own parser and layered over figment's
//! copy in source order.
//!
//! # Example
//! ```no_run
//! use camino::Utf8PathBuf;
//! use changeling_core::config::ConfigLoader;
//!
//! let cwd = std::env::current_dir().unwrap();
//! let cwd = Utf8PathBuf::try_from(cwd).expect("current directory is not valid UTF-8");
//! let config = ConfigLoader::new()
//!     .with_project_search(&cwd)
//!     .load()
//!     .unwrap();
//! ```

use std::collections::BTreeMap;
use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Format, Json, Serialized, Toml, Yaml};
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::manifest::{ManifestSettings, ProjectManifest};
use crate::render::Configuration;

/// Default display label for the unreleased release.
pub const DEFAULT_UNRELEASED_NAME: &str = "Unreleased";

/// Default document title.
pub const DEFAULT_TITLE: &str = "Changelog";

/// Committers left out of the roll-call unless configured otherwise.
pub const DEFAULT_IGNORE_COMMITTERS: &[&str] = &[
    "dependabot-bot",
    "dependabot[bot]",
    "dependabot-preview[bot]",
    "greenkeeperio-bot",
    "greenkeeper[bot]",
    "renovate-bot",
    "renovate[bot]",
];

/// Built-in label taxonomy, in rendering order.
const DEFAULT_LABELS: &[(&str, &str)] = &[
    ("breaking", ":boom: Breaking Change"),
    ("enhancement", ":rocket: Enhancement"),
    ("bug", ":bug: Bug Fix"),
    ("documentation", ":memo: Documentation"),
    ("internal", ":house: Internal"),
];

/// The configuration for changeling.
///
/// Deserialized from config files found during discovery (TOML, YAML, or
/// JSON). Every field has a default; [`Config::resolve`] turns it into the
/// renderer's [`Configuration`].
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Log level for the application (e.g., "debug", "info", "warn", "error").
    pub log_level: LogLevel,
    /// Directory for JSONL log files (falls back to platform defaults if unset).
    pub log_dir: Option<Utf8PathBuf>,
    /// GitHub repository as `owner/name`. Inferred from `package.json` when unset.
    pub repo: Option<String>,
    /// Issue label to category display name, in rendering order.
    pub labels: LabelMap,
    /// Section key to section display name.
    pub sections: BTreeMap<String, String>,
    /// Logins (or login fragments) left out of the committer list.
    pub ignore_committers: Vec<String>,
    /// Label for the unreleased release when no next version is known.
    pub unreleased_name: String,
    /// Document title.
    pub title: String,
    /// Document description.
    pub description: String,
    /// Version to show for unreleased changes.
    pub next_version: Option<String>,
    /// Use the `package.json` version as the next version.
    pub next_version_from_metadata: bool,
    /// Label whose category catches commits no other label matched.
    pub wildcard_label: Option<String>,
    /// Override for the issue link prefix (default: the repo's `/issues/` URL).
    pub base_issue_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            log_dir: None,
            repo: None,
            labels: LabelMap::default(),
            sections: BTreeMap::new(),
            ignore_committers: DEFAULT_IGNORE_COMMITTERS
                .iter()
                .map(|login| (*login).to_string())
                .collect(),
            unreleased_name: DEFAULT_UNRELEASED_NAME.to_string(),
            title: DEFAULT_TITLE.to_string(),
            description: String::new(),
            next_version: None,
            next_version_from_metadata: false,
            wildcard_label: None,
            base_issue_url: None,
        }
    }
}

impl Config {
    /// Resolve the repository identity, config first, then the manifest.
    pub fn repo(&self, manifest: Option<&ProjectManifest>) -> Option<String> {
        self.repo
            .clone()
            .or_else(|| manifest.and_then(ProjectManifest::github_repo))
    }

    /// Resolve the version shown in place of the unreleased label.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingNextVersion`] when the version should come from
    /// the manifest and it has none.
    pub fn next_version(&self, manifest: Option<&ProjectManifest>) -> ConfigResult<Option<String>> {
        if let Some(ref version) = self.next_version {
            return Ok(Some(version.clone()));
        }
        if !self.next_version_from_metadata {
            return Ok(None);
        }
        manifest
            .and_then(|m| m.version.clone())
            .map(Some)
            .ok_or(ConfigError::MissingNextVersion)
    }

    /// Build the renderer configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingRepo`] when no repository can be inferred, and
    /// [`ConfigError::MissingNextVersion`] as described on
    /// [`Config::next_version`].
    #[tracing::instrument(skip_all)]
    pub fn resolve(&self, manifest: Option<&ProjectManifest>) -> ConfigResult<Configuration> {
        let repo = self.repo(manifest).ok_or(ConfigError::MissingRepo)?;
        let next_version = self.next_version(manifest)?;

        let base_issue_url = self
            .base_issue_url
            .clone()
            .unwrap_or_else(|| format!("https://github.com/{repo}/issues/"));
        let unreleased_name = next_version.unwrap_or_else(|| self.unreleased_name.clone());

        tracing::debug!(%repo, %unreleased_name, "configuration resolved");
        Ok(Configuration {
            categories: self.labels.categories(),
            sections: self.sections.clone(),
            base_issue_url,
            unreleased_name,
            title: self.title.clone(),
            description: self.description.clone(),
        })
    }
}

/// One label to category entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LabelMapping {
    /// GitHub label name.
    pub label: String,
    /// Category display name.
    pub category: String,
}

impl LabelMapping {
    /// Map `label` to `category`.
    pub fn new(label: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            category: category.into(),
        }
    }
}

/// Ordered label to category mapping.
///
/// Deserializes from a map or from an array of `{ label, category }`
/// tables, keeping source order. Always serializes as the array form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LabelMap(Vec<LabelMapping>);

impl LabelMap {
    /// Category for `label`, if mapped.
    pub fn category_for(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|m| m.label == label)
            .map(|m| m.category.as_str())
    }

    /// Category display names in first-listed order, without duplicates.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for mapping in &self.0 {
            if !categories.contains(&mapping.category) {
                categories.push(mapping.category.clone());
            }
        }
        categories
    }

    /// Mappings in order.
    pub fn iter(&self) -> impl Iterator<Item = &LabelMapping> {
        self.0.iter()
    }
}

impl Default for LabelMap {
    fn default() -> Self {
        Self(
            DEFAULT_LABELS
                .iter()
                .map(|(label, category)| LabelMapping::new(*label, *category))
                .collect(),
        )
    }
}

impl From<Vec<LabelMapping>> for LabelMap {
    fn from(mappings: Vec<LabelMapping>) -> Self {
        Self(mappings)
    }
}

impl<'de> Deserialize<'de> for LabelMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LabelMapVisitor;

        impl<'de> Visitor<'de> for LabelMapVisitor {
            type Value = LabelMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a label to category map or a list of { label, category } tables")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut mappings = Vec::new();
                while let Some((label, category)) = map.next_entry::<String, String>()? {
                    mappings.push(LabelMapping { label, category });
                }
                Ok(LabelMap(mappings))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut mappings = Vec::new();
                while let Some(mapping) = seq.next_element::<LabelMapping>()? {
                    mappings.push(mapping);
                }
                Ok(LabelMap(mappings))
            }
        }

        deserializer.deserialize_any(LabelMapVisitor)
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging and development.
    Debug,
    /// Standard operational information (default).
    #[default]
    Info,
    /// Warnings about potential issues.
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Supported configuration file extensions (in order of preference).
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Application name for XDG directory lookup and config file names.
const APP_NAME: &str = "changeling";

/// Builder for loading configuration from multiple sources.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Starting directory for project config search.
    project_search_root: Option<Utf8PathBuf>,
    /// Whether to include user config from XDG directory.
    include_user_config: bool,
    /// Stop searching when we hit a directory containing this file/dir.
    boundary_marker: Option<String>,
    /// Settings embedded in the project manifest.
    manifest_settings: Option<ManifestSettings>,
    /// Explicit config files to load (for testing or programmatic use).
    explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default settings.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            manifest_settings: None,
            explicit_files: Vec::new(),
        }
    }

    /// Set the starting directory for project config search.
    ///
    /// The loader will walk up from this directory looking for config files.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set whether to include user config from `~/.config/changeling/`.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Set a boundary marker to stop directory traversal.
    ///
    /// When walking up directories, stop if we find a directory containing
    /// this file or directory name. Default is `.git`.
    pub fn with_boundary_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.boundary_marker = Some(marker.into());
        self
    }

    /// Disable boundary marker (search all the way to filesystem root).
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Layer the manifest's `"changelog"` settings, if it has any.
    ///
    /// They sit above user config and below project config files.
    pub fn with_manifest(mut self, manifest: Option<&ProjectManifest>) -> Self {
        self.manifest_settings = manifest.and_then(|m| m.changelog.clone());
        self
    }

    /// Add an explicit config file to load.
    ///
    /// Files are loaded in order, with later files taking precedence.
    /// Explicit files are loaded after discovered files.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration, merging all discovered sources.
    ///
    /// Precedence (highest to lowest):
    /// 1. Explicit files (in order added via `with_file`)
    /// 2. Project config (closest to search root)
    /// 3. Manifest settings (`package.json` `"changelog"`)
    /// 4. User config (`~/.config/changeling/config.<ext>`)
    /// 5. Default values
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<Config> {
        tracing::debug!("loading configuration");
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Start with user config (lowest precedence of file sources)
        if self.include_user_config
            && let Some(user_config) = self.find_user_config()
        {
            figment = Self::merge_file(figment, &user_config);
        }

        if let Some(ref settings) = self.manifest_settings {
            figment = figment.merge(Serialized::defaults(settings));
        }

        // Add project config
        if let Some(ref root) = self.project_search_root
            && let Some(project_config) = self.find_project_config(root)
        {
            figment = Self::merge_file(figment, &project_config);
        }

        // Add explicit files (highest precedence)
        for file in &self.explicit_files {
            figment = Self::merge_file(figment, file);
        }

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        tracing::info!(
            log_level = config.log_level.as_str(),
            labels = config.labels.iter().count(),
            sections = config.sections.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Find project config by walking up from the given directory.
    fn find_project_config(&self, start: &Utf8Path) -> Option<Utf8PathBuf> {
        let mut current = Some(start.to_path_buf());

        while let Some(dir) = current {
            // Check for boundary marker
            if let Some(ref marker) = self.boundary_marker {
                let marker_path = dir.join(marker);
                if marker_path.exists() && dir != start {
                    // Found boundary in a parent dir, stop searching
                    break;
                }
            }

            for ext in CONFIG_EXTENSIONS {
                let dotfile = dir.join(format!(".{APP_NAME}.{ext}"));
                if dotfile.is_file() {
                    return Some(dotfile);
                }

                let regular = dir.join(format!("{APP_NAME}.{ext}"));
                if regular.is_file() {
                    return Some(regular);
                }
            }

            current = dir.parent().map(Utf8Path::to_path_buf);
        }

        None
    }

    /// Find user config in XDG config directory.
    fn find_user_config(&self) -> Option<Utf8PathBuf> {
        let config_dir = user_config_dir()?;

        CONFIG_EXTENSIONS
            .iter()
            .map(|ext| config_dir.join(format!("config.{ext}")))
            .find(|path| path.is_file())
    }

    /// Merge a config file into the figment, detecting format from extension.
    fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
        let figment = match path.extension() {
            Some("toml") => figment.merge(Toml::file_exact(path.as_str())),
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
            Some("json") => figment.merge(Json::file_exact(path.as_str())),
            _ => figment.merge(Toml::file_exact(path.as_str())),
        };

        match ordered_labels(path) {
            Some(labels) => figment.merge(Serialized::default("labels", labels)),
            None => figment,
        }
    }
}

/// Just the `labels` key of a config file.
#[derive(Debug, Default, Deserialize)]
struct LabelsOnly {
    #[serde(default)]
    labels: Option<LabelMap>,
}

/// Read `labels` from `path` in source order.
///
/// Unreadable or malformed files yield `None`; figment reports those when the
/// configuration is extracted.
fn ordered_labels(path: &Utf8Path) -> Option<LabelMap> {
    let content = std::fs::read_to_string(path).ok()?;
    let parsed = match path.extension() {
        Some("yaml" | "yml") => {
            serde_yaml::from_str::<LabelsOnly>(&content).map_err(|e| e.to_string())
        }
        Some("json") => {
            serde_json::from_str::<LabelsOnly>(&content).map_err(|e| e.to_string())
        }
        _ => toml::from_str::<LabelsOnly>(&content).map_err(|e| e.to_string()),
    };

    match parsed {
        Ok(only) => only.labels,
        Err(error) => {
            tracing::debug!(%path, %error, "labels not re-read in source order");
            None
        }
    }
}

/// Find the project config file path without loading it.
///
/// Useful for commands that need to know where config is located.
pub fn find_project_config<P: AsRef<Utf8Path>>(start: P) -> Option<Utf8PathBuf> {
    ConfigLoader::new()
        .with_project_search(start.as_ref())
        .without_boundary_marker()
        .find_project_config(start.as_ref())
}

/// Get the user config directory path.
///
/// Returns `~/.config/changeling/` on Linux, `~/Library/Application Support/changeling/`
/// on macOS, and equivalent on other platforms.
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
    Utf8PathBuf::from_path_buf(proj_dirs.config_dir().to_path_buf()).ok()
}
