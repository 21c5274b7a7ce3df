//! Project manifest (`package.json`) metadata.
//!
//! The manifest contributes three things: the package version (used as the
//! next version when asked to), the repository identity, and an optional
//! `"changelog"` object holding the same settings as a config file.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::LabelMap;
use crate::error::{ConfigError, ConfigResult};

/// File name of the manifest read from the project root.
pub const MANIFEST_FILE: &str = "package.json";

/// The `repository` field: a shorthand/URL string or `{ "url": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Repository {
    /// `"owner/name"`, `"github:owner/name"` or a git URL.
    Short(String),
    /// `{ "type": "git", "url": "..." }`.
    Detailed {
        /// Repository URL.
        url: String,
    },
}

impl Repository {
    /// The raw URL or shorthand.
    pub fn url(&self) -> &str {
        match self {
            Self::Short(url) | Self::Detailed { url } => url,
        }
    }
}

/// Changelog settings embedded in the manifest under `"changelog"`.
///
/// Keys are camel-cased in the manifest and re-serialized snake-cased so
/// they merge into the config figment like any other source. Absent keys
/// are skipped and never override lower-precedence sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
pub struct ManifestSettings {
    /// GitHub repository as `owner/name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    /// Label to category mapping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<LabelMap>,
    /// Section key to display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<BTreeMap<String, String>>,
    /// Logins to leave out of the committer list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_committers: Option<Vec<String>>,
    /// Label for unreleased changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unreleased_name: Option<String>,
    /// Document title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Document description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Explicit next version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_version: Option<String>,
    /// Take the next version from the manifest's `version`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_version_from_metadata: Option<bool>,
    /// Label whose category catches otherwise uncategorized commits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wildcard_label: Option<String>,
    /// Override for the issue link prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_issue_url: Option<String>,
}

/// The subset of `package.json` changeling reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectManifest {
    /// Package version.
    #[serde(default)]
    pub version: Option<String>,
    /// Repository field.
    #[serde(default)]
    pub repository: Option<Repository>,
    /// Embedded changelog settings.
    #[serde(default)]
    pub changelog: Option<ManifestSettings>,
}

impl ProjectManifest {
    /// Read `package.json` from `root`, if there is one.
    #[instrument(skip_all, fields(root = %root))]
    pub fn load(root: &Utf8Path) -> ConfigResult<Option<Self>> {
        let path: Utf8PathBuf = root.join(MANIFEST_FILE);
        if !path.is_file() {
            debug!("no project manifest");
            return Ok(None);
        }

        let content =
            std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadManifest {
                path: path.clone(),
                source,
            })?;
        let manifest: Self = serde_json::from_str(&content)
            .map_err(|source| ConfigError::ParseManifest { path, source })?;

        debug!(
            version = ?manifest.version,
            has_changelog_settings = manifest.changelog.is_some(),
            "project manifest loaded"
        );
        Ok(Some(manifest))
    }

    /// `owner/name` parsed from the `repository` field.
    pub fn github_repo(&self) -> Option<String> {
        self.repository
            .as_ref()
            .and_then(|repo| parse_github_repo(repo.url()))
    }
}

/// Extract `owner/name` from the repository forms npm accepts.
///
/// Handles `owner/name`, `github:owner/name`, HTTPS and `git+https` URLs,
/// and SSH (`git@github.com:owner/name.git`) remotes.
pub fn parse_github_repo(url: &str) -> Option<String> {
    let url = url.trim();
    let path = if let Some(rest) = url.strip_prefix("github:") {
        rest
    } else if let Some(rest) = url.strip_prefix("git@") {
        // SSH format: git@github.com:owner/repo.git
        rest.split_once(':').map(|(_, path)| path)?
    } else if url.contains("//") {
        // URL format: https://github.com/owner/repo.git
        url.split("//")
            .nth(1)
            .and_then(|after_scheme| after_scheme.split_once('/').map(|(_, path)| path))?
    } else if url.contains(':') {
        return None;
    } else {
        url
    };

    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let (owner, repo) = path.split_once('/')?;

    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }

    Some(format!("{owner}/{repo}"))
}
