//! Release, commit and GitHub records consumed by the renderer.
//!
//! These are produced by the harvesting side (git history plus issue and pull
//! request lookups) and handed to [`crate::render`] fully materialized. Wire
//! names follow the harvester's JSON shape, so `issueNumber` and
//! `githubIssue` are camel-cased while the GitHub payloads keep their
//! snake-cased `html_url` / `pull_request` keys.

use serde::{Deserialize, Serialize};

/// Reserved release name for commits that have not been tagged yet.
///
/// Rendered as the configured unreleased label instead of verbatim.
pub const UNRELEASED_TAG: &str = "___unreleased___";

/// A GitHub account, as returned by the users and issues APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubUser {
    /// Account login (e.g., `"octocat"`).
    pub login: String,
    /// Profile URL.
    pub html_url: String,
    /// Display name, when the account has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Pull request marker attached to issues that are actually PRs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Web URL of the pull request.
    pub html_url: String,
}

/// A label attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label name as shown on GitHub.
    pub name: String,
}

/// An issue or pull request referenced by a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Author of the issue.
    pub user: GitHubUser,
    /// Present when the issue is a pull request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<PullRequest>,
    /// Labels, used to derive commit categories.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
}

impl Issue {
    /// URL of the pull request, if this issue is one.
    pub fn pull_request_url(&self) -> Option<&str> {
        self.pull_request.as_ref().map(|pr| pr.html_url.as_str())
    }
}

/// A single commit and the metadata the harvester attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    /// Commit hash.
    pub sha: String,
    /// Full commit message.
    #[serde(default)]
    pub message: String,
    /// Issue or PR number parsed from a merge commit, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_number: Option<u64>,
    /// The referenced issue, when it could be fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_issue: Option<Issue>,
    /// Category display names this commit belongs to.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Raw section key, looked up in the configured section names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Packages touched by the commit (monorepos).
    #[serde(default)]
    pub packages: Vec<String>,
}

impl Commit {
    /// Whether the commit belongs to the named category.
    pub fn in_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }

    /// Whether the commit can produce an entry line.
    ///
    /// Commits without a fetched issue are never rendered.
    pub const fn is_renderable(&self) -> bool {
        self.github_issue.is_some()
    }
}

/// A named, dated set of commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Tag name, or [`UNRELEASED_TAG`].
    pub name: String,
    /// Release date, already formatted (e.g., `"2021-01-01"`).
    pub date: String,
    /// Commits in arrival order.
    #[serde(default)]
    pub commits: Vec<Commit>,
    /// Committers credited for this release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributors: Option<Vec<GitHubUser>>,
}

impl Release {
    /// Whether this release is the unreleased sentinel.
    pub fn is_unreleased(&self) -> bool {
        self.name == UNRELEASED_TAG
    }
}
