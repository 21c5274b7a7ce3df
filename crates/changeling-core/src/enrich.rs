//! Derive categories and contributors for harvested releases.
//!
//! The harvester may hand over releases whose commits only carry issue
//! labels, or that have no contributor list yet. These helpers fill in the
//! gaps from the configuration without touching anything already present.

use std::collections::HashSet;

use tracing::debug;

use crate::config::LabelMap;
use crate::model::{Commit, GitHubUser, Release};

/// Suffix GitHub appends to app-owned accounts.
const BOT_SUFFIX: &str = "[bot]";

/// Set each commit's categories from its issue labels.
///
/// Labels are looked up in `labels` in the order they appear on the issue.
/// When nothing matches and a wildcard label is configured, the commit lands
/// in the wildcard label's category. Commits that already have categories,
/// or have no issue, are left as they are.
pub fn fill_in_categories(commits: &mut [Commit], labels: &LabelMap, wildcard_label: Option<&str>) {
    let wildcard = wildcard_label.and_then(|label| labels.category_for(label));

    for commit in commits.iter_mut().filter(|c| c.categories.is_empty()) {
        let Some(issue) = commit.github_issue.as_ref() else {
            continue;
        };

        let mut categories: Vec<String> = Vec::new();
        for label in &issue.labels {
            if let Some(category) = labels.category_for(&label.name)
                && !categories.iter().any(|c| c == category)
            {
                categories.push(category.to_string());
            }
        }

        if categories.is_empty()
            && let Some(category) = wildcard
        {
            categories.push(category.to_string());
        }

        commit.categories = categories;
    }
}

/// Whether `login` should be left out of the committer list.
pub fn is_ignored_committer(login: &str, ignore_committers: &[String]) -> bool {
    login.ends_with(BOT_SUFFIX)
        || ignore_committers
            .iter()
            .any(|ignored| login.contains(ignored.as_str()))
}

/// Derive a release's contributors from its issue authors.
///
/// Only runs when the release has no contributor list. Authors are taken in
/// commit order, once per login, skipping ignored accounts.
pub fn fill_in_contributors(release: &mut Release, ignore_committers: &[String]) {
    if release.contributors.is_some() {
        return;
    }

    let mut seen = HashSet::new();
    let contributors: Vec<GitHubUser> = release
        .commits
        .iter()
        .filter_map(|c| c.github_issue.as_ref().map(|issue| &issue.user))
        .filter(|user| !is_ignored_committer(&user.login, ignore_committers))
        .filter(|user| seen.insert(user.login.clone()))
        .cloned()
        .collect();

    debug!(
        release = %release.name,
        contributors = contributors.len(),
        "derived contributors"
    );
    release.contributors = Some(contributors);
}
