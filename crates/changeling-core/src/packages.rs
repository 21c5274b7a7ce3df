//! Per-package grouping for monorepo changelogs.

use crate::model::Commit;
use crate::multimap::OrderedMultiMap;

/// Bucket label used for commits that touch no package.
pub const OTHER_PACKAGES: &str = "Other";

/// Label for a package list: `` `a`, `b` `` or [`OTHER_PACKAGES`].
pub fn package_label(packages: &[String]) -> String {
    if packages.is_empty() {
        return OTHER_PACKAGES.to_string();
    }
    packages
        .iter()
        .map(|p| format!("`{p}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Group commits by the exact list of packages they touch.
///
/// Bucket order is first-seen; commits keep arrival order within a bucket.
pub fn bucket_by_package<'a, I>(commits: I) -> OrderedMultiMap<String, &'a Commit>
where
    I: IntoIterator<Item = &'a Commit>,
{
    commits
        .into_iter()
        .map(|commit| (package_label(&commit.packages), commit))
        .collect()
}

/// Whether any commit carries package information.
pub fn has_packages<'a, I>(commits: I) -> bool
where
    I: IntoIterator<Item = &'a Commit>,
{
    commits.into_iter().any(|c| !c.packages.is_empty())
}
