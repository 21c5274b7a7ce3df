//! Category and section classification.
//!
//! Both passes borrow the release's commits; a commit that belongs to several
//! categories shows up, unchanged, in every matching bucket.

use std::collections::BTreeMap;

use tracing::trace;

use crate::model::Commit;
use crate::multimap::OrderedMultiMap;

/// Commits that share one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInfo<'a> {
    /// Category display name.
    pub name: String,
    /// Matching commits, in arrival order.
    pub commits: Vec<&'a Commit>,
}

impl CategoryInfo<'_> {
    /// Whether at least one commit in the bucket renders an entry line.
    pub fn has_renderable(&self) -> bool {
        self.commits.iter().any(|c| c.is_renderable())
    }
}

/// Commits that share one section, split further into categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionInfo<'a> {
    /// Section display name.
    pub name: String,
    /// Categories in configuration order, including empty ones.
    pub categories: Vec<CategoryInfo<'a>>,
}

impl SectionInfo<'_> {
    /// Whether any category in the section would render an entry.
    pub fn has_renderable(&self) -> bool {
        self.categories.iter().any(CategoryInfo::has_renderable)
    }
}

/// Partition `commits` into one bucket per configured category name.
///
/// Buckets follow `category_names` order. Empty buckets are kept; callers
/// drop them before emitting headers.
pub fn classify<'a, I>(commits: I, category_names: &[String]) -> Vec<CategoryInfo<'a>>
where
    I: IntoIterator<Item = &'a Commit>,
    I::IntoIter: Clone,
{
    let commits = commits.into_iter();
    category_names
        .iter()
        .map(|name| CategoryInfo {
            name: name.clone(),
            commits: commits.clone().filter(|c| c.in_category(name)).collect(),
        })
        .collect()
}

/// Display name for a commit's section key.
///
/// Mapped keys resolve to their configured name. Unmapped keys and commits
/// without a section share the `""` fallback bucket.
pub fn resolve_section_name(section: Option<&str>, sections: &BTreeMap<String, String>) -> String {
    section
        .and_then(|raw| sections.get(raw))
        .cloned()
        .unwrap_or_default()
}

/// Group `commits` by resolved section name, then categorize each group.
///
/// Expects commits already filtered to those carrying an issue number.
/// Accumulation and lookup both use the resolved display name, so two raw
/// keys mapped to the same name share a section. With no section names
/// configured there is nothing to group by and the result is empty.
pub fn classify_by_section<'a>(
    commits: &[&'a Commit],
    sections: &BTreeMap<String, String>,
    category_names: &[String],
) -> Vec<SectionInfo<'a>> {
    if sections.is_empty() {
        return Vec::new();
    }

    let grouped: OrderedMultiMap<String, &'a Commit> = commits
        .iter()
        .map(|&commit| {
            (
                resolve_section_name(commit.section.as_deref(), sections),
                commit,
            )
        })
        .collect();

    trace!(sections = grouped.len(), "grouped commits by section");

    grouped
        .into_iter()
        .map(|(name, members)| SectionInfo {
            categories: classify(members.iter().copied(), category_names),
            name,
        })
        .collect()
}
