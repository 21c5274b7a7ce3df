//! Markdown rendering of releases and whole changelog documents.
//!
//! Every release goes through [`MarkdownRenderer::render_sectioned`]. It
//! picks a [`RenderStrategy`] once: sectioned output when the release's
//! issue-linked commits group into at least one non-empty section, the flat
//! category listing otherwise.
//!
//! Rendering never fails. Commits without a fetched issue, commits outside
//! every configured category, and buckets left with nothing to show are
//! omitted; a release with nothing to show renders as `""` and is dropped
//! from the document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::classify::{self, CategoryInfo, SectionInfo};
use crate::format;
use crate::model::{Commit, Release};
use crate::packages;

/// Separator between rendered releases.
const RELEASE_SEPARATOR: &str = "\n\n\n";

/// Marker placed before category headers nested under a section.
const NESTED_CATEGORY_MARKER: &str = "↳";

/// Resolved settings the renderer works from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Category display names, in output order.
    pub categories: Vec<String>,
    /// Raw section key to section display name.
    pub sections: BTreeMap<String, String>,
    /// Prefix for issue links created by title rewriting.
    pub base_issue_url: String,
    /// Label shown for the unreleased release.
    pub unreleased_name: String,
    /// Document title.
    pub title: String,
    /// Document description, placed under the title.
    pub description: String,
}

/// How a single release is laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderStrategy<'a> {
    /// Categories directly under the release header.
    Flat,
    /// Sections under the release header, categories under each section.
    Sectioned(Vec<SectionInfo<'a>>),
}

/// Renders releases into markdown using a [`Configuration`].
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer<'c> {
    config: &'c Configuration,
}

impl<'c> MarkdownRenderer<'c> {
    /// Create a renderer over `config`.
    pub const fn new(config: &'c Configuration) -> Self {
        Self { config }
    }

    /// Render the full document: title, description, then every release.
    ///
    /// The result gains one leading newline when any release survived.
    #[instrument(skip_all, fields(releases = releases.len()))]
    pub fn render_document(&self, releases: &[Release]) -> String {
        let body = self.render_releases(releases);
        let document = format!(
            "# {}\n\n{}\n\n{body}",
            self.config.title, self.config.description
        );
        if body.is_empty() {
            document
        } else {
            format!("\n{document}")
        }
    }

    /// Render only the releases, for callers that write their own header.
    ///
    /// Empty when no release has anything to show, otherwise prefixed with
    /// one newline.
    pub fn render_markdown(&self, releases: &[Release]) -> String {
        let body = self.render_releases(releases);
        if body.is_empty() {
            body
        } else {
            format!("\n{body}")
        }
    }

    fn render_releases(&self, releases: &[Release]) -> String {
        let rendered: Vec<String> = releases
            .iter()
            .map(|release| self.render_sectioned(release))
            .filter(|block| !block.is_empty())
            .collect();
        debug!(
            rendered = rendered.len(),
            skipped = releases.len() - rendered.len(),
            "releases rendered"
        );
        rendered.join(RELEASE_SEPARATOR)
    }

    /// Choose the layout for `release`.
    ///
    /// Only commits with an issue number take part in sectioning; sections
    /// and categories with nothing renderable are dropped here.
    pub fn strategy_for<'a>(&self, release: &'a Release) -> RenderStrategy<'a> {
        let linked: Vec<&Commit> = release
            .commits
            .iter()
            .filter(|c| c.issue_number.is_some())
            .collect();

        let sections: Vec<SectionInfo<'a>> =
            classify::classify_by_section(&linked, &self.config.sections, &self.config.categories)
                .into_iter()
                .filter_map(|mut section| {
                    section.categories.retain(CategoryInfo::has_renderable);
                    (!section.categories.is_empty()).then_some(section)
                })
                .collect();

        if sections.is_empty() {
            RenderStrategy::Flat
        } else {
            RenderStrategy::Sectioned(sections)
        }
    }

    /// Render one release, sectioned when possible, flat otherwise.
    #[instrument(skip_all, fields(release = %release.name))]
    pub fn render_sectioned(&self, release: &Release) -> String {
        match self.strategy_for(release) {
            RenderStrategy::Flat => {
                debug!("no sections, falling back to flat layout");
                self.render_flat(release)
            }
            RenderStrategy::Sectioned(sections) => self.render_sections(release, &sections),
        }
    }

    /// Render one release as categories directly under its header.
    ///
    /// Returns `""` when no category has anything to show.
    pub fn render_flat(&self, release: &Release) -> String {
        let categories: Vec<CategoryInfo<'_>> =
            classify::classify(&release.commits, &self.config.categories)
                .into_iter()
                .filter(CategoryInfo::has_renderable)
                .collect();

        if categories.is_empty() {
            return String::new();
        }

        let mut markdown = self.release_header(release);
        for category in &categories {
            markdown.push_str(&format!("\n\n#### {}\n", category.name));

            let visible = renderable(&category.commits);
            if packages::has_packages(visible.iter().copied()) {
                markdown.push_str(&self.render_contributions_by_package(&visible));
            } else {
                markdown.push_str(&self.render_contribution_list(&visible, ""));
            }
        }
        self.push_contributors(&mut markdown, release);
        markdown
    }

    fn render_sections(&self, release: &Release, sections: &[SectionInfo<'_>]) -> String {
        let mut markdown = self.release_header(release);
        for section in sections {
            markdown.push_str(&format!("\n\n### {}", section.name));
            for category in &section.categories {
                markdown.push_str(&format!(
                    "\n\n#### {NESTED_CATEGORY_MARKER} {}\n",
                    category.name
                ));
                markdown.push_str(
                    &self.render_contribution_list(&renderable(&category.commits), ""),
                );
            }
        }
        self.push_contributors(&mut markdown, release);
        markdown
    }

    fn release_header(&self, release: &Release) -> String {
        let title = if release.is_unreleased() {
            self.config.unreleased_name.as_str()
        } else {
            release.name.as_str()
        };
        format!("## {title} ({})", release.date)
    }

    fn push_contributors(&self, markdown: &mut String, release: &Release) {
        if let Some(contributors) = release.contributors.as_deref()
            && !contributors.is_empty()
        {
            markdown.push_str("\n\n");
            markdown.push_str(&format::render_contributor_block(contributors));
        }
    }

    fn render_contributions_by_package(&self, commits: &[&Commit]) -> String {
        packages::bucket_by_package(commits.iter().copied())
            .iter()
            .map(|(label, members)| {
                format!(
                    "* {label}\n{}",
                    self.render_contribution_list(members, "  ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_contribution_list(&self, commits: &[&Commit], prefix: &str) -> String {
        commits
            .iter()
            .filter_map(|commit| format::render_entry(commit, &self.config.base_issue_url))
            .map(|entry| format!("{prefix}* {entry}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn renderable<'a>(commits: &[&'a Commit]) -> Vec<&'a Commit> {
    commits.iter().copied().filter(|c| c.is_renderable()).collect()
}
