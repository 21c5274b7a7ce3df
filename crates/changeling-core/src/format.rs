//! Entry and contributor line formatting.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Commit, GitHubUser};

/// `fix #12`, `Closes T12`, `resolved #12` and friends.
static CLOSING_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(fix|close|resolve)(e?s|e?d)? [T#]([0-9]+)")
        .expect("Failed to compile closing reference regex")
});

/// Rewrite the first closing reference in `title` into an issue link.
///
/// Only the first match is replaced; the rest of the title is untouched.
pub fn rewrite_title<'t>(title: &'t str, base_issue_url: &str) -> Cow<'t, str> {
    let Some(caps) = CLOSING_REFERENCE.captures(title) else {
        return Cow::Borrowed(title);
    };
    // Group 0 always exists for a successful match.
    let (Some(whole), Some(number)) = (caps.get(0), caps.get(3)) else {
        return Cow::Borrowed(title);
    };
    let number = number.as_str();

    let mut rewritten = String::with_capacity(title.len() + base_issue_url.len() + 16);
    rewritten.push_str(&title[..whole.start()]);
    rewritten.push_str(&format!("Closes [#{number}]({base_issue_url}{number})"));
    rewritten.push_str(&title[whole.end()..]);
    Cow::Owned(rewritten)
}

/// Render the entry line for one commit, without the bullet marker.
///
/// Returns `None` when the commit has no fetched issue.
pub fn render_entry(commit: &Commit, base_issue_url: &str) -> Option<String> {
    let issue = commit.github_issue.as_ref()?;
    let mut line = String::new();

    if let Some(pr_url) = issue.pull_request_url() {
        line.push_str(&format!("[#{}]({pr_url}) ", issue.number));
    }

    let title = rewrite_title(&issue.title, base_issue_url);
    line.push_str(&format!(
        "{title} ([@{}]({}))",
        issue.user.login, issue.user.html_url
    ));
    Some(line)
}

/// Render a contributor as `Name ([@login](url))`, or just the link.
pub fn render_contributor_line(user: &GitHubUser) -> String {
    let link = format!("[@{}]({})", user.login, user.html_url);
    match user.name.as_deref() {
        Some(name) if !name.is_empty() => format!("{name} ({link})"),
        _ => link,
    }
}

/// Render the `#### Committers` block.
///
/// Bullets are sorted by their rendered text, byte-wise.
pub fn render_contributor_block(users: &[GitHubUser]) -> String {
    let mut bullets: Vec<String> = users
        .iter()
        .map(|u| format!("- {}", render_contributor_line(u)))
        .collect();
    bullets.sort();

    format!("#### Committers: {}\n{}", users.len(), bullets.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Issue, PullRequest};

    const BASE: &str = "https://x/issues/";

    fn user(login: &str, name: Option<&str>, url: &str) -> GitHubUser {
        GitHubUser {
            login: login.into(),
            html_url: url.into(),
            name: name.map(String::from),
        }
    }

    fn commit_with_issue(title: &str, pr: Option<&str>) -> Commit {
        Commit {
            sha: "abc".into(),
            message: String::new(),
            issue_number: Some(7),
            github_issue: Some(Issue {
                number: 7,
                title: title.into(),
                user: user("x", None, "https://github.com/x"),
                pull_request: pr.map(|u| PullRequest {
                    html_url: u.into(),
                }),
                labels: vec![],
            }),
            categories: vec![],
            section: None,
            packages: vec![],
        }
    }

    #[test]
    fn rewrite_title_table() {
        let cases = [
            ("Fix #42 crash on load", "Closes [#42](https://x/issues/42) crash on load"),
            ("fixes #1", "Closes [#1](https://x/issues/1)"),
            ("Fixed #3 again", "Closes [#3](https://x/issues/3) again"),
            ("close T9", "Closes [#9](https://x/issues/9)"),
            ("Closes #10 and #11", "Closes [#10](https://x/issues/10) and #11"),
            ("closed #5", "Closes [#5](https://x/issues/5)"),
            ("Resolve #6", "Closes [#6](https://x/issues/6)"),
            ("RESOLVES #8 now", "Closes [#8](https://x/issues/8) now"),
            ("resolved #12", "Closes [#12](https://x/issues/12)"),
            ("Prefix: fix #2", "Prefix: Closes [#2](https://x/issues/2)"),
            ("hotfix #4", "hotCloses [#4](https://x/issues/4)"),
            (
                "Fix #1, fix #2",
                "Closes [#1](https://x/issues/1), fix #2",
            ),
        ];
        for (before, after) in cases {
            assert_eq!(rewrite_title(before, BASE), after, "input: {before:?}");
        }
    }

    #[test]
    fn rewrite_title_leaves_non_matches_alone() {
        let untouched = [
            "Fix crash on load",
            "Fix  #42 double space",
            "Fix#42 no space",
            "fixing #3",
            "Fix #abc",
            "Fix #\u{664}\u{662} thing",
            "Add feature",
            "",
        ];
        for title in untouched {
            let out = rewrite_title(title, BASE);
            assert!(matches!(out, Cow::Borrowed(_)), "input: {title:?}");
            assert_eq!(out, title);
        }
    }

    #[test]
    fn render_entry_for_pull_request() {
        let commit = commit_with_issue("Add widget", Some("https://github.com/o/r/pull/7"));
        assert_eq!(
            render_entry(&commit, BASE).unwrap(),
            "[#7](https://github.com/o/r/pull/7) Add widget ([@x](https://github.com/x))"
        );
    }

    #[test]
    fn render_entry_for_plain_issue_has_no_prefix() {
        let commit = commit_with_issue("Fix #42 crash on load", None);
        assert_eq!(
            render_entry(&commit, BASE).unwrap(),
            "Closes [#42](https://x/issues/42) crash on load ([@x](https://github.com/x))"
        );
    }

    #[test]
    fn render_entry_without_issue_is_none() {
        let mut commit = commit_with_issue("whatever", None);
        commit.github_issue = None;
        assert!(render_entry(&commit, BASE).is_none());
    }

    #[test]
    fn render_entry_does_not_mutate_issue_title() {
        let commit = commit_with_issue("fix #1 thing", None);
        let _ = render_entry(&commit, BASE);
        assert_eq!(commit.github_issue.as_ref().unwrap().title, "fix #1 thing");
    }

    #[test]
    fn contributor_line_with_and_without_name() {
        assert_eq!(
            render_contributor_line(&user("amy", Some("Amy Z"), "u2")),
            "Amy Z ([@amy](u2))"
        );
        assert_eq!(render_contributor_line(&user("bob", None, "u1")), "[@bob](u1)");
        assert_eq!(render_contributor_line(&user("eve", Some(""), "u3")), "[@eve](u3)");
    }

    #[test]
    fn contributor_block_sorts_by_rendered_text() {
        let users = vec![user("bob", None, "u1"), user("amy", Some("Amy Z"), "u2")];
        assert_eq!(
            render_contributor_block(&users),
            "#### Committers: 2\n- Amy Z ([@amy](u2))\n- [@bob](u1)"
        );
    }

    #[test]
    fn contributor_block_sort_is_case_sensitive() {
        let users = vec![
            user("zed", Some("Zed"), "u1"),
            user("ann", Some("Ann"), "u2"),
            user("bo", Some("bo"), "u3"),
        ];
        assert_eq!(
            render_contributor_block(&users),
            "#### Committers: 3\n- Ann ([@ann](u2))\n- Zed ([@zed](u1))\n- bo ([@bo](u3))"
        );
    }
}
