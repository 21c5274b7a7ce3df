//! Terminal coloring for rendered changelogs.
//!
//! Styling goes through owo-colors' stream detection, so it follows
//! `--color` and disappears when stdout is not a terminal. Only headings and
//! bullet markers are styled; the text itself is left alone.

use owo_colors::{OwoColorize, Stream};

/// Style markdown headings and bullets for stdout.
pub fn highlight(markdown: &str) -> String {
    markdown
        .split('\n')
        .map(highlight_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn highlight_line(line: &str) -> String {
    if line.starts_with("#### Committers") {
        return line
            .if_supports_color(Stream::Stdout, |text| text.dimmed())
            .to_string();
    }
    if line.starts_with("#### ") {
        return line
            .if_supports_color(Stream::Stdout, |text| text.yellow())
            .to_string();
    }
    if line.starts_with("### ") {
        return line
            .if_supports_color(Stream::Stdout, |text| text.magenta())
            .to_string();
    }
    if line.starts_with("## ") {
        return line
            .if_supports_color(Stream::Stdout, |text| text.green())
            .to_string();
    }
    if line.starts_with("# ") {
        return line
            .if_supports_color(Stream::Stdout, |text| text.bold())
            .to_string();
    }

    let indent = line.len() - line.trim_start().len();
    let (lead, rest) = line.split_at(indent);
    match rest.split_once(' ') {
        Some((marker @ ("*" | "-"), text)) => format!(
            "{lead}{} {text}",
            marker.if_supports_color(Stream::Stdout, |m| m.cyan())
        ),
        _ => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    fn strip_ansi(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\u{1b}' {
                for next in chars.by_ref() {
                    if next == 'm' {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    static COLOR_LOCK: Mutex<()> = Mutex::new(());

    /// Forces colors on for the guard's lifetime, one test at a time.
    struct ForcedColor {
        _lock: MutexGuard<'static, ()>,
    }

    impl ForcedColor {
        fn on() -> Self {
            let lock = COLOR_LOCK.lock().unwrap_or_else(|e| e.into_inner());
            owo_colors::set_override(true);
            Self { _lock: lock }
        }
    }

    impl Drop for ForcedColor {
        fn drop(&mut self) {
            owo_colors::unset_override();
        }
    }

    const DOCUMENT: &str = "\n# Changelog\n\n## v1 (2021-01-01)\n\n### API\n\n#### ↳ Bug\n* fix\n  * nested\n\n#### Committers: 1\n- [@x](u)";

    #[test]
    fn text_survives_styling() {
        let _color = ForcedColor::on();
        let styled = highlight(DOCUMENT);
        assert_ne!(styled, DOCUMENT);
        assert_eq!(strip_ansi(&styled), DOCUMENT);
    }

    #[test]
    fn headings_are_styled_when_colors_are_on() {
        let _color = ForcedColor::on();
        for heading in [
            "# Changelog",
            "## v1 (2021-01-01)",
            "### API",
            "#### ↳ Bug",
            "#### Committers: 1",
        ] {
            let styled = highlight_line(heading);
            assert!(styled.starts_with('\u{1b}'), "{heading:?} -> {styled:?}");
            assert_eq!(strip_ansi(&styled), heading);
        }
    }

    #[test]
    fn only_the_bullet_marker_is_styled() {
        let _color = ForcedColor::on();
        let styled = highlight_line("  * nested item");
        assert!(styled.starts_with("  \u{1b}["), "{styled:?}");
        assert!(styled.ends_with(" nested item"), "{styled:?}");
        assert_eq!(strip_ansi(&styled), "  * nested item");

        let dash = highlight_line("- [@x](u)");
        assert!(dash.starts_with('\u{1b}'), "{dash:?}");
        assert!(dash.ends_with(" [@x](u)"), "{dash:?}");
    }

    #[test]
    fn plain_lines_are_untouched() {
        let _color = ForcedColor::on();
        assert_eq!(highlight("All notable changes."), "All notable changes.");
        assert_eq!(highlight("*emphasis* stays"), "*emphasis* stays");
        assert_eq!(highlight(""), "");
    }
}
