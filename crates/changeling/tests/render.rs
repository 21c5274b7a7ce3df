//! Render command integration tests.
//!
//! Each test builds a throwaway project directory with a config file and a
//! releases JSON document, then runs the binary against it.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Returns a Command configured to run our binary.
#[allow(deprecated)]
fn cmd(project: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    cmd.env("CHANGELING_LOG_DIR", project.path().join("logs"))
        .args(["--color", "never", "-C", project.path().to_str().unwrap()]);
    cmd
}

fn project(config: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join(".git")).unwrap();
    fs::write(tmp.path().join(".changeling.toml"), config).unwrap();
    tmp
}

const RELEASES: &str = r#"[
  {
    "name": "___unreleased___",
    "date": "2024-05-02",
    "commits": [
      {
        "sha": "c3",
        "issueNumber": 12,
        "githubIssue": {
          "number": 12,
          "title": "Fixes #9 panic when config is empty",
          "user": { "login": "zoe", "html_url": "https://github.com/zoe", "name": "Zoe Q" },
          "pull_request": { "html_url": "https://github.com/acme/widgets/pull/12" },
          "labels": [{ "name": "bug" }]
        }
      },
      {
        "sha": "c4",
        "issueNumber": 13,
        "githubIssue": {
          "number": 13,
          "title": "Bump serde",
          "user": { "login": "renovate[bot]", "html_url": "https://github.com/apps/renovate" },
          "pull_request": { "html_url": "https://github.com/acme/widgets/pull/13" },
          "labels": [{ "name": "dependencies" }]
        }
      }
    ]
  },
  {
    "name": "v1.0.0",
    "date": "2024-04-01",
    "commits": [
      {
        "sha": "c1",
        "issueNumber": 10,
        "githubIssue": {
          "number": 10,
          "title": "Add --verbose",
          "user": { "login": "ann", "html_url": "https://github.com/ann" },
          "labels": [{ "name": "enhancement" }]
        }
      }
    ]
  },
  {
    "name": "v0.9.0",
    "date": "2024-03-01",
    "commits": [{ "sha": "c0", "message": "initial import" }]
  }
]"#;

const EXPECTED: &str = "\n# Changelog\n\nNotable changes to widgets.\n\n\
## Unreleased (2024-05-02)\n\n\
#### :bug: Bug Fix\n\
* [#12](https://github.com/acme/widgets/pull/12) Closes [#9](https://github.com/acme/widgets/issues/9) panic when config is empty ([@zoe](https://github.com/zoe))\n\n\
#### Committers: 1\n\
- Zoe Q ([@zoe](https://github.com/zoe))\n\n\n\
## v1.0.0 (2024-04-01)\n\n\
#### :rocket: Enhancement\n\
* Add --verbose ([@ann](https://github.com/ann))\n\n\
#### Committers: 1\n\
- [@ann](https://github.com/ann)\n";

const CONFIG: &str = r#"repo = "acme/widgets"
description = "Notable changes to widgets."
"#;

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn renders_releases_from_file() {
    let project = project(CONFIG);
    fs::write(project.path().join("releases.json"), RELEASES).unwrap();

    cmd(&project)
        .args(["render", "--input", "releases.json"])
        .assert()
        .success()
        .stdout(EXPECTED);
}

#[test]
fn renders_releases_from_stdin() {
    let project = project(CONFIG);

    cmd(&project)
        .args(["render", "--input", "-"])
        .write_stdin(RELEASES)
        .assert()
        .success()
        .stdout(EXPECTED);
}

#[test]
fn output_is_stable_across_runs() {
    let project = project(CONFIG);
    fs::write(project.path().join("releases.json"), RELEASES).unwrap();

    let run = || {
        cmd(&project)
            .args(["render", "--input", "releases.json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };
    assert_eq!(run(), run());
}

#[test]
fn writes_output_file() {
    let project = project(CONFIG);
    fs::write(project.path().join("releases.json"), RELEASES).unwrap();

    cmd(&project)
        .args(["render", "-i", "releases.json", "-o", "CHANGELOG.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let written = fs::read_to_string(project.path().join("CHANGELOG.md")).unwrap();
    assert_eq!(format!("{written}\n"), EXPECTED);
}

#[test]
fn json_output_wraps_markdown() {
    let project = project(CONFIG);
    fs::write(project.path().join("releases.json"), RELEASES).unwrap();

    let output = cmd(&project)
        .args(["--json", "render", "--input", "releases.json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("render --json should output valid JSON");
    assert_eq!(json["releases"], 3);
    assert_eq!(format!("{}\n", json["markdown"].as_str().unwrap()), EXPECTED);
}

#[test]
fn next_version_and_no_header() {
    let project = project(CONFIG);
    fs::write(project.path().join("releases.json"), RELEASES).unwrap();

    cmd(&project)
        .args([
            "render",
            "--input",
            "releases.json",
            "--next-version",
            "v1.1.0",
            "--no-header",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("\n## v1.1.0 (2024-05-02)"))
        .stdout(predicate::str::contains("# Changelog").not());
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn sections_group_commits() {
    let project = project(
        r#"repo = "acme/widgets"

[sections]
cli = "Command line"
"#,
    );
    let releases = r#"[{
      "name": "v2.0.0",
      "date": "2024-06-01",
      "contributors": [],
      "commits": [
        { "sha": "a", "issueNumber": 1, "section": "cli", "categories": [":bug: Bug Fix"],
          "githubIssue": { "number": 1, "title": "Quote paths",
                           "user": { "login": "ann", "html_url": "https://github.com/ann" } } },
        { "sha": "b", "issueNumber": 2, "categories": [":bug: Bug Fix"],
          "githubIssue": { "number": 2, "title": "Handle EOF",
                           "user": { "login": "bo", "html_url": "https://github.com/bo" } } }
      ]
    }]"#;

    cmd(&project)
        .args(["render", "--no-header"])
        .write_stdin(releases)
        .assert()
        .success()
        .stdout(
            "\n## v2.0.0 (2024-06-01)\n\n\
             ### Command line\n\n\
             #### ↳ :bug: Bug Fix\n\
             * Quote paths ([@ann](https://github.com/ann))\n\n\
             ### \n\n\
             #### ↳ :bug: Bug Fix\n\
             * Handle EOF ([@bo](https://github.com/bo))\n",
        );
}

#[test]
fn package_json_settings_apply() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join(".git")).unwrap();
    fs::write(
        tmp.path().join("package.json"),
        r#"{
  "version": "3.2.1",
  "repository": { "type": "git", "url": "git+https://github.com/acme/widgets.git" },
  "changelog": {
    "labels": { "type: fix": "Fixes" },
    "nextVersionFromMetadata": true
  }
}"#,
    )
    .unwrap();

    let releases = r#"[{
      "name": "___unreleased___",
      "date": "2024-07-01",
      "commits": [
        { "sha": "a", "issueNumber": 5,
          "githubIssue": { "number": 5, "title": "Closes T4 overflow",
                           "user": { "login": "ann", "html_url": "https://github.com/ann" },
                           "labels": [{ "name": "type: fix" }] } }
      ]
    }]"#;

    cmd(&tmp)
        .args(["render", "--no-header"])
        .write_stdin(releases)
        .assert()
        .success()
        .stdout(predicate::str::contains("## 3.2.1 (2024-07-01)"))
        .stdout(predicate::str::contains("#### Fixes\n* Closes [#4](https://github.com/acme/widgets/issues/4) overflow"));
}

// =============================================================================
// Error Cases
// =============================================================================

#[test]
fn missing_repo_fails() {
    let project = project("");

    cmd(&project)
        .args(["render"])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("repo"));
}

#[test]
fn malformed_input_fails() {
    let project = project(CONFIG);

    cmd(&project)
        .args(["render"])
        .write_stdin("{ not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON array of releases"));
}

#[test]
fn missing_input_file_fails() {
    let project = project(CONFIG);

    cmd(&project)
        .args(["render", "--input", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
