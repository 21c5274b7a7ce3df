//! Info command: package, configuration and project information.

use camino::Utf8Path;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use changeling_core::config::{self, Config};
use changeling_core::manifest::ProjectManifest;

/// Arguments for the `info` subcommand.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    repository: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    license: &'static str,
}

impl PackageInfo {
    const fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            repository: env!("CARGO_PKG_REPOSITORY"),
            license: env!("CARGO_PKG_LICENSE"),
        }
    }
}

#[derive(Serialize)]
struct ConfigInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    log_level: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<String>,
}

#[derive(Serialize)]
struct ProjectInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    manifest_version: Option<String>,
    unreleased_name: String,
    categories: Vec<String>,
    sections: Vec<String>,
}

impl ProjectInfo {
    fn new(config: &Config, manifest: Option<&ProjectManifest>) -> Self {
        Self {
            repo: config.repo(manifest),
            manifest_version: manifest.and_then(|m| m.version.clone()),
            unreleased_name: config.unreleased_name.clone(),
            categories: config.labels.categories(),
            sections: config.sections.values().cloned().collect(),
        }
    }
}

#[derive(Serialize)]
struct FullInfo {
    #[serde(flatten)]
    package: PackageInfo,
    config: ConfigInfo,
    project: ProjectInfo,
}

impl FullInfo {
    fn gather(config: &Config, manifest: Option<&ProjectManifest>, cwd: &Utf8Path) -> Self {
        Self {
            package: PackageInfo::new(),
            config: ConfigInfo {
                config_file: config::find_project_config(cwd).map(|p| p.to_string()),
                log_level: config.log_level.as_str(),
                log_dir: config.log_dir.as_ref().map(|p| p.to_string()),
            },
            project: ProjectInfo::new(config, manifest),
        }
    }
}

/// Print package, configuration and project information.
///
/// # Arguments
/// * `global_json` - Global `--json` flag from CLI
/// * `config` - Loaded configuration
/// * `manifest` - Project `package.json`, when present
/// * `cwd` - Current working directory for config discovery
#[instrument(name = "cmd_info", skip_all, fields(json_output))]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    config: &Config,
    manifest: Option<&ProjectManifest>,
    cwd: &Utf8Path,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing info command");
    let info = FullInfo::gather(config, manifest, cwd);

    if global_json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!(
        "{} {}",
        info.package.name.bold(),
        info.package.version.green()
    );
    if !info.package.description.is_empty() {
        println!("{}", info.package.description);
    }
    if !info.package.license.is_empty() {
        println!("{}: {}", "License".dimmed(), info.package.license);
    }
    if !info.package.repository.is_empty() {
        println!(
            "{}: {}",
            "Repository".dimmed(),
            info.package.repository.cyan()
        );
    }

    println!();
    println!("{}", "Configuration".bold().underline());
    match info.config.config_file {
        Some(ref path) => println!("{}: {}", "Config file".dimmed(), path.cyan()),
        None => println!("{}: {}", "Config file".dimmed(), "none loaded".yellow()),
    }
    println!("{}: {}", "Log level".dimmed(), info.config.log_level);
    if let Some(ref dir) = info.config.log_dir {
        println!("{}: {}", "Log directory".dimmed(), dir);
    }

    println!();
    println!("{}", "Project".bold().underline());
    match info.project.repo {
        Some(ref repo) => println!("{}: {}", "GitHub repo".dimmed(), repo.cyan()),
        None => println!(
            "  {} {}",
            "○".yellow(),
            "No repository configured or found in package.json".yellow()
        ),
    }
    if let Some(ref version) = info.project.manifest_version {
        println!("{}: {}", "Package version".dimmed(), version);
    }
    println!(
        "{}: {}",
        "Unreleased label".dimmed(),
        info.project.unreleased_name
    );
    println!("{}:", "Categories".dimmed());
    for category in &info.project.categories {
        println!("  - {category}");
    }
    if !info.project.sections.is_empty() {
        println!("{}:", "Sections".dimmed());
        for section in &info.project.sections {
            println!("  - {section}");
        }
    }

    Ok(())
}
