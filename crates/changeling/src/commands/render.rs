//! Render command: releases JSON in, markdown changelog out.

use std::borrow::Cow;
use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use camino::Utf8Path;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, info, instrument};

use changeling_core::config::Config;
use changeling_core::enrich;
use changeling_core::manifest::ProjectManifest;
use changeling_core::{MarkdownRenderer, Release};

use crate::highlight;

/// Arguments for the `render` subcommand.
#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    /// Releases as a JSON array (`-` or omitted reads stdin)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Write the changelog to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Show unreleased changes under this version
    #[arg(long, value_name = "VERSION")]
    pub next_version: Option<String>,

    /// Skip the title and description, emit releases only
    #[arg(long)]
    pub no_header: bool,
}

#[derive(Serialize)]
struct RenderOutput<'a> {
    markdown: &'a str,
    releases: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
}

/// Render releases read from `--input` (or stdin) into markdown.
///
/// # Arguments
/// * `global_json` - Global `--json` flag from CLI
/// * `config` - Loaded configuration
/// * `manifest` - Project `package.json`, when present
/// * `cwd` - Directory relative paths are resolved against
#[instrument(name = "cmd_render", skip_all, fields(json_output))]
pub fn cmd_render(
    args: RenderArgs,
    global_json: bool,
    config: &Config,
    manifest: Option<&ProjectManifest>,
    cwd: &Utf8Path,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, ?args, "executing render command");

    let raw = read_input(args.input.as_ref(), cwd)?;
    let releases: Vec<Release> =
        serde_json::from_str(&raw).context("input is not a JSON array of releases")?;
    let count = releases.len();

    let markdown = build_markdown(releases, config, manifest, &args)?;
    info!(releases = count, bytes = markdown.len(), "changelog rendered");

    let output_path = args.output.as_ref().map(|path| cwd.as_std_path().join(path));
    if let Some(ref path) = output_path {
        std::fs::write(path, &markdown)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    if global_json {
        let report = RenderOutput {
            markdown: &markdown,
            releases: count,
            output: output_path.as_ref().map(|p| p.display().to_string()),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if let Some(ref path) = output_path {
        println!(
            "{} {}",
            "Wrote".green().bold(),
            path.display().to_string().cyan()
        );
    } else {
        println!("{}", highlight::highlight(&markdown));
    }

    Ok(())
}

/// Enrich releases, resolve configuration and render.
fn build_markdown(
    mut releases: Vec<Release>,
    config: &Config,
    manifest: Option<&ProjectManifest>,
    args: &RenderArgs,
) -> anyhow::Result<String> {
    let config = match args.next_version {
        Some(ref version) => Cow::Owned(Config {
            next_version: Some(version.clone()),
            ..config.clone()
        }),
        None => Cow::Borrowed(config),
    };

    for release in &mut releases {
        enrich::fill_in_categories(
            &mut release.commits,
            &config.labels,
            config.wildcard_label.as_deref(),
        );
        enrich::fill_in_contributors(release, &config.ignore_committers);
    }

    let resolved = config
        .resolve(manifest)
        .context("failed to resolve configuration")?;
    let renderer = MarkdownRenderer::new(&resolved);

    Ok(if args.no_header {
        renderer.render_markdown(&releases)
    } else {
        renderer.render_document(&releases)
    })
}

fn read_input(input: Option<&PathBuf>, cwd: &Utf8Path) -> anyhow::Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => {
            let path = cwd.as_std_path().join(path);
            std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))
        }
        _ => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read releases from stdin")?;
            Ok(raw)
        }
    }
}
