//! Core library for changeling.
//!
//! Turns releases harvested from a repository (commits linked to GitHub
//! issues and pull requests) into a markdown changelog. Harvesting itself
//! lives outside this crate; everything here is pure data in, text out,
//! plus the configuration that shapes it.
//!
//! # Modules
//!
//! - [`classify`] - Group commits into categories and sections
//! - [`config`] - Configuration loading and management
//! - [`enrich`] - Derive categories and contributors from issue data
//! - [`error`] - Error types and result aliases
//! - [`format`] - Entry, title and contributor formatting
//! - [`manifest`] - `package.json` metadata
//! - [`model`] - Releases, commits and GitHub records
//! - [`multimap`] - Insertion-ordered grouping map
//! - [`packages`] - Per-package bucketing for monorepos
//! - [`render`] - Markdown rendering
//!
//! # Quick Start
//!
//! ```no_run
//! use changeling_core::{ConfigLoader, MarkdownRenderer};
//!
//! let config = ConfigLoader::new()
//!     .with_user_config(true)
//!     .load()
//!     .expect("Failed to load configuration");
//! let resolved = config.resolve(None).expect("Failed to resolve configuration");
//!
//! let markdown = MarkdownRenderer::new(&resolved).render_document(&[]);
//! println!("{markdown}");
//! ```
#![deny(unsafe_code)]

pub mod classify;

pub mod config;

pub mod enrich;

pub mod error;

pub mod format;

pub mod manifest;

pub mod model;

pub mod multimap;

pub mod packages;

pub mod render;

pub use config::{Config, ConfigLoader, LogLevel};

pub use error::{ConfigError, ConfigResult};

pub use model::{Commit, Release};

pub use render::{Configuration, MarkdownRenderer, RenderStrategy};
