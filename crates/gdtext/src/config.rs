//! Configuration types for gdtext projects.
//!
//! All types implement [`serde::Deserialize`] so that front ends can load
//! them from a configuration file. Every field has a default, so an empty
//! file is a valid configuration.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`ProjectConfig`] - Where project files live inside the project root.
//! - [`ParseConfig`] - How strictly files are read.
//!
//! # Example
//!
//! ```
//! # use gdtext::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.project().settings_file(), "project.godot");
//! assert!(!config.parse().strict());
//! ```

use serde::Deserialize;

/// Default name of the project-settings file.
pub const DEFAULT_SETTINGS_FILE: &str = "project.godot";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Project layout section.
    #[serde(default)]
    project: ProjectConfig,

    /// Parsing section.
    #[serde(default)]
    parse: ParseConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(project: ProjectConfig, parse: ParseConfig) -> Self {
        Self { project, parse }
    }

    /// Returns the project configuration.
    pub fn project(&self) -> &ProjectConfig {
        &self.project
    }

    /// Returns the parse configuration.
    pub fn parse(&self) -> &ParseConfig {
        &self.parse
    }
}

/// Locations of project files.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Settings file, relative to the project root.
    #[serde(default = "default_settings_file")]
    settings_file: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            settings_file: default_settings_file(),
        }
    }
}

impl ProjectConfig {
    /// Creates a new [`ProjectConfig`] with the given settings file.
    pub fn new(settings_file: impl Into<String>) -> Self {
        Self {
            settings_file: settings_file.into(),
        }
    }

    /// Returns the settings file path, relative to the project root.
    pub fn settings_file(&self) -> &str {
        &self.settings_file
    }
}

/// Reader strictness.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ParseConfig {
    /// Refuse files that produce any diagnostic instead of reading what can
    /// be read.
    #[serde(default)]
    strict: bool,
}

impl ParseConfig {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// Returns `true` if files with diagnostics are refused.
    pub fn strict(&self) -> bool {
        self.strict
    }
}

fn default_settings_file() -> String {
    DEFAULT_SETTINGS_FILE.to_string()
}
