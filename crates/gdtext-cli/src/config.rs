//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, project directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use gdtext::{GdtextError, config::AppConfig};

/// Location of the configuration file inside a project.
const PROJECT_CONFIG: &str = "gdtext/config.toml";

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),
}

impl From<ConfigError> for GdtextError {
    fn from(err: ConfigError) -> Self {
        GdtextError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. The project directory (`gdtext/config.toml`)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(
    explicit_path: Option<impl AsRef<Path>>,
    project_root: &Path,
) -> Result<AppConfig, GdtextError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let project_config = project_root.join(PROJECT_CONFIG);
    if project_config.exists() {
        info!(path = project_config.display().to_string(); "Loading configuration from project");
        return load_config_file(&project_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "gdtext", "gdtext") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, GdtextError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_project_config_is_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("gdtext")).unwrap();
        fs::write(
            dir.path().join(PROJECT_CONFIG),
            "[project]\nsettings_file = \"engine.cfg\"\n\n[parse]\nstrict = true\n",
        )
        .unwrap();

        let config = load_config(None::<&Path>, dir.path()).unwrap();
        assert_eq!(config.project().settings_file(), "engine.cfg");
        assert!(config.parse().strict());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        fs::write(&path, "[parse]\n").unwrap();

        let config = load_config(Some(&path), dir.path()).unwrap();
        assert_eq!(config.project().settings_file(), "project.godot");
        assert!(!config.parse().strict());
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempdir().unwrap();
        let err = load_config(Some(dir.path().join("nope.toml")), dir.path()).unwrap_err();

        assert!(matches!(err, GdtextError::Config(_)));
        assert!(err.to_string().contains("Missing configuration file"));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[parse\nstrict = ").unwrap();

        let err = load_config(Some(&path), dir.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML configuration"));
    }
}
