//! Command-line argument definitions for the gdtext CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Global options select the project, the configuration file
//! and the logging verbosity; subcommands select the operation.

use clap::{Parser, Subcommand};

/// Command-line arguments for the gdtext tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Project root; every path is resolved inside it
    #[arg(short, long, default_value = ".", global = true)]
    pub project: String,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read and edit scene files
    #[command(subcommand)]
    Scene(SceneCommand),

    /// Read and edit the project settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Print the absolute path a project path resolves to
    Resolve { path: String },
}

#[derive(Subcommand, Debug)]
pub enum SceneCommand {
    /// Print the parsed scene as JSON
    Show { scene: String },

    /// Report everything the reader drops or defaults
    Check {
        scene: String,

        /// Fail if there is any diagnostic
        #[arg(long)]
        strict: bool,
    },

    /// Declare a new node
    AddNode {
        scene: String,
        name: String,

        #[arg(long = "type")]
        type_name: Option<String>,

        /// Parent path, `.` for children of the root; omit for the root
        #[arg(long)]
        parent: Option<String>,

        /// Instanced scene, e.g. `ExtResource("1")`
        #[arg(long)]
        instance: Option<String>,

        #[arg(long = "group")]
        groups: Vec<String>,

        /// Initial property as `key=value`; repeatable
        #[arg(long = "property", value_parser = parse_key_value)]
        properties: Vec<(String, String)>,
    },

    /// Remove a node and its connections
    RemoveNode { scene: String, name: String },

    /// Rename a node and update every path naming it
    RenameNode {
        scene: String,
        old: String,
        new: String,
    },

    /// Set a node property
    SetProperty {
        scene: String,
        node: String,
        key: String,
        value: String,

        /// Read the value as JSON instead of a value expression
        #[arg(long)]
        json: bool,
    },

    /// Print a node property as JSON
    GetProperty {
        scene: String,
        node: String,
        key: String,
    },

    /// Remove a node property
    RemoveProperty {
        scene: String,
        node: String,
        key: String,
    },

    /// Declare an external resource and print its id
    AddResource {
        scene: String,

        #[arg(long = "type")]
        type_name: String,

        path: String,

        #[arg(long)]
        uid: Option<String>,
    },

    /// Connect a signal
    Connect {
        scene: String,
        signal: String,
        from: String,
        to: String,
        method: String,

        #[arg(long)]
        flags: Option<i64>,
    },

    /// Disconnect a signal
    Disconnect {
        scene: String,
        signal: String,
        from: String,
        to: String,
        method: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print a setting as JSON
    Get { key: String },

    /// Set a setting
    Set {
        key: String,
        value: String,

        /// Read the value as JSON instead of a value expression
        #[arg(long)]
        json: bool,
    },

    /// Print the input actions as JSON
    InputActions,
}

fn parse_key_value(text: &str) -> Result<(String, String), String> {
    text.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got `{text}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("position = Vector2(1, 2)").unwrap(),
            ("position".to_string(), "Vector2(1, 2)".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=1").is_err());
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let args = Args::try_parse_from([
            "gdtext", "scene", "show", "main.tscn", "--project", "game", "--log-level", "off",
        ])
        .unwrap();

        assert_eq!(args.project, "game");
        assert_eq!(args.log_level, "off");
        assert!(matches!(
            args.command,
            Command::Scene(SceneCommand::Show { ref scene }) if scene == "main.tscn"
        ));
    }

    #[test]
    fn test_add_node_options() {
        let args = Args::try_parse_from([
            "gdtext", "scene", "add-node", "main.tscn", "Enemy", "--type", "Node2D", "--parent",
            ".", "--group", "mobs", "--property", "speed=2",
        ])
        .unwrap();

        match args.command {
            Command::Scene(SceneCommand::AddNode {
                type_name,
                groups,
                properties,
                ..
            }) => {
                assert_eq!(type_name.as_deref(), Some("Node2D"));
                assert_eq!(groups, ["mobs"]);
                assert_eq!(properties, [("speed".to_string(), "2".to_string())]);
            }
            other => panic!("Expected add-node, got {other:?}"),
        }
    }
}
