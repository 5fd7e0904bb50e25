//! CLI logic for the gdtext tool.
//!
//! [`run`] maps each subcommand onto one [`Project`] operation. Output goes
//! to the writer it is given: JSON for documents and values, plain lines for
//! paths, ids and diagnostics.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command, SceneCommand, SettingsCommand};

use std::{
    io::{self, Write},
    path::Path,
};

use log::info;
use gdtext::{
    GdtextError, NewNode, Project,
    diagnostics::{Diagnostic, ParseError},
    scene::Connection,
    value::{self, Value},
};

/// Run the gdtext CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
/// * `out` - Destination for the command's output
///
/// # Errors
///
/// Returns `GdtextError` for:
/// - Configuration loading errors
/// - Paths outside the project
/// - File I/O errors
/// - Failed preconditions of the requested edit
/// - Diagnostics in strict mode
pub fn run(args: &Args, out: &mut dyn Write) -> Result<(), GdtextError> {
    let app_config = config::load_config(args.config.as_ref(), Path::new(&args.project))?;
    let project = Project::open(&args.project, app_config)?;

    match &args.command {
        Command::Scene(command) => run_scene(&project, command, out),
        Command::Settings(command) => run_settings(&project, command, out),
        Command::Resolve { path } => {
            let resolved = project.resolve(path)?;
            writeln!(out, "{}", resolved.display())?;
            Ok(())
        }
    }
}

fn run_scene(
    project: &Project,
    command: &SceneCommand,
    out: &mut dyn Write,
) -> Result<(), GdtextError> {
    match command {
        SceneCommand::Show { scene } => {
            let doc = project.read_scene(scene)?;
            write_json(out, &serde_json::to_value(&doc).map_err(io::Error::from)?)
        }
        SceneCommand::Check { scene, strict } => {
            let (doc, diagnostics) = project.check_scene(scene)?;
            for diagnostic in &diagnostics {
                writeln!(
                    out,
                    "{scene}:{}: {diagnostic}",
                    line_number(&doc.raw, diagnostic)
                )?;
            }
            info!(scene, diagnostics = diagnostics.len(); "Checked scene");

            let strict = *strict || project.config().parse().strict();
            if strict && !diagnostics.is_empty() {
                return Err(GdtextError::new_parse_error(
                    ParseError::new(diagnostics),
                    doc.raw,
                ));
            }
            Ok(())
        }
        SceneCommand::AddNode {
            scene,
            name,
            type_name,
            parent,
            instance,
            groups,
            properties,
        } => {
            let node = NewNode {
                name: name.clone(),
                type_name: type_name.clone(),
                parent: parent.clone(),
                instance: instance.clone(),
                groups: groups.clone(),
                properties: properties.clone(),
            };
            project.add_node(scene, &node)
        }
        SceneCommand::RemoveNode { scene, name } => project.remove_node(scene, name),
        SceneCommand::RenameNode { scene, old, new } => project.rename_node(scene, old, new),
        SceneCommand::SetProperty {
            scene,
            node,
            key,
            value,
            json,
        } => {
            let value = parse_value(value, *json)?;
            project.set_node_property(scene, node, key, &value)
        }
        SceneCommand::GetProperty { scene, node, key } => {
            let value = project.node_property(scene, node, key)?;
            write_json(out, &value.to_json())
        }
        SceneCommand::RemoveProperty { scene, node, key } => {
            project.remove_node_property(scene, node, key)
        }
        SceneCommand::AddResource {
            scene,
            type_name,
            path,
            uid,
        } => {
            let id = project.add_ext_resource(scene, type_name, path, uid.as_deref())?;
            writeln!(out, "{id}")?;
            Ok(())
        }
        SceneCommand::Connect {
            scene,
            signal,
            from,
            to,
            method,
            flags,
        } => {
            let connection = Connection {
                flags: *flags,
                ..Connection::new(signal, from, to, method)
            };
            project.connect_signal(scene, &connection)
        }
        SceneCommand::Disconnect {
            scene,
            signal,
            from,
            to,
            method,
        } => project.disconnect_signal(scene, signal, from, to, method),
    }
}

fn run_settings(
    project: &Project,
    command: &SettingsCommand,
    out: &mut dyn Write,
) -> Result<(), GdtextError> {
    match command {
        SettingsCommand::Get { key } => {
            let value = project.setting(key)?;
            write_json(out, &value.to_json())
        }
        SettingsCommand::Set { key, value, json } => {
            let value = parse_value(value, *json)?;
            project.set_setting(key, &value)
        }
        SettingsCommand::InputActions => {
            let actions = project.input_actions()?;
            write_json(out, &serde_json::to_value(&actions).map_err(io::Error::from)?)
        }
    }
}

/// Reads a command-line value, either as a value expression or as JSON.
fn parse_value(text: &str, json: bool) -> Result<Value, GdtextError> {
    if !json {
        return Ok(value::decode(text));
    }
    let parsed: serde_json::Value = serde_json::from_str(text)
        .map_err(|err| GdtextError::InvalidArgument(format!("invalid JSON value: {err}")))?;
    Ok(Value::from_json(&parsed))
}

fn write_json(out: &mut dyn Write, value: &serde_json::Value) -> Result<(), GdtextError> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

/// One-based line of the diagnostic's primary label, or of the file start.
fn line_number(source: &str, diagnostic: &Diagnostic) -> usize {
    let offset = diagnostic
        .labels()
        .iter()
        .find(|label| label.is_primary())
        .map_or(0, |label| label.span().start().min(source.len()));
    source[..offset].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use gdtext::diagnostics::ErrorCode;
    use gdtext_parser::Span;

    use super::*;

    #[test]
    fn test_parse_value_expression() {
        assert_eq!(
            parse_value("Vector2(1, 2)", false).unwrap(),
            Value::Vector2 { x: 1.0, y: 2.0 }
        );
    }

    #[test]
    fn test_parse_value_json() {
        assert_eq!(
            parse_value(r#"{"x": 3, "y": 4}"#, true).unwrap(),
            Value::Vector2 { x: 3.0, y: 4.0 }
        );
        assert!(matches!(
            parse_value("{not json", true),
            Err(GdtextError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_line_number() {
        let source = "[gd_scene]\n\n[node]\n";
        let diagnostic = Diagnostic::warning("missing name")
            .with_code(ErrorCode::E100)
            .with_label(Span::new(12..18), "here");

        assert_eq!(line_number(source, &diagnostic), 3);
        assert_eq!(line_number(source, &Diagnostic::warning("no label")), 1);
    }
}
