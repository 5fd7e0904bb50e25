//! gdtext - sandboxed reading and editing of Godot scene and settings files.
//!
//! [`Project`] ties the pieces together: every path it is given goes through
//! the project's [`Sandbox`] before the filesystem is touched, every mutation
//! checks its preconditions on a freshly parsed document, and every write
//! replaces the target file atomically.

pub mod config;

mod error;

pub use gdtext_core::{sandbox, scene, settings, value};
pub use gdtext_parser::{error as diagnostics, patch::NewNode};

pub use error::GdtextError;

use std::{
    fs,
    io::Write as _,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use serde::Serialize;

use gdtext_core::{
    sandbox::Sandbox,
    scene::{Connection, SceneDocument},
    settings::{SettingsDocument, split_path},
    value::Value,
};
use gdtext_parser::{
    error::{Diagnostic, ParseError},
    patch,
};

use config::AppConfig;

/// An input action as reported by [`Project::input_actions`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadzone: Option<f64>,
    /// The action dictionary as written.
    pub raw: String,
}

/// A project directory whose files are read and edited in place.
///
/// # Examples
///
/// ```rust,no_run
/// use gdtext::{Project, config::AppConfig, value::Value};
///
/// let project = Project::open("my_game", AppConfig::default())
///     .expect("Failed to open project");
///
/// project
///     .set_node_property("scenes/player.tscn", "Player", "speed", &Value::Number(300.0))
///     .expect("Failed to set property");
/// ```
#[derive(Debug)]
pub struct Project {
    sandbox: Sandbox,
    config: AppConfig,
}

impl Project {
    /// Opens the project rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns `GdtextError::NotFound` if `root` is not a directory and
    /// `GdtextError::Config` if the configured settings file is empty.
    pub fn open(root: impl AsRef<Path>, config: AppConfig) -> Result<Self, GdtextError> {
        let sandbox = Sandbox::new(root.as_ref())?;
        if !sandbox.root().is_dir() {
            return Err(GdtextError::not_found(
                "Project directory",
                sandbox.root().display().to_string(),
            ));
        }
        if config.project().settings_file().trim().is_empty() {
            return Err(GdtextError::Config(
                "project.settings_file must not be empty".to_string(),
            ));
        }

        info!(root = sandbox.root().display().to_string(); "Opened project");
        Ok(Self { sandbox, config })
    }

    /// Returns the absolute project root.
    pub fn root(&self) -> &Path {
        self.sandbox.root()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Resolves a user-supplied path inside the project.
    ///
    /// # Errors
    ///
    /// Returns `GdtextError::AccessDenied` if the path leaves the project.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, GdtextError> {
        Ok(self.sandbox.resolve(path)?)
    }

    /// Reads and parses a scene file.
    ///
    /// # Errors
    ///
    /// Besides I/O and sandbox errors, returns `GdtextError::Parse` in strict
    /// mode when the reader reports any diagnostic.
    pub fn read_scene(&self, path: &str) -> Result<SceneDocument, GdtextError> {
        let (_, text) = self.read(path)?;
        self.parse_scene(path, &text)
    }

    /// Reads a scene file and returns its diagnostics, whatever the mode.
    pub fn check_scene(
        &self,
        path: &str,
    ) -> Result<(SceneDocument, Vec<Diagnostic>), GdtextError> {
        let (_, text) = self.read(path)?;
        Ok(gdtext_parser::parse_scene_with_diagnostics(&text))
    }

    /// Declares a new node in a scene.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the name is empty or contains `/`, if a second
    ///   root is declared, or if the parent already has a child of that name.
    /// - `NotFound` if the parent does not exist.
    pub fn add_node(&self, scene: &str, node: &NewNode) -> Result<(), GdtextError> {
        required("node name", &node.name)?;
        if node.name.contains('/') {
            return Err(GdtextError::InvalidArgument(format!(
                "node name must not contain '/': {}",
                node.name
            )));
        }

        let (path, text) = self.read(scene)?;
        let doc = self.parse_scene(scene, &text)?;
        let parent = match node.parent.as_deref() {
            None if doc.root().is_some() => {
                return Err(GdtextError::InvalidArgument(
                    "scene already has a root node".to_string(),
                ));
            }
            None => None,
            Some(parent) => Some(node_reference(&doc, parent)?),
        };
        if doc.find_child(parent.as_deref(), &node.name).is_some() {
            return Err(GdtextError::InvalidArgument(format!(
                "node already exists: {}",
                node.name
            )));
        }

        let node = NewNode {
            parent,
            ..node.clone()
        };
        self.write(&path, &patch::add_node(&text, &node))?;
        info!(scene, name = node.name.as_str(); "Added node");
        Ok(())
    }

    /// Removes a node and the connections from or to it.
    pub fn remove_node(&self, scene: &str, name: &str) -> Result<(), GdtextError> {
        required("node name", name)?;
        let (path, text) = self.read(scene)?;
        let doc = self.parse_scene(scene, &text)?;
        if doc.find_node(name).is_none() {
            return Err(GdtextError::not_found("Node", name));
        }

        self.write(&path, &patch::remove_node(&text, name))?;
        info!(scene, name; "Removed node");
        Ok(())
    }

    /// Renames a node and every path that refers to it.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if either name is empty or contains `/`, or if a
    ///   sibling already uses the new name.
    /// - `NotFound` if no node is called `old`.
    pub fn rename_node(&self, scene: &str, old: &str, new: &str) -> Result<(), GdtextError> {
        required("old name", old)?;
        required("new name", new)?;
        if old.contains('/') || new.contains('/') {
            return Err(GdtextError::InvalidArgument(
                "node names must not contain '/'".to_string(),
            ));
        }

        let (path, text) = self.read(scene)?;
        let doc = self.parse_scene(scene, &text)?;
        let node = doc
            .find_node(old)
            .ok_or_else(|| GdtextError::not_found("Node", old))?;
        if doc.find_child(node.parent.as_deref(), new).is_some() {
            return Err(GdtextError::InvalidArgument(format!(
                "node already exists: {new}"
            )));
        }

        self.write(&path, &patch::rename_node(&text, old, new))?;
        info!(scene, old, new; "Renamed node");
        Ok(())
    }

    /// Sets a node property to an encoded value.
    pub fn set_node_property(
        &self,
        scene: &str,
        node: &str,
        key: &str,
        value: &Value,
    ) -> Result<(), GdtextError> {
        required("property name", key)?;
        let (path, text) = self.read(scene)?;
        let doc = self.parse_scene(scene, &text)?;
        if doc.find_node(node).is_none() {
            return Err(GdtextError::not_found("Node", node));
        }

        let encoded = value::encode(value);
        self.write(&path, &patch::set_property(&text, node, key, &encoded))?;
        info!(scene, node, key, value = encoded.as_str(); "Set node property");
        Ok(())
    }

    /// Removes a node property.
    pub fn remove_node_property(
        &self,
        scene: &str,
        node: &str,
        key: &str,
    ) -> Result<(), GdtextError> {
        let (path, text) = self.read(scene)?;
        let doc = self.parse_scene(scene, &text)?;
        let found = doc
            .find_node(node)
            .ok_or_else(|| GdtextError::not_found("Node", node))?;
        if !found.properties.contains_key(key) {
            return Err(GdtextError::not_found("Property", key));
        }

        self.write(&path, &patch::remove_property(&text, node, key))?;
        info!(scene, node, key; "Removed node property");
        Ok(())
    }

    /// Returns the decoded value of a node property.
    pub fn node_property(&self, scene: &str, node: &str, key: &str) -> Result<Value, GdtextError> {
        let doc = self.read_scene(scene)?;
        if doc.find_node(node).is_none() {
            return Err(GdtextError::not_found("Node", node));
        }
        doc.property(node, key)
            .ok_or_else(|| GdtextError::not_found("Property", key))
    }

    /// Declares an external resource and returns its id.
    ///
    /// The resource path must lie inside the project.
    pub fn add_ext_resource(
        &self,
        scene: &str,
        type_name: &str,
        resource: &str,
        uid: Option<&str>,
    ) -> Result<String, GdtextError> {
        required("resource type", type_name)?;
        required("resource path", resource)?;
        self.resolve(resource)?;

        let (path, text) = self.read(scene)?;
        self.parse_scene(scene, &text)?;
        let (updated, id) = patch::add_ext_resource(&text, type_name, resource, uid);
        self.write(&path, &updated)?;
        info!(scene, resource, id = id.as_str(); "Added external resource");
        Ok(id)
    }

    /// Connects a signal.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if a field is empty or the connection exists.
    /// - `NotFound` if the source or target node does not exist.
    pub fn connect_signal(&self, scene: &str, connection: &Connection) -> Result<(), GdtextError> {
        required("signal", &connection.signal)?;
        required("from", &connection.from)?;
        required("to", &connection.to)?;
        required("method", &connection.method)?;

        let (path, text) = self.read(scene)?;
        let doc = self.parse_scene(scene, &text)?;
        let connection = Connection {
            from: node_reference(&doc, &connection.from)?,
            to: node_reference(&doc, &connection.to)?,
            ..connection.clone()
        };
        if doc.has_connection(&connection) {
            return Err(GdtextError::InvalidArgument(format!(
                "connection already exists: {} from {} to {}::{}",
                connection.signal, connection.from, connection.to, connection.method
            )));
        }

        self.write(&path, &patch::add_connection(&text, &connection))?;
        info!(scene, signal = connection.signal.as_str(); "Connected signal");
        Ok(())
    }

    /// Disconnects a signal.
    pub fn disconnect_signal(
        &self,
        scene: &str,
        signal: &str,
        from: &str,
        to: &str,
        method: &str,
    ) -> Result<(), GdtextError> {
        let (path, text) = self.read(scene)?;
        let doc = self.parse_scene(scene, &text)?;
        if !doc.has_connection(&Connection::new(signal, from, to, method)) {
            return Err(GdtextError::not_found(
                "Connection",
                format!("{signal} from {from} to {to}::{method}"),
            ));
        }

        self.write(
            &path,
            &patch::remove_connection(&text, signal, from, to, method),
        )?;
        info!(scene, signal; "Disconnected signal");
        Ok(())
    }

    /// Reads and parses the project settings file.
    pub fn read_settings(&self) -> Result<SettingsDocument, GdtextError> {
        let file = self.config.project().settings_file();
        let (_, text) = self.read(file)?;
        let (doc, diagnostics) = gdtext_parser::parse_settings_with_diagnostics(&text);
        self.accept(file, diagnostics, &text)?;
        Ok(doc)
    }

    /// Returns the decoded value of a setting.
    pub fn setting(&self, key: &str) -> Result<Value, GdtextError> {
        setting_path(key)?;
        let doc = self.read_settings()?;
        doc.get(key)
            .map(value::decode)
            .ok_or_else(|| GdtextError::not_found("Setting", key))
    }

    /// Sets a setting to an encoded value.
    pub fn set_setting(&self, key: &str, value: &Value) -> Result<(), GdtextError> {
        setting_path(key)?;
        let file = self.config.project().settings_file();
        let (path, text) = self.read(file)?;
        let (_, diagnostics) = gdtext_parser::parse_settings_with_diagnostics(&text);
        self.accept(file, diagnostics, &text)?;

        let encoded = value::encode(value);
        self.write(&path, &gdtext_parser::set_setting(&text, key, &encoded))?;
        info!(key, value = encoded.as_str(); "Set setting");
        Ok(())
    }

    /// Returns the declared input actions.
    pub fn input_actions(&self) -> Result<Vec<Action>, GdtextError> {
        let doc = self.read_settings()?;
        Ok(doc
            .input_actions()
            .into_iter()
            .map(|action| Action {
                name: action.name.to_string(),
                deadzone: action.deadzone(),
                raw: action.raw.to_string(),
            })
            .collect())
    }

    fn read(&self, path: &str) -> Result<(PathBuf, String), GdtextError> {
        let resolved = self.resolve(path)?;
        debug!(path = resolved.display().to_string(); "Reading file");
        let text = fs::read_to_string(&resolved)?;
        Ok((resolved, text))
    }

    /// Replaces `path` through a temporary file in the same directory.
    fn write(&self, path: &Path, text: &str) -> Result<(), GdtextError> {
        let directory = path.parent().unwrap_or_else(|| self.root());
        let mut file = tempfile::NamedTempFile::new_in(directory)?;
        file.write_all(text.as_bytes())?;
        if let Ok(metadata) = fs::metadata(path) {
            file.as_file().set_permissions(metadata.permissions())?;
        }
        file.persist(path).map_err(|err| err.error)?;
        debug!(path = path.display().to_string(), bytes = text.len(); "Wrote file");
        Ok(())
    }

    fn parse_scene(&self, path: &str, text: &str) -> Result<SceneDocument, GdtextError> {
        let (doc, diagnostics) = gdtext_parser::parse_scene_with_diagnostics(text);
        self.accept(path, diagnostics, text)?;
        Ok(doc)
    }

    /// Logs diagnostics, refusing the file in strict mode.
    fn accept(
        &self,
        path: &str,
        diagnostics: Vec<Diagnostic>,
        text: &str,
    ) -> Result<(), GdtextError> {
        for diagnostic in &diagnostics {
            warn!(path, diagnostic = diagnostic.to_string(); "Lenient read");
        }
        if self.config.parse().strict() && !diagnostics.is_empty() {
            return Err(GdtextError::new_parse_error(
                ParseError::new(diagnostics),
                text,
            ));
        }
        Ok(())
    }
}

/// The reference a scene file uses for `name`: `"."` for the root, the
/// path relative to the root otherwise.
fn node_reference(doc: &SceneDocument, name: &str) -> Result<String, GdtextError> {
    let node = doc
        .find_node(name)
        .ok_or_else(|| GdtextError::not_found("Node", name))?;
    if node.is_root() {
        return Ok(".".to_string());
    }
    Ok(doc.node_path(node))
}

fn required(what: &str, value: &str) -> Result<(), GdtextError> {
    if value.trim().is_empty() {
        return Err(GdtextError::InvalidArgument(format!("{what} must not be empty")));
    }
    Ok(())
}

fn setting_path(key: &str) -> Result<(), GdtextError> {
    match split_path(key) {
        Some((_, name)) if !name.is_empty() => Ok(()),
        _ => Err(GdtextError::InvalidArgument(format!(
            "setting path needs a section and a key: {key}"
        ))),
    }
}
