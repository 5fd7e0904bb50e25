//! Structured scene documents.
//!
//! A [`SceneDocument`] is the read-side view of one scene file: its header,
//! resource declarations, node tree and signal connections. Property values
//! are kept as raw expression text; [`SceneDocument::property`] decodes them
//! on demand with the [`value`](crate::value) codec.
//!
//! Documents are plain data. They are produced by the scene reader and never
//! written back; every mutation works on the raw text instead.

use indexmap::IndexMap;
use serde::Serialize;

use crate::value::{self, Value};

/// Format version assumed when the header does not declare one.
pub const DEFAULT_FORMAT: i64 = 3;

/// Load step count assumed when the header does not declare one.
pub const DEFAULT_LOAD_STEPS: i64 = 1;

/// The `[gd_scene ...]` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneHeader {
    pub format: i64,
    pub load_steps: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl Default for SceneHeader {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT,
            load_steps: DEFAULT_LOAD_STEPS,
            uid: None,
        }
    }
}

/// An `[ext_resource ...]` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtResource {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub path: String,
    pub id: String,
}

/// A `[sub_resource ...]` declaration and its properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubResource {
    #[serde(rename = "type")]
    pub type_name: String,
    pub id: String,
    pub properties: IndexMap<String, String>,
}

/// A `[node ...]` declaration and its properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SceneNode {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// `None` for the root, `"."` for children of the root, otherwise the
    /// slash-separated path of the parent relative to the root.
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    pub properties: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

impl SceneNode {
    /// Creates a node with no attributes besides its name and parent.
    pub fn new(name: impl Into<String>, parent: Option<String>) -> Self {
        Self {
            name: name.into(),
            parent,
            ..Self::default()
        }
    }

    /// Returns `true` if the node has no `parent` attribute.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A `[connection ...]` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub signal: String,
    pub from: String,
    pub to: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<i64>,
}

impl Connection {
    /// Creates a connection without flags.
    pub fn new(
        signal: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            signal: signal.into(),
            from: from.into(),
            to: to.into(),
            method: method.into(),
            flags: None,
        }
    }

    /// Returns `true` if both connections link the same signal to the same
    /// method. Flags are not compared.
    pub fn same_link(&self, other: &Connection) -> bool {
        self.signal == other.signal
            && self.from == other.from
            && self.to == other.to
            && self.method == other.method
    }
}

/// A parsed scene file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SceneDocument {
    pub header: SceneHeader,
    pub ext_resources: Vec<ExtResource>,
    pub sub_resources: Vec<SubResource>,
    pub nodes: Vec<SceneNode>,
    pub connections: Vec<Connection>,
    /// The text the document was parsed from.
    #[serde(skip)]
    pub raw: String,
}

impl SceneDocument {
    /// Returns the root node: the first node without a `parent` attribute.
    pub fn root(&self) -> Option<&SceneNode> {
        self.nodes.iter().find(|node| node.is_root())
    }

    /// Finds a node by name, or by path when `name` contains a `/`.
    ///
    /// Paths are relative to the root, as produced by
    /// [`SceneDocument::node_path`]; `"."` names the root.
    pub fn find_node(&self, name: &str) -> Option<&SceneNode> {
        if name == "." {
            return self.root();
        }
        if name.contains('/') {
            return self.nodes.iter().find(|node| self.node_path(node) == name);
        }
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Finds the node called `name` under `parent`.
    pub fn find_child(&self, parent: Option<&str>, name: &str) -> Option<&SceneNode> {
        self.nodes
            .iter()
            .find(|node| node.name == name && node.parent.as_deref() == parent)
    }

    /// Returns the path of `node` relative to the root.
    ///
    /// The root and direct children of the root are addressed by their bare
    /// name; deeper nodes by `parent/name`.
    pub fn node_path(&self, node: &SceneNode) -> String {
        match node.parent.as_deref() {
            None | Some(".") => node.name.clone(),
            Some(parent) => format!("{parent}/{}", node.name),
        }
    }

    /// Returns the decoded value of property `key` on node `name`.
    pub fn property(&self, name: &str, key: &str) -> Option<Value> {
        self.find_node(name)?
            .properties
            .get(key)
            .map(|raw| value::decode(raw))
    }

    /// Finds an external resource by id.
    pub fn ext_resource(&self, id: &str) -> Option<&ExtResource> {
        self.ext_resources.iter().find(|resource| resource.id == id)
    }

    /// Finds an embedded resource by id.
    pub fn sub_resource(&self, id: &str) -> Option<&SubResource> {
        self.sub_resources.iter().find(|resource| resource.id == id)
    }

    /// Returns `true` if an equivalent connection is already declared.
    pub fn has_connection(&self, connection: &Connection) -> bool {
        self.connections
            .iter()
            .any(|existing| existing.same_link(connection))
    }
}
