//! Text patches over raw scene source.
//!
//! Every operation takes the current text and returns the new text. Only the
//! lines an operation is about are touched; comments, spacing and unrelated
//! sections come through byte for byte. None of the operations validate
//! their arguments against the scene: a node that does not exist leaves the
//! text unchanged, and a duplicate connection is appended like any other.
//! Callers check preconditions on a parsed [`SceneDocument`] first.
//!
//! [`SceneDocument`]: gdtext_core::scene::SceneDocument

use gdtext_core::{scene::Connection, value::quote};
use log::{debug, trace};

use crate::{
    edit::Edits,
    lines::{Header, Line, LineKind, scan},
    span::Span,
};

/// A node to be declared by [`add_node`].
///
/// # Example
///
/// ```
/// # use gdtext_parser::patch::{NewNode, add_node};
/// let node = NewNode::new("Sprite")
///     .with_type("Sprite2D")
///     .with_parent(".")
///     .with_property("position", "Vector2(4, 8)");
///
/// let text = add_node("[gd_scene format=3]\n\n[node name=\"Root\" type=\"Node2D\"]\n", &node);
/// assert!(text.ends_with(
///     "[node name=\"Sprite\" type=\"Sprite2D\" parent=\".\"]\nposition = Vector2(4, 8)\n"
/// ));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewNode {
    pub name: String,
    pub type_name: Option<String>,
    pub parent: Option<String>,
    /// Written as is, e.g. `ExtResource("1")`.
    pub instance: Option<String>,
    pub groups: Vec<String>,
    /// Key and raw value expression pairs.
    pub properties: Vec<(String, String)>,
}

impl NewNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }

    /// The header line and property lines, without a trailing newline.
    fn declaration(&self) -> String {
        let mut header = format!("[node name={}", quote(&self.name));
        if let Some(type_name) = &self.type_name {
            header.push_str(&format!(" type={}", quote(type_name)));
        }
        if let Some(parent) = &self.parent {
            header.push_str(&format!(" parent={}", quote(parent)));
        }
        if let Some(instance) = &self.instance {
            header.push_str(&format!(" instance={instance}"));
        }
        if !self.groups.is_empty() {
            let groups: Vec<String> = self.groups.iter().map(|group| quote(group)).collect();
            header.push_str(&format!(" groups=[{}]", groups.join(", ")));
        }
        header.push(']');

        let mut lines = vec![header];
        lines.extend(
            self.properties
                .iter()
                .map(|(key, value)| format!("{key} = {value}")),
        );
        lines.join("\n")
    }
}

/// Removes every node called `name`, and the connections from or to it.
///
/// A node's section runs from its header to the next header. Children keep
/// their declarations. Connections are removed when `from` or `to` is the
/// name or the path of a removed node, or `.` when the root is removed.
pub fn remove_node(source: &str, name: &str) -> String {
    let sections = sections(source);
    let nodes = NodeIndex::new(&sections);
    let mut edits = Edits::new();
    let mut removed_paths = vec![name.to_string()];

    for (index, section) in sections.iter().enumerate() {
        if section.header.tag == "node" && nodes.matches(index, name) {
            removed_paths.push(nodes.path(index));
            if nodes.is_root(index) {
                removed_paths.push(".".to_string());
            }
            edits.delete(section.extent());
        }
    }
    if edits.is_empty() {
        debug!(name; "No node to remove");
        return source.to_string();
    }

    for section in sections.iter().filter(|section| section.header.tag == "connection") {
        let touches = ["from", "to"].iter().any(|key| {
            section
                .header
                .value(key)
                .is_some_and(|path| removed_paths.iter().any(|removed| removed == path))
        });
        if touches {
            trace!(line = section.line.span.to_string(); "Removing connection");
            edits.delete(section.line.extent);
        }
    }

    debug!(name; "Removed node");
    edits.apply(source)
}

/// Renames node `old` to `new`.
///
/// Updates the `name` of matching node headers and every path that names
/// `old` as a full segment: node `parent`s, connection `from` and `to`, and
/// `[editable path=...]` headers.
pub fn rename_node(source: &str, old: &str, new: &str) -> String {
    let mut edits = Edits::new();

    for section in sections(source) {
        let header = &section.header;
        let keys: &[&str] = match header.tag {
            "node" => {
                if let Some(name) = header.attribute("name") {
                    if name.value == old {
                        edits.replace(name.span, quote(new));
                    }
                }
                &["parent"]
            }
            "connection" => &["from", "to"],
            "editable" => &["path"],
            _ => &[],
        };

        for key in keys {
            let Some(attribute) = header.attribute(key) else {
                continue;
            };
            if let Some(renamed) = rename_segment(&attribute.value, old, new) {
                edits.replace(attribute.span, quote(&renamed));
            }
        }
    }

    debug!(old, new; "Renamed node");
    edits.apply(source)
}

/// Sets property `key` of node `node` to the raw expression `value`.
///
/// `node` is a name, a path relative to the root, or `.` for the root. An
/// existing property is replaced in place, otherwise the property is added
/// after the last non-blank line of the node's section.
///
/// # Example
///
/// ```
/// # use gdtext_parser::patch::set_property;
/// let text = "[node name=\"Root\" type=\"Node2D\"]\n\n[connection signal=\"a\" from=\".\" to=\".\" method=\"b\"]\n";
/// let once = set_property(text, "Root", "visible", "false");
///
/// assert!(once.starts_with("[node name=\"Root\" type=\"Node2D\"]\nvisible = false\n\n"));
/// assert_eq!(set_property(&once, "Root", "visible", "false"), once);
/// ```
pub fn set_property(source: &str, node: &str, key: &str, value: &str) -> String {
    let sections = sections(source);
    let Some(section) = NodeIndex::new(&sections).find(node).map(|index| &sections[index]) else {
        debug!(node; "No node to set a property on");
        return source.to_string();
    };

    let mut edits = Edits::new();
    match section.property(key) {
        Some(line) => {
            if let Some(property) = line.property() {
                edits.replace(property.value_span, value);
            }
        }
        None => edits.insert(section.content_end(), format!("\n{key} = {value}")),
    }

    trace!(node, key, value; "Set property");
    edits.apply(source)
}

/// Removes property `key` of node `node`, including continuation lines.
pub fn remove_property(source: &str, node: &str, key: &str) -> String {
    let sections = sections(source);
    let property = NodeIndex::new(&sections)
        .find(node)
        .and_then(|index| sections[index].property(key));
    let Some(line) = property else {
        return source.to_string();
    };

    let mut edits = Edits::new();
    edits.delete(line.extent);
    trace!(node, key; "Removed property");
    edits.apply(source)
}

/// Declares a new node after the last node section.
///
/// Without existing nodes the declaration goes before the first connection,
/// or at the end of the text.
pub fn add_node(source: &str, node: &NewNode) -> String {
    let sections = sections(source);
    let declaration = node.declaration();
    let mut edits = Edits::new();

    let last_node = sections.iter().filter(|section| section.header.tag == "node").last();
    let first_connection = sections
        .iter()
        .find(|section| section.header.tag == "connection");

    if let Some(section) = last_node {
        edits.insert(section.content_end(), format!("\n\n{declaration}"));
    } else if let Some(section) = first_connection {
        edits.insert(section.line.span.start(), format!("{declaration}\n\n"));
    } else {
        edits.insert(source.len(), appended_block(source, &declaration));
    }

    debug!(name = node.name.as_str(); "Added node");
    edits.apply(source)
}

/// Declares an external resource, returning the new text and the new id.
///
/// The id is one more than the largest numeric prefix among existing ids.
/// The declaration follows the last `ext_resource`, or the `gd_scene`
/// header, and the header's `load_steps` is incremented when present.
///
/// # Example
///
/// ```
/// # use gdtext_parser::patch::add_ext_resource;
/// let text = "[gd_scene load_steps=2 format=3]\n\n[ext_resource type=\"Script\" path=\"res://a.gd\" id=\"1_a\"]\n";
/// let (updated, id) = add_ext_resource(text, "Texture2D", "res://icon.svg", None);
///
/// assert_eq!(id, "2");
/// assert!(updated.starts_with("[gd_scene load_steps=3 format=3]"));
/// assert!(updated.contains("id=\"1_a\"]\n[ext_resource type=\"Texture2D\" path=\"res://icon.svg\" id=\"2\"]\n"));
/// ```
pub fn add_ext_resource(
    source: &str,
    type_name: &str,
    path: &str,
    uid: Option<&str>,
) -> (String, String) {
    let sections = sections(source);
    let resources: Vec<&Section<'_>> = sections
        .iter()
        .filter(|section| section.header.tag == "ext_resource")
        .collect();

    let ids: Vec<&str> = resources
        .iter()
        .filter_map(|section| section.header.value("id"))
        .collect();
    let id = next_resource_id(&ids);

    let mut declaration = format!("[ext_resource type={}", quote(type_name));
    if let Some(uid) = uid {
        declaration.push_str(&format!(" uid={}", quote(uid)));
    }
    declaration.push_str(&format!(" path={} id={}]", quote(path), quote(&id)));

    let mut edits = Edits::new();
    let scene_header = sections
        .iter()
        .find(|section| section.header.tag == "gd_scene");
    if let Some(load_steps) = scene_header.and_then(|section| section.header.attribute("load_steps")) {
        match load_steps.value.parse::<i64>().ok().and_then(|steps| steps.checked_add(1)) {
            Some(steps) => edits.replace(load_steps.span, steps.to_string()),
            None => debug!(load_steps = load_steps.raw; "Left load_steps unchanged"),
        }
    }

    if let Some(last) = resources.last() {
        edits.insert(last.line.span.end(), format!("\n{declaration}"));
    } else if let Some(header) = scene_header {
        edits.insert(header.line.span.end(), format!("\n\n{declaration}"));
    } else {
        edits.insert(0, format!("{declaration}\n\n"));
    }

    debug!(id = id.as_str(), path; "Added external resource");
    (edits.apply(source), id)
}

/// Appends a `[connection ...]` line after the last connection.
pub fn add_connection(source: &str, connection: &Connection) -> String {
    let mut declaration = format!(
        "[connection signal={} from={} to={} method={}",
        quote(&connection.signal),
        quote(&connection.from),
        quote(&connection.to),
        quote(&connection.method)
    );
    if let Some(flags) = connection.flags {
        declaration.push_str(&format!(" flags={flags}"));
    }
    declaration.push(']');

    let sections = sections(source);
    let mut edits = Edits::new();
    match sections
        .iter()
        .filter(|section| section.header.tag == "connection")
        .last()
    {
        Some(last) => edits.insert(last.line.span.end(), format!("\n{declaration}")),
        None => edits.insert(source.len(), appended_block(source, &declaration)),
    }

    debug!(signal = connection.signal.as_str(); "Added connection");
    edits.apply(source)
}

/// Removes every connection of `signal` from `from` to `method` on `to`.
pub fn remove_connection(source: &str, signal: &str, from: &str, to: &str, method: &str) -> String {
    let mut edits = Edits::new();
    for section in sections(source) {
        let header = &section.header;
        let matches = header.tag == "connection"
            && header.value("signal") == Some(signal)
            && header.value("from") == Some(from)
            && header.value("to") == Some(to)
            && header.value("method") == Some(method);
        if matches {
            edits.delete(section.line.extent);
        }
    }

    debug!(signal, from, to, method; "Removed connection");
    edits.apply(source)
}

/// A header line and the lines after it, up to the next header.
struct Section<'a> {
    line: Line<'a>,
    header: Header<'a>,
    body: Vec<Line<'a>>,
}

impl<'a> Section<'a> {
    /// From the header to the start of the next header.
    fn extent(&self) -> Span {
        self.body
            .last()
            .map_or(self.line.extent, |line| self.line.extent.union(line.extent))
    }

    /// End of the last line that is neither blank nor a comment, not counting
    /// its line terminator.
    fn content_end(&self) -> usize {
        self.body
            .iter()
            .rev()
            .find(|line| !line.is_blank() && !matches!(line.kind, LineKind::Comment))
            .map_or(self.line.span.end(), |line| line.span.end())
    }

    /// The last property line for `key`.
    fn property(&self, key: &str) -> Option<&Line<'a>> {
        self.body
            .iter()
            .rev()
            .find(|line| line.property().is_some_and(|property| property.key == key))
    }
}

/// Groups lines into sections. Lines before the first header are dropped.
fn sections(source: &str) -> Vec<Section<'_>> {
    let mut sections: Vec<Section<'_>> = Vec::new();
    for line in scan(source) {
        let header = line.header().cloned();
        match header {
            Some(header) => sections.push(Section {
                line,
                header,
                body: Vec::new(),
            }),
            None => {
                if let Some(section) = sections.last_mut() {
                    section.body.push(line);
                }
            }
        }
    }
    sections
}

/// Names and paths of the node sections, by section index.
struct NodeIndex {
    /// `(section index, name, parent)` of each node header with a name.
    nodes: Vec<(usize, String, Option<String>)>,
}

impl NodeIndex {
    fn new(sections: &[Section<'_>]) -> Self {
        let nodes = sections
            .iter()
            .enumerate()
            .filter(|(_, section)| section.header.tag == "node")
            .filter_map(|(index, section)| {
                let name = section.header.value("name")?;
                let parent = section.header.value("parent");
                Some((index, name.to_string(), parent.map(str::to_string)))
            })
            .collect();
        Self { nodes }
    }

    /// The first node section matching `node`.
    fn find(&self, node: &str) -> Option<usize> {
        self.nodes
            .iter()
            .map(|(index, _, _)| *index)
            .find(|index| self.matches(*index, node))
    }

    /// Whether section `index` is the node addressed by `node`: `.` for the
    /// root, a path when it contains `/`, a name otherwise.
    fn matches(&self, index: usize, node: &str) -> bool {
        let Some((_, name, _)) = self.nodes.iter().find(|(at, _, _)| *at == index) else {
            return false;
        };
        if node == "." {
            self.is_root(index)
        } else if node.contains('/') {
            self.path(index) == node
        } else {
            name == node
        }
    }

    /// Whether section `index` is the first node without a parent.
    fn is_root(&self, index: usize) -> bool {
        self.nodes
            .iter()
            .find(|(_, _, parent)| parent.is_none())
            .is_some_and(|(root, _, _)| *root == index)
    }

    fn path(&self, index: usize) -> String {
        match self.nodes.iter().find(|(at, _, _)| *at == index) {
            Some((_, name, None)) => name.clone(),
            Some((_, name, Some(parent))) if parent == "." => name.clone(),
            Some((_, name, Some(parent))) => format!("{parent}/{name}"),
            None => String::new(),
        }
    }
}

/// Replaces `old` where it is a full segment of the slash-separated `path`.
///
/// Returns `None` when no segment matches.
fn rename_segment(path: &str, old: &str, new: &str) -> Option<String> {
    let mut renamed = false;
    let segments: Vec<&str> = path
        .split('/')
        .map(|segment| {
            if segment == old {
                renamed = true;
                new
            } else {
                segment
            }
        })
        .collect();
    renamed.then(|| segments.join("/"))
}

/// `block` prepared for appending to `source`, separated by a blank line.
fn appended_block(source: &str, block: &str) -> String {
    let mut appended = String::new();
    if !source.is_empty() {
        if !source.ends_with('\n') {
            appended.push('\n');
        }
        if !source.ends_with("\n\n") {
            appended.push('\n');
        }
    }
    appended.push_str(block);
    appended.push('\n');
    appended
}

/// The leading decimal digits of an id such as `3_k2x8s`.
/// One more than the largest numeric prefix among `ids`, or the smallest
/// number not taken as an id when that would overflow.
fn next_resource_id(ids: &[&str]) -> String {
    let largest = ids.iter().copied().filter_map(leading_number).max().unwrap_or(0);
    match largest.checked_add(1) {
        Some(next) => next.to_string(),
        None => (1u64..)
            .map(|candidate| candidate.to_string())
            .find(|candidate| !ids.contains(&candidate.as_str()))
            .unwrap_or_default(),
    }
}

fn leading_number(id: &str) -> Option<u64> {
    let digits = id.len() - id.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    id[..digits].parse().ok()
}
