//! Reader and writer for project-settings text.
//!
//! Settings files are a flat list of `[section]` headers, each followed by
//! `key=value` lines. Entries before the first header belong to the unnamed
//! section `""`. Unlike scene headers, the whole text between the brackets
//! is the section name.

use gdtext_core::settings::{SettingsDocument, split_path};
use log::{debug, info};

use crate::{
    edit::Edits,
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    lines::{Line, LineKind, scan},
};

/// Parses settings text, discarding diagnostics.
pub fn parse_settings(source: &str) -> SettingsDocument {
    parse_settings_with_diagnostics(source).0
}

/// Parses settings text and reports everything that was dropped.
///
/// # Example
///
/// ```
/// # use gdtext_parser::parse_settings_with_diagnostics;
/// let (doc, diagnostics) = parse_settings_with_diagnostics(
///     "config_version=5\n\n[application]\nconfig/name=\"Demo\"\n",
/// );
///
/// assert_eq!(doc.get("/config_version"), Some("5"));
/// assert_eq!(doc.get("application/config/name"), Some("\"Demo\""));
/// assert!(diagnostics.is_empty());
/// ```
pub fn parse_settings_with_diagnostics(source: &str) -> (SettingsDocument, Vec<Diagnostic>) {
    let mut doc = SettingsDocument {
        raw: source.to_string(),
        ..SettingsDocument::default()
    };
    let mut collector = DiagnosticCollector::new();
    let mut current = Some(String::new());

    for line in scan(source) {
        match line.kind {
            LineKind::Blank | LineKind::Comment => {}
            LineKind::Header(header) => {
                if !header.closed {
                    collector.emit(
                        Diagnostic::warning("section header is missing its closing `]`")
                            .with_code(ErrorCode::E001)
                            .with_label(line.span, "unterminated header"),
                    );
                }
                let name = header.inner.trim();
                if name.is_empty() {
                    collector.emit(
                        Diagnostic::warning("section name is empty")
                            .with_code(ErrorCode::E200)
                            .with_label(line.span, "entries below are ignored"),
                    );
                    current = None;
                } else {
                    doc.sections.entry(name.to_string()).or_default();
                    current = Some(name.to_string());
                }
            }
            LineKind::Property(property) => {
                if let Some(section) = current.as_ref().and_then(|name| doc.sections.get_mut(name)) {
                    section.insert(property.key.to_string(), property.value.to_string());
                }
            }
            LineKind::Unknown => collector.emit(
                Diagnostic::warning("unrecognized line")
                    .with_code(ErrorCode::E002)
                    .with_label(line.span, "not a header or a `key=value` entry"),
            ),
        }
    }

    debug!(sections = doc.sections.len(); "Parsed settings");
    (doc, collector.finish())
}

/// Sets the raw value at `path`, returning the updated text.
///
/// An existing entry is replaced in place. A new key is added after the
/// last non-blank line of its section, and a missing section is appended at
/// the end of the text. Paths with a single segment leave the text
/// unchanged.
///
/// # Example
///
/// ```
/// # use gdtext_parser::set_setting;
/// let text = "[application]\nconfig/name=\"Demo\"\n";
/// let updated = set_setting(text, "physics/common/physics_fps", "120");
///
/// assert_eq!(
///     updated,
///     "[application]\nconfig/name=\"Demo\"\n\n[physics]\ncommon/physics_fps=120\n"
/// );
/// ```
pub fn set_setting(source: &str, path: &str, value: &str) -> String {
    let Some((section, key)) = split_path(path) else {
        debug!(path; "Ignoring setting path without a section");
        return source.to_string();
    };

    let lines = scan(source);
    let regions = section_regions(&lines, section);
    let entry = format!("{key}={value}");
    let mut edits = Edits::new();

    let existing = regions
        .iter()
        .flat_map(|region| region.body.iter())
        .filter_map(Line::property)
        .filter(|property| property.key == key)
        .last();

    if let Some(property) = existing {
        edits.replace(property.value_span, value);
    } else if let Some(region) = regions.last() {
        match region.body.iter().rev().find(|line| !line.is_blank()) {
            Some(last) => edits.insert(last.span.end(), format!("\n{entry}")),
            None => match region.header {
                Some(header) => edits.insert(header.span.end(), format!("\n{entry}")),
                None => edits.insert(0, format!("{entry}\n")),
            },
        }
    } else {
        let mut block = String::new();
        if !source.is_empty() {
            if !source.ends_with('\n') {
                block.push('\n');
            }
            block.push('\n');
        }
        block.push_str(&format!("[{section}]\n{entry}\n"));
        edits.insert(source.len(), block);
    }

    info!(section, key; "Updated setting");
    edits.apply(source)
}

/// The lines belonging to one occurrence of a section.
struct Region<'l, 'a> {
    /// `None` for the unnamed section before the first header.
    header: Option<&'l Line<'a>>,
    body: &'l [Line<'a>],
}

/// Every occurrence of `section`, in file order.
fn section_regions<'l, 'a>(lines: &'l [Line<'a>], section: &str) -> Vec<Region<'l, 'a>> {
    let mut regions = Vec::new();
    let first_header = lines
        .iter()
        .position(|line| line.header().is_some())
        .unwrap_or(lines.len());
    if section.is_empty() {
        regions.push(Region {
            header: None,
            body: &lines[..first_header],
        });
    }

    let mut index = first_header;
    while index < lines.len() {
        let end = lines[index + 1..]
            .iter()
            .position(|line| line.header().is_some())
            .map_or(lines.len(), |offset| index + 1 + offset);
        let is_match = lines[index]
            .header()
            .is_some_and(|header| header.inner.trim() == section);
        if is_match {
            regions.push(Region {
                header: Some(&lines[index]),
                body: &lines[index + 1..end],
            });
        }
        index = end;
    }

    regions
}
