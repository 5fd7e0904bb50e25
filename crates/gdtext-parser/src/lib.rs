//! # gdtext Parser
//!
//! Lenient readers and text patchers for scene (`.tscn`) and
//! project-settings (`project.godot`) files.
//!
//! Reading and writing are separate paths. The readers turn text into the
//! documents of [`gdtext_core`] and never fail; what they drop is reported
//! as [`error::Diagnostic`]s. The patchers in [`patch`] and [`set_setting`]
//! work on the raw text directly and rewrite only the lines they are about,
//! so comments and formatting survive every edit.
//!
//! ## Usage
//!
//! ```
//! # use gdtext_parser::{parse_scene, patch};
//! let text = "[gd_scene format=3]\n\n[node name=\"Player\" type=\"CharacterBody2D\"]\n";
//!
//! let text = patch::set_property(text, "Player", "speed", "300.0");
//! let doc = parse_scene(&text);
//!
//! assert_eq!(doc.nodes[0].properties["speed"], "300.0");
//! ```

pub mod attributes;
mod edit;
pub mod error;
pub mod lines;
#[cfg(test)]
mod parser_tests;
pub mod patch;
mod scene;
mod settings;
mod span;

pub use scene::{parse_scene, parse_scene_with_diagnostics};
pub use settings::{parse_settings, parse_settings_with_diagnostics, set_setting};
pub use span::Span;
