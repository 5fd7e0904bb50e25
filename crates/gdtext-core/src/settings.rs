//! Sectioned project-settings documents.
//!
//! Settings are addressed by slash-separated paths whose first segment is
//! the section and whose remainder is the key, so `display/window/size/width`
//! is key `window/size/width` of section `[display]`. Entries before the
//! first section header live in the unnamed section `""`.

use indexmap::IndexMap;
use serde::Serialize;

use crate::value;

/// Name of the section holding input map actions.
pub const INPUT_SECTION: &str = "input";

/// A parsed settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsDocument {
    /// Sections in file order; always contains the unnamed section `""`.
    pub sections: IndexMap<String, IndexMap<String, String>>,
    /// The text the document was parsed from.
    #[serde(skip)]
    pub raw: String,
}

impl Default for SettingsDocument {
    fn default() -> Self {
        let mut sections = IndexMap::new();
        sections.insert(String::new(), IndexMap::new());
        Self {
            sections,
            raw: String::new(),
        }
    }
}

impl SettingsDocument {
    /// Returns the raw value at `path`.
    ///
    /// `None` when the section or key is absent, or when `path` has a single
    /// segment: there is no implicit default section.
    pub fn get(&self, path: &str) -> Option<&str> {
        let (section, key) = split_path(path)?;
        self.sections.get(section)?.get(key).map(String::as_str)
    }

    /// Returns the entries of `section`, if present.
    pub fn section(&self, section: &str) -> Option<&IndexMap<String, String>> {
        self.sections.get(section)
    }

    /// Returns the actions declared in the input section, in file order.
    pub fn input_actions(&self) -> Vec<InputAction<'_>> {
        self.sections
            .get(INPUT_SECTION)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(name, raw)| InputAction { name, raw })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One entry of the input section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InputAction<'a> {
    pub name: &'a str,
    /// The action dictionary as written, possibly spanning several lines.
    pub raw: &'a str,
}

impl InputAction<'_> {
    /// Returns the `"deadzone"` member of the action dictionary.
    pub fn deadzone(&self) -> Option<f64> {
        let inner = self.raw.trim().strip_prefix('{')?.strip_suffix('}')?;
        value::split_top_level(inner)?.into_iter().find_map(|member| {
            let (key, number) = member.split_once(':')?;
            (value::decode(key) == value::Value::String("deadzone".to_string()))
                .then(|| value::decode(number).as_number())
                .flatten()
        })
    }
}

/// Splits a setting path into its section and key.
///
/// Returns `None` for paths with fewer than two segments.
///
/// # Example
///
/// ```
/// # use gdtext_core::settings::split_path;
/// assert_eq!(
///     split_path("physics/common/physics_fps"),
///     Some(("physics", "common/physics_fps"))
/// );
/// assert_eq!(split_path("physics"), None);
/// ```
pub fn split_path(path: &str) -> Option<(&str, &str)> {
    path.split_once('/')
}
