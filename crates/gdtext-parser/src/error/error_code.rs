//! Error codes for the gdtext diagnostic system.
//!
//! Codes are organized by the part of the grammar that reports them:
//! - `E0xx` - Line scanning
//! - `E1xx` - Scene declarations
//! - `E2xx` - Settings sections

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Scanning (E0xx)
    // =========================================================================
    /// Unterminated section header.
    ///
    /// A line opens a section with `[` but never closes it with `]`. The
    /// header is still read as far as possible.
    E001,

    /// Unrecognized line.
    ///
    /// The line is neither a section header, a `key = value` property, a
    /// comment nor blank. It is ignored.
    E002,

    // =========================================================================
    // Scene declarations (E1xx)
    // =========================================================================
    /// Missing required attribute.
    ///
    /// A `node`, `ext_resource`, `sub_resource` or `connection` declaration
    /// lacks an attribute it cannot do without. The declaration is dropped.
    E100,

    /// Duplicate node.
    ///
    /// Two nodes share the same name under the same parent. The later one
    /// is dropped.
    E101,

    /// Property outside of a node or sub-resource.
    ///
    /// A `key = value` line appears where no node or sub-resource section is
    /// open. It is ignored.
    E102,

    /// Invalid integer attribute.
    ///
    /// `format`, `load_steps` or `flags` does not hold an integer. The
    /// default is used instead.
    E103,

    // =========================================================================
    // Settings sections (E2xx)
    // =========================================================================
    /// Empty section name.
    ///
    /// A `[]` header opens a section without a name. Entries up to the next
    /// header are ignored.
    E200,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E200 => "E200",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated section header",
            ErrorCode::E002 => "unrecognized line",
            ErrorCode::E100 => "missing required attribute",
            ErrorCode::E101 => "duplicate node",
            ErrorCode::E102 => "property outside of a section",
            ErrorCode::E103 => "invalid integer attribute",
            ErrorCode::E200 => "empty section name",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E101.to_string(), "E101");
        assert_eq!(ErrorCode::E200.to_string(), "E200");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E002.description(), "unrecognized line");
        assert_eq!(ErrorCode::E100.description(), "missing required attribute");
        assert_eq!(ErrorCode::E103.description(), "invalid integer attribute");
    }
}
