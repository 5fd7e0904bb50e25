//! Diagnostics reported by the lenient readers.
//!
//! Reading never fails. Whatever a reader drops or replaces with a default
//! is reported as a [`Diagnostic`] with:
//! - an [`ErrorCode`] for documentation and searchability
//! - labeled spans pointing into the source text
//! - a [`Severity`]
//!
//! Callers that want to refuse such input wrap the diagnostics in a
//! [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use gdtext_parser::parse_scene_with_diagnostics;
//! # use gdtext_parser::error::ErrorCode;
//! let (doc, diagnostics) =
//!     parse_scene_with_diagnostics("[gd_scene format=3]\n[node type=\"Node2D\"]\n");
//!
//! assert!(doc.nodes.is_empty());
//! assert_eq!(diagnostics[0].code(), Some(ErrorCode::E100));
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
