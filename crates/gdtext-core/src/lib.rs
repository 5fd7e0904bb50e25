//! gdtext core types and definitions
//!
//! This crate provides the foundational types shared by the gdtext parser,
//! the project facade and the command-line tool. It includes:
//!
//! - **Values**: the property value model and its text codec ([`value`] module)
//! - **Scenes**: the structured scene document and its lookups ([`scene`] module)
//! - **Settings**: the sectioned project-settings document ([`settings`] module)
//! - **Sandbox**: containment of untrusted paths under a trusted root ([`sandbox`] module)

pub mod sandbox;
pub mod scene;
pub mod settings;
pub mod value;
