//! Containment of untrusted paths under a trusted root.
//!
//! Every user-supplied path that is about to reach the filesystem goes
//! through [`Sandbox::resolve`] first. Resolution is lexical: the request is
//! joined onto the root, `.` components are dropped and `..` components pop
//! the previous one. The result is accepted only when the root is one of its
//! component-wise ancestors (or the result is the root itself). Requests are
//! never clamped to a "safe" location; they are rejected with
//! [`AccessDenied`].
//!
//! When the resolved location, or the nearest ancestor of it, already exists
//! on disk, its canonical form must also stay under the canonical root, so a
//! symbolic link inside the project cannot lead outside of it.
//!
//! # Example
//!
//! ```
//! # use gdtext_core::sandbox::Sandbox;
//! let sandbox = Sandbox::new("/srv/game").unwrap();
//!
//! assert!(sandbox.resolve("scenes/main.tscn").is_ok());
//! assert!(sandbox.resolve("res://scenes/main.tscn").is_ok());
//! assert!(sandbox.resolve("../other/secret.txt").is_err());
//! assert!(sandbox.resolve("/srv/game2/main.tscn").is_err());
//! ```

use std::{
    fs, io,
    path::{self, Component, Path, PathBuf},
};

use log::{debug, warn};
use thiserror::Error;

/// Scheme prefix of engine resource paths, relative to the project root.
const RESOURCE_SCHEME: &str = "res://";

/// A path request that does not stay inside the sandbox root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Access denied: '{requested}' is outside of '{}'", .root.display())]
pub struct AccessDenied {
    requested: String,
    root: PathBuf,
}

impl AccessDenied {
    /// The path as it was requested.
    pub fn requested(&self) -> &str {
        &self.requested
    }

    /// The root the request was checked against.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// A trusted root directory that untrusted paths are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// Creates a sandbox rooted at `root`.
    ///
    /// The root is made absolute against the current directory and
    /// normalised; it does not have to exist.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when `root` is empty or the current directory
    /// cannot be determined.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let absolute = path::absolute(root.as_ref())?;
        Ok(Self {
            root: normalize(&absolute),
        })
    }

    /// Returns the normalised, absolute root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `requested` against the root.
    ///
    /// Relative, absolute and `res://` paths are accepted as long as they
    /// end up inside the root. `""` and `"."` resolve to the root itself.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied`] when the resolved path escapes the root,
    /// lexically or through a symbolic link.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf, AccessDenied> {
        let relative = requested
            .strip_prefix(RESOURCE_SCHEME)
            .unwrap_or(requested);
        let resolved = normalize(&self.root.join(relative));

        if !resolved.starts_with(&self.root) {
            warn!(requested, root = self.root.display().to_string(); "Rejected path outside of sandbox");
            return Err(self.denied(requested));
        }

        if !self.stays_inside_on_disk(&resolved) {
            warn!(requested, root = self.root.display().to_string(); "Rejected path leaving sandbox through a link");
            return Err(self.denied(requested));
        }

        debug!(requested, resolved = resolved.display().to_string(); "Resolved sandboxed path");
        Ok(resolved)
    }

    fn denied(&self, requested: &str) -> AccessDenied {
        AccessDenied {
            requested: requested.to_string(),
            root: self.root.clone(),
        }
    }

    /// Checks the nearest existing ancestor of `resolved` after following links.
    fn stays_inside_on_disk(&self, resolved: &Path) -> bool {
        let Ok(canonical_root) = self.root.canonicalize() else {
            // A root that does not exist yet has nothing to follow.
            return true;
        };

        let Some(existing) = resolved
            .ancestors()
            .find(|ancestor| fs::symlink_metadata(ancestor).is_ok())
        else {
            return true;
        };

        existing
            .canonicalize()
            .map(|canonical| canonical.starts_with(&canonical_root))
            .unwrap_or(false)
    }
}

/// Resolves `requested` inside `root`.
///
/// Shorthand for [`Sandbox::new`] followed by [`Sandbox::resolve`]; a root
/// that cannot be made absolute rejects every request.
pub fn resolve(root: impl AsRef<Path>, requested: &str) -> Result<PathBuf, AccessDenied> {
    let root = root.as_ref();
    let sandbox = Sandbox::new(root).map_err(|_| AccessDenied {
        requested: requested.to_string(),
        root: root.to_path_buf(),
    })?;
    sandbox.resolve(requested)
}

/// Lexically normalises a path: drops `.` and applies `..`.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}
