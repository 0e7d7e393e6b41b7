use std::path::{Component, Path};

use crate::error::{WardenError, WardenResult};
use crate::record::ServiceSpec;

/// Characters that never belong in a service command line. Anything the
/// shell could interpret is rejected outright rather than escaped.
const FORBIDDEN_CHARS: &[char] = &['|', '&', ';', '$', '`', '>', '<', '\n', '\r', '\0'];

/// Pre-flight validator for executable paths and command arguments.
///
/// Rejections are returned as values so callers can branch on them; the
/// gate never panics on hostile input.
#[derive(Debug, Clone, Default)]
pub struct SecurityGate {
    /// Extra path prefixes executables are allowed to live under. Empty
    /// means any absolute, traversal-free path is accepted.
    allowed_roots: Vec<std::path::PathBuf>,
}

impl SecurityGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict executables to the given directory prefixes
    pub fn with_allowed_roots(roots: Vec<std::path::PathBuf>) -> Self {
        Self {
            allowed_roots: roots,
        }
    }

    /// Validate a path destined for a privileged gateway call
    pub fn validate_executable(&self, path: &Path) -> WardenResult<()> {
        if path.as_os_str().is_empty() {
            return Err(WardenError::security("executable path is empty"));
        }
        if !path.is_absolute() {
            return Err(WardenError::security(format!(
                "executable path must be absolute: {}",
                path.display()
            )));
        }
        if path
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(WardenError::security(format!(
                "executable path contains a parent-directory component: {}",
                path.display()
            )));
        }
        if let Some(s) = path.to_str() {
            if s.chars().any(|c| FORBIDDEN_CHARS.contains(&c)) {
                return Err(WardenError::security(format!(
                    "executable path contains a forbidden character: {}",
                    path.display()
                )));
            }
        } else {
            return Err(WardenError::security(
                "executable path is not valid unicode",
            ));
        }
        if !self.allowed_roots.is_empty()
            && !self.allowed_roots.iter().any(|root| path.starts_with(root))
        {
            return Err(WardenError::security(format!(
                "executable path is outside the allowed roots: {}",
                path.display()
            )));
        }
        Ok(())
    }

    /// Validate a working directory, if one was supplied
    pub fn validate_working_dir(&self, dir: &Path) -> WardenResult<()> {
        if !dir.is_absolute() {
            return Err(WardenError::security(format!(
                "working directory must be absolute: {}",
                dir.display()
            )));
        }
        if dir.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(WardenError::security(format!(
                "working directory contains a parent-directory component: {}",
                dir.display()
            )));
        }
        Ok(())
    }

    /// Check every argument and join them into the command line handed to
    /// the wrapper. Detected injection patterns and traversal sequences
    /// reject the whole argument list.
    pub fn sanitize_arguments(&self, args: &[String]) -> WardenResult<String> {
        for arg in args {
            if arg.chars().any(|c| FORBIDDEN_CHARS.contains(&c)) {
                return Err(WardenError::security(format!(
                    "argument contains a forbidden character: {:?}",
                    arg
                )));
            }
            if arg.contains("..") {
                return Err(WardenError::security(format!(
                    "argument contains a path traversal sequence: {:?}",
                    arg
                )));
            }
        }
        Ok(args.join(" "))
    }

    /// Vet every user-supplied field of a creation/update request
    pub fn vet_spec(&self, spec: &ServiceSpec) -> WardenResult<()> {
        if spec.name.trim().is_empty() {
            return Err(WardenError::security("service name is empty"));
        }
        self.validate_executable(&spec.executable)?;
        if let Some(dir) = &spec.working_dir {
            self.validate_working_dir(dir)?;
        }
        self.sanitize_arguments(&spec.arguments)?;
        Ok(())
    }
}
