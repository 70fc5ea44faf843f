//! Toolbox loading configuration.
//!
//! # Responsibility
//! - Describe where artifact bytes come from and where they are extracted.
//! - Resolve overrides from `MINRUST_*` environment variables.
//!
//! # Invariants
//! - Blank environment values are ignored, never treated as paths.

use crate::resources::{DirectoryResources, EmbeddedResources, ResourceSource};
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Directory holding `natives/<platform folder>/<file>`; replaces the
/// embedded table when set.
pub const NATIVE_DIR_ENV: &str = "MINRUST_NATIVE_DIR";
/// Directory the artifact is extracted into before loading.
pub const EXTRACT_DIR_ENV: &str = "MINRUST_EXTRACT_DIR";

/// Inputs for [`crate::NativeToolbox::initialize`].
#[derive(Clone)]
pub struct ToolboxConfig {
    os_name: Option<String>,
    resources: Arc<dyn ResourceSource>,
    extract_dir: Option<PathBuf>,
}

impl Default for ToolboxConfig {
    fn default() -> Self {
        Self {
            os_name: None,
            resources: Arc::new(EmbeddedResources::bundled()),
            extract_dir: None,
        }
    }
}

impl Debug for ToolboxConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolboxConfig")
            .field("os_name", &self.os_name)
            .field("resources", &self.resources.kind())
            .field("extract_dir", &self.extract_dir)
            .finish()
    }
}

impl ToolboxConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `MINRUST_NATIVE_DIR` and `MINRUST_EXTRACT_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(native_dir) = non_blank_path(lookup(NATIVE_DIR_ENV)) {
            config = config.with_resources(DirectoryResources::new(native_dir));
        }
        if let Some(extract_dir) = non_blank_path(lookup(EXTRACT_DIR_ENV)) {
            config = config.with_extract_dir(extract_dir);
        }
        config
    }

    /// Overrides OS detection with a free-form OS name.
    pub fn with_os_name(mut self, os_name: impl Into<String>) -> Self {
        self.os_name = Some(os_name.into());
        self
    }

    pub fn with_resources(mut self, resources: impl ResourceSource + 'static) -> Self {
        self.resources = Arc::new(resources);
        self
    }

    pub fn with_extract_dir(mut self, extract_dir: impl Into<PathBuf>) -> Self {
        self.extract_dir = Some(extract_dir.into());
        self
    }

    pub fn os_name(&self) -> Option<&str> {
        self.os_name.as_deref()
    }

    pub fn resources(&self) -> &dyn ResourceSource {
        self.resources.as_ref()
    }

    pub fn extract_dir(&self) -> Option<&Path> {
        self.extract_dir.as_deref()
    }
}

fn non_blank_path(raw: Option<String>) -> Option<PathBuf> {
    let raw = raw?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(PathBuf::from(trimmed))
}

#[cfg(test)]
mod tests {
    use super::{ToolboxConfig, EXTRACT_DIR_ENV, NATIVE_DIR_ENV};
    use std::path::Path;

    #[test]
    fn defaults_use_embedded_resources() {
        let config = ToolboxConfig::new();
        assert_eq!(config.resources().kind(), "embedded");
        assert_eq!(config.os_name(), None);
        assert_eq!(config.extract_dir(), None);
    }

    #[test]
    fn lookup_overrides_resources_and_extract_dir() {
        let config = ToolboxConfig::from_lookup(|name| match name {
            NATIVE_DIR_ENV => Some(" /opt/minrust ".to_string()),
            EXTRACT_DIR_ENV => Some("/var/tmp/minrust".to_string()),
            _ => None,
        });
        assert_eq!(config.resources().kind(), "directory");
        assert_eq!(config.extract_dir(), Some(Path::new("/var/tmp/minrust")));
    }

    #[test]
    fn lookup_ignores_blank_values() {
        let config = ToolboxConfig::from_lookup(|_| Some("   ".to_string()));
        assert_eq!(config.resources().kind(), "embedded");
        assert_eq!(config.extract_dir(), None);
    }

    #[test]
    fn debug_output_names_resource_kind() {
        let rendered = format!("{:?}", ToolboxConfig::new().with_os_name("Linux"));
        assert!(rendered.contains("embedded"));
        assert!(rendered.contains("Linux"));
    }
}
