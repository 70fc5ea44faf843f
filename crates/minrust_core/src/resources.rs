//! Lookup of prebuilt native artifacts by resource path.
//!
//! # Responsibility
//! - Serve artifact bytes from the table embedded at build time.
//! - Serve artifact bytes from a directory shipped next to the binary.
//!
//! # Invariants
//! - Resource paths use `/natives/<platform folder>/<file name>`.
//! - A missing resource is reported as `ResourceNotFound`, never as empty bytes.

use crate::error::LoadError;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

include!(concat!(env!("OUT_DIR"), "/bundled_natives.rs"));

/// Source of native artifact bytes.
pub trait ResourceSource: Send + Sync {
    fn fetch(&self, resource_path: &str) -> Result<Cow<'static, [u8]>, LoadError>;

    /// Short label for log lines.
    fn kind(&self) -> &'static str;
}

/// Artifacts compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedResources {
    entries: BTreeMap<&'static str, &'static [u8]>,
}

impl EmbeddedResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Artifacts embedded by the build script from `MINRUST_EMBED_NATIVE_DIR`.
    pub fn bundled() -> Self {
        BUNDLED_NATIVES
            .iter()
            .fold(Self::new(), |resources, &(path, bytes)| {
                resources.with_resource(path, bytes)
            })
    }

    pub fn with_resource(mut self, resource_path: &'static str, bytes: &'static [u8]) -> Self {
        self.entries.insert(resource_path, bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceSource for EmbeddedResources {
    fn fetch(&self, resource_path: &str) -> Result<Cow<'static, [u8]>, LoadError> {
        self.entries
            .get(resource_path)
            .map(|bytes| Cow::Borrowed(*bytes))
            .ok_or_else(|| LoadError::ResourceNotFound {
                resource_path: resource_path.to_string(),
            })
    }

    fn kind(&self) -> &'static str {
        "embedded"
    }
}

/// Artifacts laid out on disk under `root` (`root/natives/linux64/...`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryResources {
    root: PathBuf,
}

impl DirectoryResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, resource_path: &str) -> PathBuf {
        self.root.join(resource_path.trim_start_matches('/'))
    }
}

impl ResourceSource for DirectoryResources {
    fn fetch(&self, resource_path: &str) -> Result<Cow<'static, [u8]>, LoadError> {
        match std::fs::read(self.resolve(resource_path)) {
            Ok(bytes) => Ok(Cow::Owned(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(LoadError::ResourceNotFound {
                resource_path: resource_path.to_string(),
            }),
            Err(err) => Err(LoadError::Io(err)),
        }
    }

    fn kind(&self) -> &'static str {
        "directory"
    }
}

#[cfg(test)]
mod tests {
    use super::{DirectoryResources, EmbeddedResources, ResourceSource};
    use crate::error::LoadError;

    const LINUX_PATH: &str = "/natives/linux64/libminrust_native.so";

    #[test]
    fn embedded_serves_registered_bytes() {
        let resources = EmbeddedResources::new().with_resource(LINUX_PATH, b"\x7fELF");
        assert_eq!(resources.len(), 1);
        let bytes = resources.fetch(LINUX_PATH).expect("registered resource");
        assert_eq!(bytes.as_ref(), b"\x7fELF");
    }

    #[test]
    fn embedded_reports_missing_resource() {
        let err = EmbeddedResources::new()
            .fetch(LINUX_PATH)
            .expect_err("empty table has no resources");
        assert!(matches!(err, LoadError::ResourceNotFound { .. }));
        assert!(err.to_string().contains(LINUX_PATH));
    }

    #[test]
    fn directory_strips_leading_slash() {
        let dir = tempfile::tempdir().expect("tempdir");
        let resources = DirectoryResources::new(dir.path());
        let target = resources.resolve(LINUX_PATH);
        assert!(target.starts_with(dir.path()));

        std::fs::create_dir_all(target.parent().expect("parent dir")).expect("mkdir");
        std::fs::write(&target, b"payload").expect("write artifact");
        let bytes = resources.fetch(LINUX_PATH).expect("artifact on disk");
        assert_eq!(bytes.as_ref(), b"payload");
    }

    #[test]
    fn directory_reports_missing_resource() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = DirectoryResources::new(dir.path())
            .fetch(LINUX_PATH)
            .expect_err("nothing on disk");
        assert!(matches!(err, LoadError::ResourceNotFound { .. }));
    }
}
