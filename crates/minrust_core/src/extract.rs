//! Extraction of artifact bytes into a loadable temporary file.
//!
//! # Invariants
//! - The file name keeps the artifact extension so platform loaders accept it.
//! - The returned [`TempPath`] removes the file when dropped; removal is
//!   best-effort (a loaded DLL may still be locked on Windows).

use crate::error::LoadError;
use crate::platform::NativeArtifact;
use log::info;
use std::io::Write;
use std::path::Path;
use tempfile::{Builder, TempPath};

/// Writes `bytes` to a fresh temp file named after `artifact`.
///
/// Uses `dir` when given (creating it if needed), otherwise the system temp
/// directory.
pub fn extract_artifact(
    artifact: &NativeArtifact,
    bytes: &[u8],
    dir: Option<&Path>,
) -> Result<TempPath, LoadError> {
    if bytes.is_empty() {
        return Err(LoadError::EmptyArtifact {
            resource_path: artifact.resource_path.to_string(),
        });
    }

    let prefix = artifact.file_name.replace('.', "_");
    let suffix = format!(".{}", artifact.extension());
    let mut builder = Builder::new();
    builder.prefix(&prefix).suffix(&suffix);

    let mut file = match dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            builder.tempfile_in(dir)?
        }
        None => builder.tempfile()?,
    };
    file.write_all(bytes)?;
    file.flush()?;

    let path = file.into_temp_path();
    info!(
        "event=artifact_extract module=extract status=ok resource={} bytes={} path={}",
        artifact.resource_path,
        bytes.len(),
        path.display()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::extract_artifact;
    use crate::error::LoadError;
    use crate::platform::Platform;

    #[test]
    fn extracted_file_keeps_extension_and_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let artifact = Platform::Linux.artifact();
        let path = extract_artifact(&artifact, b"native bytes", Some(dir.path()))
            .expect("extraction should succeed");

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .expect("utf-8 file name");
        assert!(file_name.starts_with("libminrust_native_so"));
        assert!(file_name.ends_with(".so"));
        assert_eq!(std::fs::read(&path).expect("read back"), b"native bytes");
    }

    #[test]
    fn dropping_temp_path_removes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = extract_artifact(&Platform::Windows.artifact(), b"x", Some(dir.path()))
            .expect("extraction should succeed");
        let on_disk = path.to_path_buf();
        assert!(on_disk.exists());
        drop(path);
        assert!(!on_disk.exists());
    }

    #[test]
    fn creates_missing_extract_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("nested").join("natives");
        let path = extract_artifact(&Platform::MacOs.artifact(), b"x", Some(&nested))
            .expect("extraction should succeed");
        assert!(path.starts_with(&nested));
    }

    #[test]
    fn rejects_empty_artifact() {
        let err = extract_artifact(&Platform::Linux.artifact(), b"", None)
            .expect_err("empty bytes must be rejected");
        assert!(matches!(err, LoadError::EmptyArtifact { .. }));
    }
}
