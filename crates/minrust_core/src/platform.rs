//! Host platform detection and per-platform artifact naming.
//!
//! # Invariants
//! - Each supported platform maps to exactly one artifact file name and one
//!   embedded resource path.
//! - Unknown operating systems fail fast with the name that was inspected.

use crate::error::LoadError;

/// Operating systems with a prebuilt native artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

/// File name and embedded resource path of one prebuilt artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeArtifact {
    pub file_name: &'static str,
    pub resource_path: &'static str,
}

impl NativeArtifact {
    /// File extension without the leading dot (`dll`, `dylib`, `so`).
    pub fn extension(&self) -> &'static str {
        self.file_name
            .rsplit_once('.')
            .map(|(_, extension)| extension)
            .unwrap_or("")
    }
}

impl Platform {
    /// Detects the platform this process was compiled for.
    pub fn current() -> Result<Self, LoadError> {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Classifies a free-form operating system name (`"Windows 11"`,
    /// `"Mac OS X"`, `"linux"`, `"macos"`, ...).
    ///
    /// `darwin` is checked before `win` since it contains that substring.
    pub fn from_os_name(os_name: &str) -> Result<Self, LoadError> {
        let normalized = os_name.trim().to_ascii_lowercase();
        if normalized.contains("mac") || normalized.contains("darwin") {
            Ok(Self::MacOs)
        } else if normalized.contains("win") {
            Ok(Self::Windows)
        } else if normalized.contains("linux") {
            Ok(Self::Linux)
        } else {
            Err(LoadError::UnsupportedPlatform {
                os_name: os_name.to_string(),
            })
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::MacOs => "macos",
            Self::Linux => "linux",
        }
    }

    pub fn artifact(self) -> NativeArtifact {
        match self {
            Self::Windows => NativeArtifact {
                file_name: "minrust_native.dll",
                resource_path: "/natives/windows64/minrust_native.dll",
            },
            Self::MacOs => NativeArtifact {
                file_name: "libminrust_native.dylib",
                resource_path: "/natives/macosx64/libminrust_native.dylib",
            },
            Self::Linux => NativeArtifact {
                file_name: "libminrust_native.so",
                resource_path: "/natives/linux64/libminrust_native.so",
            },
        }
    }
}
