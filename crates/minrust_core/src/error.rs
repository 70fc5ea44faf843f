//! Error taxonomy for loading the native artifact and calling across it.
//!
//! # Responsibility
//! - Separate load-time failures ([`LoadError`]) from call-time failures
//!   ([`ToolboxError`]).
//! - Tag every call-time failure with the side of the boundary it came from.
//!
//! # Invariants
//! - Native-origin errors render with a `[native]` marker, host-origin errors
//!   with `[host]`.
//! - A native panic never shares a variant with an ordinary native error.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Side of the boundary where a failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Host,
    Native,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Native => "native",
        }
    }
}

impl Display for Origin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a backend for one native call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeFault {
    /// The native side handled the failure and reported it.
    Error(String),
    /// The native side panicked and the panic was trapped.
    Panic(String),
}

impl NativeFault {
    pub fn message(&self) -> &str {
        match self {
            Self::Error(message) | Self::Panic(message) => message,
        }
    }
}

/// Reasons the native artifact could not be made ready.
#[derive(Debug)]
pub enum LoadError {
    UnsupportedPlatform {
        os_name: String,
    },
    ResourceNotFound {
        resource_path: String,
    },
    EmptyArtifact {
        resource_path: String,
    },
    Io(std::io::Error),
    Library(libloading::Error),
    MissingSymbol {
        symbol: &'static str,
        source: libloading::Error,
    },
    IncompatibleAbi {
        host: u32,
        native: u32,
    },
}

impl LoadError {
    /// Stable identifier used in `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedPlatform { .. } => "unsupported_platform",
            Self::ResourceNotFound { .. } => "resource_not_found",
            Self::EmptyArtifact { .. } => "empty_artifact",
            Self::Io(_) => "io",
            Self::Library(_) => "library_load_failed",
            Self::MissingSymbol { .. } => "missing_symbol",
            Self::IncompatibleAbi { .. } => "incompatible_abi",
        }
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedPlatform { os_name } => {
                write!(f, "unsupported operating system: {os_name}")
            }
            Self::ResourceNotFound { resource_path } => {
                write!(f, "native library not found in resources: {resource_path}")
            }
            Self::EmptyArtifact { resource_path } => {
                write!(f, "native library resource is empty: {resource_path}")
            }
            Self::Io(err) => write!(f, "native library extraction failed: {err}"),
            Self::Library(err) => write!(f, "native library failed to load: {err}"),
            Self::MissingSymbol { symbol, source } => {
                write!(f, "native library is missing symbol `{symbol}`: {source}")
            }
            Self::IncompatibleAbi { host, native } => write!(
                f,
                "incompatible native ABI: host expects {host}, library provides {native}"
            ),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Library(err) => Some(err),
            Self::MissingSymbol { source, .. } => Some(source),
            Self::UnsupportedPlatform { .. }
            | Self::ResourceNotFound { .. }
            | Self::EmptyArtifact { .. }
            | Self::IncompatibleAbi { .. } => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<libloading::Error> for LoadError {
    fn from(value: libloading::Error) -> Self {
        Self::Library(value)
    }
}

/// Failure of one delegating toolbox call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolboxError {
    /// The native library is not loaded; the call was never attempted.
    NotInitialized { reason: Option<String> },
    /// The host rejected the arguments before crossing the boundary.
    InvalidInput {
        operation: &'static str,
        message: String,
    },
    /// The native side reported a handled error.
    Native {
        operation: &'static str,
        message: String,
    },
    /// The native side panicked; the panic was trapped at the boundary.
    NativePanic {
        operation: &'static str,
        message: String,
    },
}

impl ToolboxError {
    pub(crate) fn from_fault(operation: &'static str, fault: NativeFault) -> Self {
        match fault {
            NativeFault::Error(message) => Self::Native { operation, message },
            NativeFault::Panic(message) => Self::NativePanic { operation, message },
        }
    }

    pub fn origin(&self) -> Origin {
        match self {
            Self::NotInitialized { .. } | Self::InvalidInput { .. } => Origin::Host,
            Self::Native { .. } | Self::NativePanic { .. } => Origin::Native,
        }
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, Self::NativePanic { .. })
    }

    /// Ordinary native errors may succeed on retry; panics and a missing
    /// library will not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Native { .. })
    }

    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::NotInitialized { .. } => None,
            Self::InvalidInput { operation, .. }
            | Self::Native { operation, .. }
            | Self::NativePanic { operation, .. } => Some(operation),
        }
    }

    /// Stable identifier used in `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotInitialized { .. } => "not_initialized",
            Self::InvalidInput { .. } => "invalid_input",
            Self::Native { .. } => "native_error",
            Self::NativePanic { .. } => "native_panic",
        }
    }
}

impl Display for ToolboxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let origin = self.origin();
        match self {
            Self::NotInitialized { reason: Some(reason) } => {
                write!(f, "[{origin}] native library not loaded: {reason}")
            }
            Self::NotInitialized { reason: None } => {
                write!(f, "[{origin}] native library not loaded")
            }
            Self::InvalidInput { operation, message } => {
                write!(f, "[{origin}] invalid input for {operation}: {message}")
            }
            Self::Native { operation, message } => {
                write!(f, "[{origin}] {operation} failed: {message}")
            }
            Self::NativePanic { operation, message } => {
                write!(f, "[{origin}] {operation} panicked: {message}")
            }
        }
    }
}

impl Error for ToolboxError {}

#[cfg(test)]
mod tests {
    use super::{LoadError, NativeFault, Origin, ToolboxError};

    #[test]
    fn native_faults_map_to_distinct_variants() {
        let error = ToolboxError::from_fault("add", NativeFault::Error("overflow".to_string()));
        assert!(!error.is_panic());
        assert!(error.is_retryable());

        let panic = ToolboxError::from_fault("add", NativeFault::Panic("boom".to_string()));
        assert!(panic.is_panic());
        assert!(!panic.is_retryable());
        assert_ne!(error.code(), panic.code());
    }

    #[test]
    fn display_carries_origin_marker() {
        let native = ToolboxError::Native {
            operation: "process_string",
            message: "input is null".to_string(),
        };
        assert_eq!(native.origin(), Origin::Native);
        assert_eq!(
            native.to_string(),
            "[native] process_string failed: input is null"
        );

        let host = ToolboxError::NotInitialized {
            reason: Some("unsupported operating system: plan9".to_string()),
        };
        assert_eq!(host.origin(), Origin::Host);
        assert!(host.to_string().starts_with("[host] native library not loaded"));
        assert_eq!(host.operation(), None);
    }

    #[test]
    fn load_error_codes_are_stable() {
        let error = LoadError::UnsupportedPlatform {
            os_name: "Plan 9".to_string(),
        };
        assert_eq!(error.code(), "unsupported_platform");
        assert_eq!(error.to_string(), "unsupported operating system: Plan 9");

        let io: LoadError = std::io::Error::other("disk full").into();
        assert_eq!(io.code(), "io");
        assert!(std::error::Error::source(&io).is_some());
    }
}
