//! Host side of the minrust native toolbox.
//!
//! Locates the prebuilt `minrust_native` artifact for the current platform,
//! extracts and loads it, and exposes its operations through
//! [`NativeToolbox`], which converts native failures (including panics) into
//! typed [`ToolboxError`] values.

pub mod config;
pub mod error;
pub mod extract;
pub mod loader;
pub mod logging;
pub mod platform;
pub mod resources;
pub mod toolbox;

pub use config::ToolboxConfig;
pub use error::{LoadError, NativeFault, Origin, ToolboxError};
pub use extract::extract_artifact;
pub use loader::{load_toolbox_backend, DynamicBackend, NativeApi, ABI_VERSION};
pub use logging::{
    default_log_level, flush_logging, init_logging, logging_status, LoggingError,
};
pub use platform::{NativeArtifact, Platform};
pub use resources::{DirectoryResources, EmbeddedResources, ResourceSource};
pub use toolbox::{NativeBackend, NativeToolbox, Toolbox};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
