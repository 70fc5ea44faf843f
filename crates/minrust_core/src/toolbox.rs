//! Boundary adapter between host callers and the native toolbox.
//!
//! # Responsibility
//! - Own the load state of the native artifact for one composition root.
//! - Refuse calls before the artifact is ready, without touching it.
//! - Trap panics at the boundary and tag every failure with its origin.
//!
//! # Invariants
//! - Load state is decided at construction and never changes afterward.
//! - A native panic surfaces as `ToolboxError::NativePanic`, never as an
//!   unwinding panic in the caller.
//! - Successful results are returned unchanged.

use crate::config::ToolboxConfig;
use crate::error::{LoadError, NativeFault, ToolboxError};
use crate::loader::load_toolbox_backend;
use crate::logging::{panic_payload_message, sanitize_message};
use log::{debug, error, info, warn};
use std::ffi::{CStr, CString};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

const MAX_LOGGED_MESSAGE_CHARS: usize = 200;

/// Raw calls into one native implementation.
pub trait NativeBackend: Send + Sync {
    fn add(&self, a: i32, b: i32) -> Result<i32, NativeFault>;
    fn process_string(&self, input: &CStr) -> Result<String, NativeFault>;
    fn might_panic(&self, should_panic: bool) -> Result<(), NativeFault>;

    /// Location of the extracted artifact, when the backend was loaded from one.
    fn artifact_path(&self) -> Option<&Path> {
        None
    }
}

/// Operations consumers depend on; take `&dyn Toolbox` instead of a global.
pub trait Toolbox {
    fn is_ready(&self) -> bool;
    fn add(&self, a: i32, b: i32) -> Result<i32, ToolboxError>;
    fn process_string(&self, input: &str) -> Result<String, ToolboxError>;
    fn might_panic(&self, should_panic: bool) -> Result<(), ToolboxError>;
}

enum LoadState {
    Ready(Box<dyn NativeBackend>),
    Unavailable(LoadError),
}

/// Native toolbox adapter. Construct once and pass by reference.
pub struct NativeToolbox {
    state: LoadState,
}

impl NativeToolbox {
    /// Loads the artifact described by `config`.
    ///
    /// Never fails: a load error is logged and leaves the adapter permanently
    /// unavailable.
    pub fn initialize(config: &ToolboxConfig) -> Self {
        match Self::try_initialize(config) {
            Ok(toolbox) => toolbox,
            Err(err) => {
                error!(
                    "event=toolbox_init module=toolbox status=error ready=false error_code={} error={}",
                    err.code(),
                    err
                );
                Self::unavailable(err)
            }
        }
    }

    pub fn try_initialize(config: &ToolboxConfig) -> Result<Self, LoadError> {
        let backend = load_toolbox_backend(config)?;
        info!("event=toolbox_init module=toolbox status=ok ready=true");
        Ok(Self::with_backend(backend))
    }

    /// Ready adapter over an already constructed backend.
    pub fn with_backend(backend: impl NativeBackend + 'static) -> Self {
        Self {
            state: LoadState::Ready(Box::new(backend)),
        }
    }

    pub fn unavailable(err: LoadError) -> Self {
        Self {
            state: LoadState::Unavailable(err),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, LoadState::Ready(_))
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        match &self.state {
            LoadState::Ready(_) => None,
            LoadState::Unavailable(err) => Some(err),
        }
    }

    pub fn artifact_path(&self) -> Option<&Path> {
        match &self.state {
            LoadState::Ready(backend) => backend.artifact_path(),
            LoadState::Unavailable(_) => None,
        }
    }

    pub fn add(&self, a: i32, b: i32) -> Result<i32, ToolboxError> {
        self.dispatch("add", |backend| backend.add(a, b))
    }

    pub fn process_string(&self, input: &str) -> Result<String, ToolboxError> {
        const OPERATION: &str = "process_string";
        let backend = self.backend(OPERATION)?;
        let input = CString::new(input).map_err(|err| {
            let error = ToolboxError::InvalidInput {
                operation: OPERATION,
                message: format!("interior NUL byte at position {}", err.nul_position()),
            };
            log_failure(&error);
            error
        })?;
        trap(OPERATION, backend, |backend| backend.process_string(&input))
    }

    pub fn might_panic(&self, should_panic: bool) -> Result<(), ToolboxError> {
        self.dispatch("might_panic", |backend| backend.might_panic(should_panic))
    }

    fn backend(&self, operation: &'static str) -> Result<&dyn NativeBackend, ToolboxError> {
        match &self.state {
            LoadState::Ready(backend) => Ok(backend.as_ref()),
            LoadState::Unavailable(err) => {
                warn!(
                    "event=native_call module=toolbox status=rejected origin=host op={} error_code=not_initialized",
                    operation
                );
                Err(ToolboxError::NotInitialized {
                    reason: Some(err.to_string()),
                })
            }
        }
    }

    fn dispatch<T>(
        &self,
        operation: &'static str,
        call: impl FnOnce(&dyn NativeBackend) -> Result<T, NativeFault>,
    ) -> Result<T, ToolboxError> {
        let backend = self.backend(operation)?;
        trap(operation, backend, call)
    }
}

impl Toolbox for NativeToolbox {
    fn is_ready(&self) -> bool {
        NativeToolbox::is_ready(self)
    }

    fn add(&self, a: i32, b: i32) -> Result<i32, ToolboxError> {
        NativeToolbox::add(self, a, b)
    }

    fn process_string(&self, input: &str) -> Result<String, ToolboxError> {
        NativeToolbox::process_string(self, input)
    }

    fn might_panic(&self, should_panic: bool) -> Result<(), ToolboxError> {
        NativeToolbox::might_panic(self, should_panic)
    }
}

/// Runs one backend call, turning a Rust panic or a reported fault into a
/// logged [`ToolboxError`].
fn trap<T>(
    operation: &'static str,
    backend: &dyn NativeBackend,
    call: impl FnOnce(&dyn NativeBackend) -> Result<T, NativeFault>,
) -> Result<T, ToolboxError> {
    let fault = match panic::catch_unwind(AssertUnwindSafe(|| call(backend))) {
        Ok(Ok(value)) => {
            debug!("event=native_call module=toolbox status=ok op={operation}");
            return Ok(value);
        }
        Ok(Err(fault)) => fault,
        Err(payload) => NativeFault::Panic(panic_payload_message(payload.as_ref())),
    };
    let error = ToolboxError::from_fault(operation, fault);
    log_failure(&error);
    Err(error)
}

fn log_failure(error: &ToolboxError) {
    error!(
        "event=native_call module=toolbox status=error origin={} op={} error_code={} error={}",
        error.origin(),
        error.operation().unwrap_or("-"),
        error.code(),
        sanitize_message(&error.to_string(), MAX_LOGGED_MESSAGE_CHARS)
    );
}
