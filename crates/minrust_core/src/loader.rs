//! Dynamic loading of the native artifact and status-code translation.
//!
//! # Responsibility
//! - Resolve platform, fetch artifact bytes, extract, `dlopen`, and resolve
//!   the exported C ABI.
//! - Verify the ABI revision before handing out a backend.
//! - Translate native status codes and owned message strings into
//!   [`NativeFault`] values.
//!
//! # Invariants
//! - Every string returned by the native side is copied and released through
//!   `minrust_string_free` exactly once.
//! - `DynamicBackend` drops its `Library` before deleting the extracted file.

use crate::config::ToolboxConfig;
use crate::error::{LoadError, NativeFault};
use crate::extract::extract_artifact;
use crate::platform::Platform;
use crate::toolbox::NativeBackend;
use libloading::Library;
use log::{error, info};
use std::ffi::CStr;
use std::os::raw::c_char;
use std::path::Path;
use std::ptr;
use std::time::Instant;
use tempfile::TempPath;

/// ABI revision this host understands.
pub const ABI_VERSION: u32 = 1;

pub const STATUS_OK: i32 = 0;
pub const STATUS_ERROR: i32 = 1;
pub const STATUS_PANIC: i32 = 2;

const SYM_ABI_VERSION: &[u8] = b"minrust_abi_version\0";
const SYM_ADD: &[u8] = b"minrust_add\0";
const SYM_PROCESS_STRING: &[u8] = b"minrust_process_string\0";
const SYM_MIGHT_PANIC: &[u8] = b"minrust_might_panic\0";
const SYM_STRING_FREE: &[u8] = b"minrust_string_free\0";

pub type AbiVersionFn = unsafe extern "C" fn() -> u32;
pub type AddFn = unsafe extern "C" fn(i32, i32, *mut i32, *mut *mut c_char) -> i32;
pub type ProcessStringFn =
    unsafe extern "C" fn(*const c_char, *mut *mut c_char, *mut *mut c_char) -> i32;
pub type MightPanicFn = unsafe extern "C" fn(bool, *mut *mut c_char) -> i32;
pub type StringFreeFn = unsafe extern "C" fn(*mut c_char);

/// Resolved entry points of the native C ABI.
#[derive(Debug, Clone, Copy)]
pub struct NativeApi {
    abi_version: AbiVersionFn,
    add: AddFn,
    process_string: ProcessStringFn,
    might_panic: MightPanicFn,
    string_free: StringFreeFn,
}

impl NativeApi {
    /// Builds an API table from raw entry points.
    ///
    /// # Safety
    /// Every pointer must implement the `minrust_native` C ABI contract and
    /// stay valid for as long as the returned value is used.
    pub unsafe fn from_raw_parts(
        abi_version: AbiVersionFn,
        add: AddFn,
        process_string: ProcessStringFn,
        might_panic: MightPanicFn,
        string_free: StringFreeFn,
    ) -> Self {
        Self {
            abi_version,
            add,
            process_string,
            might_panic,
            string_free,
        }
    }

    /// Resolves every exported symbol from `library`.
    ///
    /// # Safety
    /// `library` must be a `minrust_native` build and must outlive the
    /// returned table.
    pub unsafe fn resolve(library: &Library) -> Result<Self, LoadError> {
        Ok(Self {
            abi_version: symbol(library, SYM_ABI_VERSION)?,
            add: symbol(library, SYM_ADD)?,
            process_string: symbol(library, SYM_PROCESS_STRING)?,
            might_panic: symbol(library, SYM_MIGHT_PANIC)?,
            string_free: symbol(library, SYM_STRING_FREE)?,
        })
    }

    pub fn abi_version(&self) -> u32 {
        unsafe { (self.abi_version)() }
    }

    pub fn check_abi(&self) -> Result<(), LoadError> {
        let native = self.abi_version();
        if native != ABI_VERSION {
            return Err(LoadError::IncompatibleAbi {
                host: ABI_VERSION,
                native,
            });
        }
        Ok(())
    }

    fn take_string(&self, value: *mut c_char) -> Option<String> {
        if value.is_null() {
            return None;
        }
        let text = unsafe { CStr::from_ptr(value) }
            .to_string_lossy()
            .into_owned();
        unsafe { (self.string_free)(value) };
        Some(text)
    }

    fn finish(&self, status: i32, err: *mut c_char) -> Result<(), NativeFault> {
        let message = self.take_string(err);
        match status {
            STATUS_OK => Ok(()),
            STATUS_ERROR => Err(NativeFault::Error(
                message.unwrap_or_else(|| "native call failed without a message".to_string()),
            )),
            STATUS_PANIC => Err(NativeFault::Panic(
                message.unwrap_or_else(|| "native call panicked without a message".to_string()),
            )),
            other => Err(NativeFault::Error(format!(
                "unknown native status {other}: {}",
                message.unwrap_or_default()
            ))),
        }
    }
}

impl NativeBackend for NativeApi {
    fn add(&self, a: i32, b: i32) -> Result<i32, NativeFault> {
        let mut sum = 0;
        let mut err: *mut c_char = ptr::null_mut();
        let status = unsafe { (self.add)(a, b, &mut sum, &mut err) };
        self.finish(status, err).map(|()| sum)
    }

    fn process_string(&self, input: &CStr) -> Result<String, NativeFault> {
        let mut out: *mut c_char = ptr::null_mut();
        let mut err: *mut c_char = ptr::null_mut();
        let status = unsafe { (self.process_string)(input.as_ptr(), &mut out, &mut err) };
        let output = self.take_string(out);
        self.finish(status, err)?;
        output.ok_or_else(|| NativeFault::Error("native call returned no string".to_string()))
    }

    fn might_panic(&self, should_panic: bool) -> Result<(), NativeFault> {
        let mut err: *mut c_char = ptr::null_mut();
        let status = unsafe { (self.might_panic)(should_panic, &mut err) };
        self.finish(status, err)
    }
}

unsafe fn symbol<T: Copy>(library: &Library, name: &'static [u8]) -> Result<T, LoadError> {
    match library.get::<T>(name) {
        Ok(symbol) => Ok(*symbol),
        Err(source) => Err(LoadError::MissingSymbol {
            symbol: symbol_label(name),
            source,
        }),
    }
}

fn symbol_label(name: &'static [u8]) -> &'static str {
    let trimmed = name.strip_suffix(b"\0").unwrap_or(name);
    std::str::from_utf8(trimmed).unwrap_or("<non-utf8 symbol>")
}

/// Backend over a dynamically loaded, extracted artifact.
pub struct DynamicBackend {
    api: NativeApi,
    // Field order matters: the library is closed before the file is removed.
    _library: Library,
    artifact_path: TempPath,
}

impl DynamicBackend {
    /// Loads the extracted artifact in place and verifies its ABI.
    ///
    /// # Safety
    /// Loading runs the library's initializers; `artifact_path` must point to a
    /// trusted `minrust_native` build.
    pub unsafe fn open(artifact_path: TempPath) -> Result<Self, LoadError> {
        let library = Library::new(artifact_path.as_os_str())?;
        let api = NativeApi::resolve(&library)?;
        api.check_abi()?;
        Ok(Self {
            api,
            _library: library,
            artifact_path,
        })
    }
}

impl NativeBackend for DynamicBackend {
    fn add(&self, a: i32, b: i32) -> Result<i32, NativeFault> {
        self.api.add(a, b)
    }

    fn process_string(&self, input: &CStr) -> Result<String, NativeFault> {
        self.api.process_string(input)
    }

    fn might_panic(&self, should_panic: bool) -> Result<(), NativeFault> {
        self.api.might_panic(should_panic)
    }

    fn artifact_path(&self) -> Option<&Path> {
        Some(&*self.artifact_path)
    }
}

/// Resolves, extracts, and loads the artifact described by `config`.
///
/// # Side effects
/// - Writes the artifact to a temp file that lives as long as the backend.
/// - Emits `native_load` logging events with duration and status.
pub fn load_toolbox_backend(config: &ToolboxConfig) -> Result<DynamicBackend, LoadError> {
    let started_at = Instant::now();
    info!(
        "event=native_load module=loader status=start source={}",
        config.resources().kind()
    );

    match load_inner(config) {
        Ok(backend) => {
            info!(
                "event=native_load module=loader status=ok duration_ms={} path={}",
                started_at.elapsed().as_millis(),
                backend.artifact_path.display()
            );
            Ok(backend)
        }
        Err(err) => {
            error!(
                "event=native_load module=loader status=error duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                err.code(),
                err
            );
            Err(err)
        }
    }
}

fn load_inner(config: &ToolboxConfig) -> Result<DynamicBackend, LoadError> {
    let platform = match config.os_name() {
        Some(os_name) => Platform::from_os_name(os_name)?,
        None => Platform::current()?,
    };
    let artifact = platform.artifact();
    info!(
        "event=native_select module=loader status=ok platform={} resource={}",
        platform.label(),
        artifact.resource_path
    );
    let bytes = config.resources().fetch(artifact.resource_path)?;
    let artifact_path = extract_artifact(&artifact, &bytes, config.extract_dir())?;
    unsafe { DynamicBackend::open(artifact_path) }
}
