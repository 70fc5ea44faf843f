//! Native toolbox artifact for minrust hosts.
//!
//! Built as a `cdylib` and shipped per platform; hosts extract it, load it
//! dynamically, and call the C ABI exported from [`api`].

pub mod api;

pub use api::{
    minrust_abi_version, minrust_add, minrust_might_panic, minrust_process_string,
    minrust_string_free,
};

/// ABI revision reported by `minrust_abi_version`.
pub const ABI_VERSION: u32 = 1;

/// Call completed and wrote its output.
pub const STATUS_OK: i32 = 0;
/// Call failed with a handled error; `out_err` holds the message.
pub const STATUS_ERROR: i32 = 1;
/// Call panicked; the panic was caught and `out_err` holds the payload.
pub const STATUS_PANIC: i32 = 2;

/// Prefix applied by `minrust_process_string`.
pub const PROCESS_PREFIX: &str = "[RUST] ";
