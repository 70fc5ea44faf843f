//! CLI smoke harness for the native toolbox.
//!
//! # Responsibility
//! - Load the native artifact the way an embedding application would.
//! - Exercise every toolbox operation, including a trapped native panic.
//! - Exit non-zero when the artifact is unavailable or a check fails.

use log::{info, warn};
use minrust_core::{
    core_version, default_log_level, flush_logging, init_logging, NativeToolbox, Toolbox,
    ToolboxConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "MINRUST_LOG_DIR";
const LOG_LEVEL_ENV: &str = "MINRUST_LOG_LEVEL";

/// Outcome of one smoke step.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StepReport {
    name: &'static str,
    passed: bool,
    detail: String,
}

impl StepReport {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            detail: detail.into(),
        }
    }
}

fn main() -> ExitCode {
    let log_dir = resolve_log_dir();
    if let Err(err) = init_logging(&resolve_log_level(), &log_dir.to_string_lossy()) {
        eprintln!("logging disabled: {err}");
    }
    println!("minrust_core version={}", core_version());

    let code = run();
    flush_logging();
    code
}

fn run() -> ExitCode {
    let toolbox = NativeToolbox::initialize(&ToolboxConfig::from_env());
    if !toolbox.is_ready() {
        let reason = toolbox
            .load_error()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown".to_string());
        eprintln!("Failed to load native library: {reason}");
        return ExitCode::FAILURE;
    }
    match toolbox.artifact_path() {
        Some(path) => println!("Native library loaded from {}", path.display()),
        None => println!("Native library loaded"),
    }

    let reports = run_smoke(&toolbox);
    for report in &reports {
        let marker = if report.passed { "ok" } else { "FAILED" };
        println!("[{marker}] {}: {}", report.name, report.detail);
    }

    let failed = reports.iter().filter(|report| !report.passed).count();
    if failed > 0 {
        warn!("event=smoke_done module=cli status=error failed={failed}");
        eprintln!("{failed} smoke check(s) failed");
        return ExitCode::FAILURE;
    }
    info!(
        "event=smoke_done module=cli status=ok checks={}",
        reports.len()
    );
    println!("All checks completed!");
    ExitCode::SUCCESS
}

fn run_smoke(toolbox: &dyn Toolbox) -> Vec<StepReport> {
    let mut reports = Vec::new();

    reports.push(match toolbox.add(5, 3) {
        Ok(8) => StepReport::pass("add", "5 + 3 = 8"),
        Ok(other) => StepReport::fail("add", format!("5 + 3 returned {other}")),
        Err(err) => StepReport::fail("add", err.to_string()),
    });

    reports.push(match toolbox.process_string("Hello from minrust!") {
        Ok(output) if output.ends_with("Hello from minrust!") => {
            StepReport::pass("process_string", format!("processed string: {output}"))
        }
        Ok(output) => StepReport::fail("process_string", format!("unexpected output: {output}")),
        Err(err) => StepReport::fail("process_string", err.to_string()),
    });

    reports.push(match toolbox.might_panic(false) {
        Ok(()) => StepReport::pass("might_panic(false)", "completed without panic"),
        Err(err) => StepReport::fail("might_panic(false)", err.to_string()),
    });

    reports.push(match toolbox.might_panic(true) {
        Err(err) if err.is_panic() => {
            StepReport::pass("might_panic(true)", format!("caught as expected: {err}"))
        }
        Err(err) => StepReport::fail("might_panic(true)", format!("wrong error kind: {err}")),
        Ok(()) => StepReport::fail("might_panic(true)", "returned without reporting a panic"),
    });

    reports.push(match toolbox.add(1, 1) {
        Ok(2) => StepReport::pass("after panic", "toolbox still responsive"),
        Ok(other) => StepReport::fail("after panic", format!("1 + 1 returned {other}")),
        Err(err) => StepReport::fail("after panic", err.to_string()),
    });

    reports
}

fn resolve_log_dir() -> PathBuf {
    std::env::var(LOG_DIR_ENV)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("minrust-logs"))
}

fn resolve_log_level() -> String {
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .unwrap_or_else(|| default_log_level().to_string())
}

#[cfg(test)]
mod tests {
    use super::run_smoke;
    use minrust_core::{LoadError, NativeBackend, NativeFault, NativeToolbox};
    use std::ffi::CStr;

    struct ScriptedBackend {
        panic_reported: bool,
    }

    impl NativeBackend for ScriptedBackend {
        fn add(&self, a: i32, b: i32) -> Result<i32, NativeFault> {
            Ok(a + b)
        }

        fn process_string(&self, input: &CStr) -> Result<String, NativeFault> {
            Ok(format!("[RUST] {}", input.to_string_lossy()))
        }

        fn might_panic(&self, should_panic: bool) -> Result<(), NativeFault> {
            if should_panic && self.panic_reported {
                return Err(NativeFault::Panic("scripted panic".to_string()));
            }
            Ok(())
        }
    }

    #[test]
    fn smoke_passes_against_well_behaved_backend() {
        let toolbox = NativeToolbox::with_backend(ScriptedBackend {
            panic_reported: true,
        });
        let reports = run_smoke(&toolbox);
        assert_eq!(reports.len(), 5);
        assert!(reports.iter().all(|report| report.passed), "{reports:?}");
    }

    #[test]
    fn smoke_flags_a_swallowed_panic() {
        let toolbox = NativeToolbox::with_backend(ScriptedBackend {
            panic_reported: false,
        });
        let reports = run_smoke(&toolbox);
        let failed: Vec<_> = reports.iter().filter(|report| !report.passed).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].name, "might_panic(true)");
    }

    #[test]
    fn smoke_fails_every_step_when_unavailable() {
        let toolbox = NativeToolbox::unavailable(LoadError::ResourceNotFound {
            resource_path: "/natives/linux64/libminrust_native.so".to_string(),
        });
        let reports = run_smoke(&toolbox);
        assert!(reports.iter().all(|report| !report.passed));
        assert!(reports[0].detail.contains("[host]"));
    }
}
