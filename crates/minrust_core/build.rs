//! Build script: embeds prebuilt native artifacts into `minrust_core`.
//!
//! Reads `MINRUST_EMBED_NATIVE_DIR` (layout `<dir>/<platform folder>/<file>`)
//! and generates `bundled_natives.rs` in `OUT_DIR` with one `include_bytes!`
//! entry per artifact found. Without the variable the table is empty.
use std::env;
use std::fs;
use std::path::PathBuf;

const EMBED_DIR_ENV: &str = "MINRUST_EMBED_NATIVE_DIR";

const ARTIFACTS: &[(&str, &str)] = &[
    ("windows64", "minrust_native.dll"),
    ("macosx64", "libminrust_native.dylib"),
    ("linux64", "libminrust_native.so"),
];

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR"));
    println!("cargo:rerun-if-env-changed={EMBED_DIR_ENV}");
    println!("cargo:rerun-if-changed=build.rs");

    let mut entries = String::new();
    if let Some(embed_dir) = env::var_os(EMBED_DIR_ENV).filter(|value| !value.is_empty()) {
        let embed_dir = PathBuf::from(embed_dir);
        for (folder, file_name) in ARTIFACTS {
            let candidate = embed_dir.join(folder).join(file_name);
            println!("cargo:rerun-if-changed={}", candidate.display());
            if candidate.is_file() {
                entries.push_str(&format!(
                    "    ({:?}, include_bytes!({:?}) as &[u8]),\n",
                    format!("/natives/{folder}/{file_name}"),
                    candidate.display().to_string()
                ));
            }
        }
    }

    let generated = format!(
        "static BUNDLED_NATIVES: &[(&str, &[u8])] = &[\n{entries}];\n"
    );
    fs::write(out_dir.join("bundled_natives.rs"), generated).expect("write bundled_natives.rs");
}
