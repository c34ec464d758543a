use std::env;
use std::fs;
use std::path::PathBuf;

const BUNDLE_FILE_ENV: &str = "JSONATA_SANDBOX_BUNDLE_FILE";

fn main() {
    println!("cargo::rustc-check-cfg=cfg(bundled_engine)");
    println!("cargo::rerun-if-env-changed={BUNDLE_FILE_ENV}");

    let manifest_dir =
        PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set"));
    let resources = manifest_dir.join("resources");
    println!("cargo::rerun-if-changed={}", resources.display());

    let bundle = match env::var_os(BUNDLE_FILE_ENV) {
        Some(path) => PathBuf::from(path),
        None => resources.join("jsonata.min.js"),
    };
    if !bundle.is_file() {
        println!(
            "cargo::warning=no JSONata bundle at {}; EngineSource::Bundled will be unavailable",
            bundle.display()
        );
        return;
    }
    println!("cargo::rerun-if-changed={}", bundle.display());

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set"));
    fs::copy(&bundle, out_dir.join("jsonata.min.js")).unwrap_or_else(|error| {
        panic!("failed to copy JSONata bundle ({}): {error}", bundle.display())
    });
    println!("cargo::rustc-cfg=bundled_engine");
}
