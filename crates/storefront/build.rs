//! Build script for storefront crate.
//!
//! Generates content-based hashes for the stylesheet and the booking script
//! so both can be served with immutable cache headers.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let static_dir = Path::new(&manifest_dir).join("static");

    hash_asset(&static_dir, "css", "main", "css", "CSS_HASH");
    hash_asset(&static_dir, "js", "booking", "js", "BOOKING_JS_HASH");
}

/// Hash `static/{dir}/{stem}.{ext}` and copy it to `static/{dir}/derived/{stem}.{hash}.{ext}`.
///
/// Sets `env_name` for use with `env!()`. An empty hash is emitted when the
/// source file is missing so templates fall back to the unhashed path.
fn hash_asset(static_dir: &Path, dir: &str, stem: &str, ext: &str, env_name: &str) {
    let source = static_dir.join(dir).join(format!("{stem}.{ext}"));
    println!("cargo:rerun-if-changed={}", source.display());

    let content = match fs::read(&source) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {}: {e}", source.display());
            println!("cargo:rustc-env={env_name}=");
            return;
        }
    };

    let mut hasher = Sha256::new();
    hasher.update(&content);
    let hash = format!("{:x}", hasher.finalize());
    let short_hash = &hash[..8];

    println!("cargo:rustc-env={env_name}={short_hash}");

    let derived_dir = static_dir.join(dir).join("derived");
    fs::create_dir_all(&derived_dir).expect("Failed to create derived asset directory");
    fs::copy(
        &source,
        derived_dir.join(format!("{stem}.{short_hash}.{ext}")),
    )
    .expect("Failed to copy asset to derived directory");
}
