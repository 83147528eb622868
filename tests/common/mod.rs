#![allow(dead_code)]

pub mod synthetic_image;

use std::path::PathBuf;

/// Unique scratch path under the system temp directory.
pub fn temp_path(test: &str, name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("slimage-tests-{}-{test}", std::process::id()))
        .join(name)
}
