// Copyright © 2024 FaultPage. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build script for FaultPage.
//!
//! Checks the toolchain version and asks Cargo to rebuild whenever one of the
//! embedded code templates changes.

/// Minimum supported Rust version, kept in sync with `rust-version`.
const MIN_RUSTC_VERSION: &str = "1.74.0";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=templates");

    if version_check::is_min_version(MIN_RUSTC_VERSION) != Some(true) {
        eprintln!(
            "FaultPage requires rustc >= {}. Please update your toolchain.",
            MIN_RUSTC_VERSION
        );
        std::process::exit(1);
    }
}
