//! Shared test utilities for the wx-viewer workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Legend, config and style fixtures
//! - Palette generators and packed-pixel inspection helpers
//! - Lookup of optional test assets (fonts) with a skip macro
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Macro to skip a test if the required file is not found.
///
/// ```ignore
/// use test_utils::require_test_file;
///
/// #[test]
/// fn test_truetype_labels() {
///     let path = require_test_file!("DejaVuSans.ttf");
///     // Test code using path...
/// }
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: Test file '{}' not found. Set TEST_DATA_DIR to run this test.",
                    $name
                );
                return;
            }
        }
    }};
}
