//! Compile-time build information.

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// `handflap <date> (<commit>)`, as printed by `--version`.
pub fn version_string() -> String {
    format!("handflap {} ({})", BUILD_DATE, BUILD_COMMIT)
}
