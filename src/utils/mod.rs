//! Utility modules: build info, file persistence.

pub mod build_info;
pub mod persistence;
