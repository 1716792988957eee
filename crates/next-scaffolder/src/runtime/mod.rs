//! Package-manager collaborators and environment detection
//!
//! This module provides:
//! - The [`PackageManagerRunner`] seam for install and typegen
//! - A process-backed default runner
//! - Package manager, connectivity and CI detection

pub mod check;
pub mod runner;

pub use check::{
    check_compatibility, check_package_manager, detect_package_manager, is_ci, is_online,
    RuntimeInfo,
};
pub use runner::{CommandRunner, PackageManagerRunner};
