//! Configuration inputs resolved outside the scaffolding steps
//!
//! - [`Overrides`]: release-version overrides from the environment
//! - [`Preferences`]: answers saved from a previous interactive run

pub mod overrides;
pub mod preferences;

pub use overrides::{Overrides, TEST_VERSION_ENV};
pub use preferences::{Linter, Preferences};
