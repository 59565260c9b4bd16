//! Platform-specific paths and file permissions.

pub mod paths;
pub mod permissions;

pub use paths::{config_dir, default_output_dir, resolve_output_dir};
pub use permissions::set_private;
