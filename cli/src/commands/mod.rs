//! Command implementations

pub mod install;
pub mod provision;
pub mod render_config;
pub mod run;
pub mod validate;
