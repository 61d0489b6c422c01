//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution,
//! privileged execution, repository HTTP access, host inspection, scratch
//! files and host context loading.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod command_runner;
pub mod context;
pub mod host;
pub mod repo;
pub mod scratch;
pub mod sudo;
