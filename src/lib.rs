//! cloud-seed library
//!
//! Compiles a machine description (a HOCON config file parsed by the CLI
//! shell) into the cloud-init user-data YAML document a cloud platform
//! feeds to a freshly provisioned instance at first boot.
//!
//! # Pipeline
//!
//! config tree → [`config::ConfigFileSettings`] → [`userdata::build`] →
//! [`userdata::emit`] → text artifact
//!
//! The pipeline is synchronous and pure: every entity is constructed once
//! and never mutated, and the first failure aborts the whole run. File I/O
//! and logging belong to the shell, never to the library.

pub mod config;
pub mod userdata;

mod error;

pub use error::SeedError;
