//! Dispatch abstract resource operations onto cloud-management resource managers.
//!
//! - [`resource`] - request builder, dispatch table, registry and structured errors
//! - [`cloud`] - session source and the REST-backed resource manager
//! - [`config`] - persistent configuration

pub mod cloud;
pub mod config;
pub mod resource;
