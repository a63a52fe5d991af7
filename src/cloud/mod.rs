//! Remote API collaborators
//!
//! Concrete pieces the dispatcher talks to when backed by a REST API.
//!
//! # Module Structure
//!
//! - [`auth`] - Sessions and where they come from
//! - [`http`] - HTTP client wrapper and error-body decoding
//! - [`manager`] - [`ResourceManager`](crate::resource::ResourceManager) over a REST collection
//!
//! # Example
//!
//! ```ignore
//! use rescall::cloud::{http::ApiClient, manager::HttpManager};
//!
//! let api = ApiClient::new()?;
//! let servers = HttpManager::new(api, "https://cloud.example.com/api/v2", "servers")?;
//! ```

pub mod auth;
pub mod http;
pub mod manager;
