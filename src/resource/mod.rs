//! Resource request dispatch
//!
//! Turns "perform operation X on resource Y" into a call on the resource
//! manager registered for Y, and shapes the result or failure for callers.
//!
//! # Architecture
//!
//! - [`kind`] - Resource and operation tags
//! - [`registry`] - The [`ResourceManager`] capability trait and the registry of managers
//! - [`dispatch`] - Explicit operation → manager-call strategies
//! - [`request`] - The immutable [`RequestBuilder`] and its [`Dispatcher`]
//! - [`error`] - Structured request errors and their classification
//! - [`narrator`] - Change descriptions for reconcile steps
//!
//! # Example
//!
//! ```ignore
//! use rescall::resource::{Dispatcher, ManagerRegistry, OperationKind, RequestBuilder, ResourceKind};
//!
//! async fn vm_status(dispatcher: &Dispatcher, id: &str) -> anyhow::Result<String> {
//!     let applied = RequestBuilder::new(ResourceKind::Vm, OperationKind::Get)
//!         .apply(dispatcher, id, None)
//!         .await?;
//!     Ok(applied.info.status)
//! }
//! ```

pub mod dispatch;
pub mod error;
pub mod kind;
pub mod narrator;
pub mod registry;
pub mod request;

pub use dispatch::{camel_split, merge_params, DispatchTable, Strategy};
pub use error::{ClientError, RemoteError, RequestError};
pub use kind::{OperationKind, ResourceKind};
pub use narrator::{ChangeNarrator, ReconcileStep, ResourcePhase};
pub use registry::{ListResult, ManagerRegistry, Params, ResourceManager};
pub use request::{Applied, Dispatcher, ExternalInfo, RequestBuilder};
