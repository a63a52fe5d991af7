//! Request errors
//!
//! A failed [`apply`](super::RequestBuilder::apply) always produces a
//! [`RequestError`]. Remote failures the API could describe become a
//! [`RemoteError`] with classification predicates; failures it could not
//! describe stay a separate [`RequestError::Transport`] variant instead of
//! posing as a zero-coded remote error.

use super::kind::ResourceKind;
use super::request::ExternalInfo;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error shape reported by the remote API: `{code, class, details}`
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{class} ({code}): {details}")]
pub struct ClientError {
    pub code: u16,
    #[serde(default)]
    pub class: String,
    #[serde(default, alias = "message")]
    pub details: String,
}

impl ClientError {
    pub fn new(code: u16, class: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            code,
            class: class.into(),
            details: details.into(),
        }
    }

    pub fn not_found(details: impl Into<String>) -> Self {
        Self::new(404, "NotFoundError", details)
    }

    /// Find a `ClientError` anywhere in the cause chain of `err`
    pub fn inspect(err: &anyhow::Error) -> Option<&ClientError> {
        err.chain().find_map(|cause| cause.downcast_ref::<ClientError>())
    }
}

/// A remote call failed with a status the API described
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Exec '{action}', {class}: {detail}")]
pub struct RemoteError {
    pub resource: ResourceKind,
    pub code: u16,
    pub action: String,
    pub class: String,
    pub detail: String,
}

impl RemoteError {
    pub(crate) fn from_client(resource: ResourceKind, action: String, client: &ClientError) -> Self {
        Self {
            resource,
            code: client.code,
            action,
            class: client.class.clone(),
            detail: client.details.clone(),
        }
    }

    /// A 404 for this exact resource kind. Not-founds for other kinds don't count.
    pub fn is_not_found(&self, resource: ResourceKind) -> bool {
        self.code == 404 && self.resource == resource
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.code) && self.code != 404
    }

    pub fn is_server_error(&self) -> bool {
        self.code >= 500
    }
}

#[derive(Debug, Error)]
pub enum RequestError {
    /// No manager registered for the resource kind
    #[error("no such resource '{resource}' in registry")]
    UnknownResource { resource: ResourceKind, action: String },

    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The call failed without a status/class/detail to classify it by
    #[error("Exec '{action}', transport error: {cause:#}")]
    Transport {
        resource: ResourceKind,
        action: String,
        cause: anyhow::Error,
    },
}

impl RequestError {
    pub fn action(&self) -> &str {
        match self {
            RequestError::UnknownResource { action, .. } => action,
            RequestError::Remote(remote) => &remote.action,
            RequestError::Transport { action, .. } => action,
        }
    }

    pub fn resource(&self) -> ResourceKind {
        match self {
            RequestError::UnknownResource { resource, .. } => *resource,
            RequestError::Remote(remote) => remote.resource,
            RequestError::Transport { resource, .. } => *resource,
        }
    }

    /// External info for a failed call: only the action name is known
    pub fn info(&self) -> ExternalInfo {
        ExternalInfo {
            action: self.action().to_string(),
            ..ExternalInfo::default()
        }
    }

    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            RequestError::Remote(remote) => Some(remote),
            _ => None,
        }
    }

    pub fn is_not_found(&self, resource: ResourceKind) -> bool {
        self.remote().is_some_and(|r| r.is_not_found(resource))
    }

    pub fn is_client_error(&self) -> bool {
        self.remote().is_some_and(RemoteError::is_client_error)
    }

    pub fn is_server_error(&self) -> bool {
        self.remote().is_some_and(RemoteError::is_server_error)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, RequestError::Transport { .. })
    }
}
