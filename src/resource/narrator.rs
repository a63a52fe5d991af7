//! Change narration for reconcile steps

use super::error::RequestError;
use super::kind::OperationKind;
use super::registry::Params;
use super::request::{Dispatcher, ExternalInfo, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered, human-readable list of changes made by one reconcile step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeNarrator {
    pub name: String,
    lines: Vec<String>,
}

impl ChangeNarrator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Vec::new(),
        }
    }

    /// Append a formatted line: `narrator.appendf(format_args!("resize to {}G", size))`
    pub fn appendf(&mut self, args: fmt::Arguments<'_>) {
        self.lines.push(args.to_string());
    }

    /// Append `change "<field>" from (<from>) to (<to>)`
    pub fn append(&mut self, field: &str, from: &str, to: &str) {
        self.appendf(format_args!(r#"change "{}" from ({}) to ({})"#, field, from, to));
    }

    /// Append all of `other`'s lines after our own
    pub fn merge(&mut self, other: &ChangeNarrator) {
        self.lines.extend(other.lines.iter().cloned());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ChangeNarrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.lines.join("; "))
    }
}

/// Lifecycle phase of a managed resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourcePhase {
    Pending,
    Waiting,
    Running,
    Ready,
    Failed,
    Invalid,
    Unknown,
}

/// One request a reconciler intends to issue, with its narration
///
/// `pre_phases` lists the phases the resource must be in for the step to run;
/// an empty list allows any phase.
#[derive(Debug, Clone)]
pub struct ReconcileStep {
    pub request: RequestBuilder,
    pub id: String,
    pub params: Option<Params>,
    pub desc: ChangeNarrator,
    pub pre_phases: Vec<ResourcePhase>,
}

impl ReconcileStep {
    /// Step narrated under the request's action name
    pub fn new(request: RequestBuilder, id: impl Into<String>) -> Self {
        let desc = ChangeNarrator::new(request.action_name());
        Self {
            request,
            id: id.into(),
            params: None,
            desc,
            pre_phases: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_pre_phases(mut self, phases: impl IntoIterator<Item = ResourcePhase>) -> Self {
        self.pre_phases = phases.into_iter().collect();
        self
    }

    pub fn is_ready(&self, phase: ResourcePhase) -> bool {
        self.pre_phases.is_empty() || self.pre_phases.contains(&phase)
    }

    pub fn operation(&self) -> &OperationKind {
        self.request.operation()
    }

    /// Apply the request; on failure the error still names the action
    pub async fn run(&self, dispatcher: &Dispatcher) -> Result<ExternalInfo, RequestError> {
        tracing::info!("{}", self.desc);
        let applied = self
            .request
            .apply(dispatcher, &self.id, self.params.clone())
            .await?;
        Ok(applied.info)
    }
}
