//! Dispatch Table
//!
//! Maps operation kinds onto concrete resource-manager calls.
//!
//! Every operation gets an explicit [`Strategy`] when the table is built, so
//! the mapping can be listed and tested instead of being re-derived from the
//! operation name on every call. Names outside the closed set follow the same
//! naming rules: a `Get` prefix selects a specific-get on the lower-cased
//! remainder, anything else a generic action on the dash-split name.

use super::kind::OperationKind;
use super::registry::Params;
use std::collections::HashMap;
use std::fmt;

/// The manager call an operation resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// `create(params)`, id ignored
    Create,
    /// `delete_with_params(id, params)`
    Delete,
    /// `update(id, params)`
    Update,
    /// `get(id)` when an id is given, else first element of `list(params)`
    Get,
    /// `get_specific(id, spec, params)`
    Specific { spec: String },
    /// `perform_action(id, action, params)`
    Action { action: String },
}

impl Strategy {
    /// Derive the strategy for an operation from its name
    pub fn derive(operation: &OperationKind) -> Self {
        // Match on the name so hand-built custom operations route the same way
        let name = operation.name();
        match name {
            "Create" => Strategy::Create,
            "Delete" => Strategy::Delete,
            "Update" => Strategy::Update,
            "Get" => Strategy::Get,
            _ => match name.strip_prefix("Get") {
                Some(spec) => Strategy::Specific {
                    spec: spec.to_lowercase(),
                },
                None => Strategy::Action {
                    action: camel_split(name, "-"),
                },
            },
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Create => f.write_str("create"),
            Strategy::Delete => f.write_str("delete"),
            Strategy::Update => f.write_str("update"),
            Strategy::Get => f.write_str("get"),
            Strategy::Specific { spec } => write!(f, "get-specific({})", spec),
            Strategy::Action { action } => write!(f, "perform-action({})", action),
        }
    }
}

/// Operation → strategy table
#[derive(Debug, Clone)]
pub struct DispatchTable {
    entries: HashMap<OperationKind, Strategy>,
}

impl DispatchTable {
    /// Table pre-filled for every operation in the closed set
    pub fn new() -> Self {
        let entries = OperationKind::KNOWN
            .into_iter()
            .map(|op| {
                let strategy = Strategy::derive(&op);
                (op, strategy)
            })
            .collect();
        Self { entries }
    }

    /// Add a custom operation, deriving its strategy once
    pub fn register(&mut self, operation: OperationKind) -> &Strategy {
        self.entries
            .entry(operation)
            .or_insert_with_key(Strategy::derive)
    }

    /// Strategy for an operation; unregistered custom names are derived on demand
    pub fn strategy(&self, operation: &OperationKind) -> Strategy {
        self.entries
            .get(operation)
            .cloned()
            .unwrap_or_else(|| Strategy::derive(operation))
    }

    /// All entries, sorted by operation name
    pub fn entries(&self) -> Vec<(&OperationKind, &Strategy)> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.0.name().cmp(b.0.name()));
        entries
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a camel-case identifier into lower-case words joined by `sep`
///
/// `ChangeBandwidth` -> `change-bandwidth`. A run of capitals is kept as one
/// word, breaking before the last capital when a lower-case letter follows:
/// `ResetVMPassword` -> `reset-vm-password`.
pub fn camel_split(name: &str, sep: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if !prev.is_ascii_uppercase() || next_is_lower {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c.to_ascii_lowercase());
    }

    if !current.is_empty() {
        words.push(current);
    }

    words.join(sep)
}

/// Overlay `defaults` onto `params`
///
/// Defaults win: a key present in both ends up with the default's value.
/// Callers use this to force fields regardless of what was passed in.
pub fn merge_params(params: Option<Params>, defaults: Option<&Params>) -> Params {
    let mut merged = params.unwrap_or_default();
    if let Some(defaults) = defaults {
        for (key, value) in defaults {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}
