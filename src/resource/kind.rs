//! Resource and operation tags
//!
//! The closed sets of resource kinds and operation kinds a request can name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A category of remote-managed entity
///
/// The tag (see [`ResourceKind::as_str`]) is what ends up in action names,
/// so `VM` + `Get` reads as `VMGet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Virtual machine (server)
    #[serde(rename = "VM")]
    Vm,
    /// Elastic IP
    #[serde(rename = "EIP")]
    Eip,
    /// Block storage disk
    Disk,
    /// Ansible playbook
    #[serde(rename = "AP")]
    AnsiblePlaybook,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Vm,
        ResourceKind::Eip,
        ResourceKind::Disk,
        ResourceKind::AnsiblePlaybook,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Vm => "VM",
            ResourceKind::Eip => "EIP",
            ResourceKind::Disk => "Disk",
            ResourceKind::AnsiblePlaybook => "AP",
        }
    }

    /// Default REST collection keyword for this kind
    pub fn default_keyword(self) -> &'static str {
        match self {
            ResourceKind::Vm => "servers",
            ResourceKind::Eip => "elasticips",
            ResourceKind::Disk => "disks",
            ResourceKind::AnsiblePlaybook => "ansibleplaybooks",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("Unknown resource kind: {}", s))
    }
}

/// An abstract action against a resource kind
///
/// Names outside the closed set go through [`OperationKind::Custom`] and are
/// dispatched by their shape: a `Get` prefix means a specific-get, anything
/// else a generic action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Create,
    Delete,
    Update,
    Get,
    List,
    GetDetails,
    GetStatus,
    ChangeConfig,
    Syncstatus,
    Resize,
    ChangeBandwidth,
    SetSecgroups,
    Start,
    Stop,
    Custom(String),
}

impl OperationKind {
    /// Every operation in the closed set
    pub const KNOWN: [OperationKind; 14] = [
        OperationKind::Create,
        OperationKind::Delete,
        OperationKind::Update,
        OperationKind::Get,
        OperationKind::List,
        OperationKind::GetDetails,
        OperationKind::GetStatus,
        OperationKind::ChangeConfig,
        OperationKind::Syncstatus,
        OperationKind::Resize,
        OperationKind::ChangeBandwidth,
        OperationKind::SetSecgroups,
        OperationKind::Start,
        OperationKind::Stop,
    ];

    pub fn name(&self) -> &str {
        match self {
            OperationKind::Create => "Create",
            OperationKind::Delete => "Delete",
            OperationKind::Update => "Update",
            OperationKind::Get => "Get",
            OperationKind::List => "List",
            OperationKind::GetDetails => "GetDetails",
            OperationKind::GetStatus => "GetStatus",
            OperationKind::ChangeConfig => "ChangeConfig",
            OperationKind::Syncstatus => "Syncstatus",
            OperationKind::Resize => "Resize",
            OperationKind::ChangeBandwidth => "ChangeBandwidth",
            OperationKind::SetSecgroups => "SetSecgroups",
            OperationKind::Start => "Start",
            OperationKind::Stop => "Stop",
            OperationKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for OperationKind {
    /// Known names map onto their variant, anything else becomes `Custom`
    fn from(name: &str) -> Self {
        OperationKind::KNOWN
            .into_iter()
            .find(|op| op.name() == name)
            .unwrap_or_else(|| OperationKind::Custom(name.to_string()))
    }
}

impl FromStr for OperationKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(OperationKind::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_kind_parses_case_insensitively() {
        assert_eq!("vm".parse::<ResourceKind>().unwrap(), ResourceKind::Vm);
        assert_eq!("AP".parse::<ResourceKind>().unwrap(), ResourceKind::AnsiblePlaybook);
        assert!("bucket".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn test_known_operation_names_round_trip() {
        for op in OperationKind::KNOWN {
            assert_eq!(OperationKind::from(op.name()), op);
        }
    }

    #[test]
    fn test_unknown_operation_becomes_custom() {
        assert_eq!(
            OperationKind::from("GetVnc"),
            OperationKind::Custom("GetVnc".to_string())
        );
        assert_eq!(OperationKind::Custom("Reboot".into()).to_string(), "Reboot");
    }
}
