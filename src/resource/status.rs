//! Resource status values.

use crate::error::SdkError;
use std::fmt;
use std::str::FromStr;

/// Lifecycle status shared by accounts, groups, directories and the like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceStatus {
    Enabled,
    Disabled,
    Unverified,
}

impl ResourceStatus {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Enabled => "ENABLED",
            ResourceStatus::Disabled => "DISABLED",
            ResourceStatus::Unverified => "UNVERIFIED",
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceStatus {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ENABLED" => Ok(ResourceStatus::Enabled),
            "DISABLED" => Ok(ResourceStatus::Disabled),
            "UNVERIFIED" => Ok(ResourceStatus::Unverified),
            _ => Err(SdkError::invalid_resource(format!(
                "Unknown resource status '{}'",
                s
            ))),
        }
    }
}
