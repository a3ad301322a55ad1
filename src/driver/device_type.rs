//! Device family classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Device families the keyword layer has special handling for.
///
/// The set mirrors the driver's own platform names; anything the layer
/// has no special handling for is carried through as [`Other`](DeviceType::Other).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    CiscoIos,
    CiscoNxos,
    CiscoXr,
    Junos,
    AristaEos,
    F5Tmsh,
    Linux,
    #[serde(untagged)]
    Other(String),
}

impl DeviceType {
    /// Configuration changes on this family must be explicitly
    /// committed after being sent.
    pub fn requires_commit(&self) -> bool {
        matches!(self, DeviceType::CiscoXr | DeviceType::Junos)
    }

    /// F5 family, the only one supporting the terminal config merge.
    pub fn is_f5(&self) -> bool {
        match self {
            DeviceType::F5Tmsh => true,
            DeviceType::Other(name) => name.contains("f5"),
            _ => false,
        }
    }

    /// The driver-facing platform name.
    pub fn as_str(&self) -> &str {
        match self {
            DeviceType::CiscoIos => "cisco_ios",
            DeviceType::CiscoNxos => "cisco_nxos",
            DeviceType::CiscoXr => "cisco_xr",
            DeviceType::Junos => "junos",
            DeviceType::AristaEos => "arista_eos",
            DeviceType::F5Tmsh => "f5_tmsh",
            DeviceType::Linux => "linux",
            DeviceType::Other(name) => name,
        }
    }
}

impl FromStr for DeviceType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "cisco_ios" => DeviceType::CiscoIos,
            "cisco_nxos" => DeviceType::CiscoNxos,
            "cisco_xr" => DeviceType::CiscoXr,
            "junos" => DeviceType::Junos,
            "arista_eos" => DeviceType::AristaEos,
            "f5_tmsh" => DeviceType::F5Tmsh,
            "linux" => DeviceType::Linux,
            other => DeviceType::Other(other.to_string()),
        })
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
