use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Alert subsystems queryable through the alert database
///
/// The serialized tag is the value ntopng expects in the `alert_family`
/// request parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertFamily {
    Flow,
    ActiveMonitoring,
    Host,
    Interface,
    Mac,
    Network,
    Snmp,
    System,
    User,
}

impl AlertFamily {
    /// Wire tag for the `alert_family` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertFamily::Flow => "flow",
            AlertFamily::ActiveMonitoring => "active_monitoring",
            AlertFamily::Host => "host",
            AlertFamily::Interface => "interface",
            AlertFamily::Mac => "mac",
            AlertFamily::Network => "network",
            AlertFamily::Snmp => "snmp",
            AlertFamily::System => "system",
            AlertFamily::User => "user",
        }
    }

    /// All families, in the order ntopng documents them
    pub fn all() -> [AlertFamily; 9] {
        [
            AlertFamily::Flow,
            AlertFamily::ActiveMonitoring,
            AlertFamily::Host,
            AlertFamily::Interface,
            AlertFamily::Mac,
            AlertFamily::Network,
            AlertFamily::Snmp,
            AlertFamily::System,
            AlertFamily::User,
        ]
    }
}

impl Display for AlertFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
