use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AccessError;

/// Protected domain area. Resources are flat: there is no nesting between
/// them and a grant on one never implies a grant on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Users,
    Fleet,
    Finance,
    Settings,
    Reports,
    Support,
    Marketing,
    Operations,
    Hr,
    It,
    Drivers,
    Riders,
    Rides,
    Payments,
    Dashboard,
}

impl Resource {
    pub const ALL: [Resource; 15] = [
        Resource::Users,
        Resource::Fleet,
        Resource::Finance,
        Resource::Settings,
        Resource::Reports,
        Resource::Support,
        Resource::Marketing,
        Resource::Operations,
        Resource::Hr,
        Resource::It,
        Resource::Drivers,
        Resource::Riders,
        Resource::Rides,
        Resource::Payments,
        Resource::Dashboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Fleet => "fleet",
            Resource::Finance => "finance",
            Resource::Settings => "settings",
            Resource::Reports => "reports",
            Resource::Support => "support",
            Resource::Marketing => "marketing",
            Resource::Operations => "operations",
            Resource::Hr => "hr",
            Resource::It => "it",
            Resource::Drivers => "drivers",
            Resource::Riders => "riders",
            Resource::Rides => "rides",
            Resource::Payments => "payments",
            Resource::Dashboard => "dashboard",
        }
    }
}

impl FromStr for Resource {
    type Err = AccessError;

    // Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| AccessError::UnknownResource(s.to_string()))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
