use serde::Serialize;

use crate::action::Action;
use crate::permission::PermissionSet;
use crate::resource::Resource;

/// Top-level dashboard area shown in the admin shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardSection {
    Overview,
    Users,
    Fleet,
    Rides,
    Finance,
    Hr,
    It,
    Support,
    Reports,
    Settings,
}

impl DashboardSection {
    pub const ALL: [DashboardSection; 10] = [
        DashboardSection::Overview,
        DashboardSection::Users,
        DashboardSection::Fleet,
        DashboardSection::Rides,
        DashboardSection::Finance,
        DashboardSection::Hr,
        DashboardSection::It,
        DashboardSection::Support,
        DashboardSection::Reports,
        DashboardSection::Settings,
    ];

    /// Grant needed to open the section.
    pub fn requirement(&self) -> (Resource, Action) {
        match self {
            DashboardSection::Overview => (Resource::Dashboard, Action::View),
            DashboardSection::Users => (Resource::Users, Action::Read),
            DashboardSection::Fleet => (Resource::Fleet, Action::Read),
            DashboardSection::Rides => (Resource::Rides, Action::Read),
            DashboardSection::Finance => (Resource::Finance, Action::Read),
            DashboardSection::Hr => (Resource::Hr, Action::Read),
            DashboardSection::It => (Resource::It, Action::Read),
            DashboardSection::Support => (Resource::Support, Action::Read),
            DashboardSection::Reports => (Resource::Reports, Action::Read),
            DashboardSection::Settings => (Resource::Settings, Action::Read),
        }
    }
}

pub fn visible_sections(permissions: &PermissionSet) -> Vec<DashboardSection> {
    DashboardSection::ALL
        .into_iter()
        .filter(|section| {
            let (resource, action) = section.requirement();
            permissions.allows(resource, action)
        })
        .collect()
}
