//! Static role → permission table.
//!
//! Built once on first use and never mutated. Each role lists its full grant
//! set; there is no inheritance between roles.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use crate::action::Action;
use crate::permission::PermissionSet;
use crate::resource::Resource;
use crate::role::Role;

use crate::action::Action::{Create, Delete, Manage, Read, Refund, Update, View};

static ROLE_TABLE: Lazy<RolePermissionTable> = Lazy::new(RolePermissionTable::build);

#[derive(Debug)]
pub struct RolePermissionTable {
    roles: BTreeMap<Role, PermissionSet>,
}

impl RolePermissionTable {
    /// Process-wide table.
    pub fn global() -> &'static RolePermissionTable {
        &ROLE_TABLE
    }

    pub fn get(&self, role: Role) -> Option<&PermissionSet> {
        self.roles.get(&role)
    }

    /// Grants for a raw role name. Unknown names get an empty set.
    pub fn permissions_for(&self, role: &str) -> PermissionSet {
        role.parse::<Role>()
            .ok()
            .and_then(|role| self.get(role))
            .cloned()
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Role, &PermissionSet)> {
        self.roles.iter()
    }

    fn build() -> Self {
        let roles = Role::ALL
            .into_iter()
            .map(|role| (role, grants_for(role)))
            .collect();
        Self { roles }
    }
}

fn grants_for(role: Role) -> PermissionSet {
    match role {
        // admin and super_admin are deliberately identical
        Role::SuperAdmin | Role::Admin => full_access(),
        Role::Operator => PermissionSet::new()
            .grant(Resource::Operations, &[Create, Read, Update, Delete, Manage])
            .grant(Resource::Fleet, &[Create, Read, Update, Delete])
            .grant(Resource::Drivers, &[Create, Read, Update])
            .grant(Resource::Riders, &[Read, Update])
            .grant(Resource::Rides, &[Create, Read, Update])
            .grant(Resource::Support, &[Create, Read, Update])
            .grant(Resource::Reports, &[Read])
            .grant(Resource::Dashboard, &[View]),
        Role::Driver => PermissionSet::new()
            .grant(Resource::Fleet, &[Read])
            .grant(Resource::Operations, &[Read])
            .grant(Resource::Support, &[Create])
            .grant(Resource::Hr, &[Read]),
        Role::Rider => PermissionSet::new()
            .grant(Resource::Rides, &[Create, Read])
            .grant(Resource::Support, &[Create, Read])
            .grant(Resource::Payments, &[Read])
            .grant(Resource::Dashboard, &[View]),
        Role::Finance => PermissionSet::new()
            .grant(Resource::Finance, &[Create, Read, Update, Delete, Manage])
            .grant(Resource::Payments, &[Read, Update, Refund])
            .grant(Resource::Reports, &[Create, Read])
            .grant(Resource::Rides, &[Read])
            .grant(Resource::Dashboard, &[View]),
        Role::Hr => PermissionSet::new()
            .grant(Resource::Hr, &[Create, Read, Update, Delete, Manage])
            .grant(Resource::Users, &[Read])
            .grant(Resource::Drivers, &[Read, Update])
            .grant(Resource::Reports, &[Read])
            .grant(Resource::Dashboard, &[View]),
        Role::ItSupport => PermissionSet::new()
            .grant(Resource::It, &[Create, Read, Update, Delete, Manage])
            .grant(Resource::Settings, &[Read, Update])
            .grant(Resource::Users, &[Read, Update])
            .grant(Resource::Support, &[Read, Update])
            .grant(Resource::Dashboard, &[View]),
        Role::Support => PermissionSet::new()
            .grant(Resource::Support, &[Create, Read, Update, Manage])
            .grant(Resource::Riders, &[Read])
            .grant(Resource::Drivers, &[Read])
            .grant(Resource::Rides, &[Read])
            .grant(Resource::Dashboard, &[View]),
    }
}

fn full_access() -> PermissionSet {
    Resource::ALL.into_iter().fold(PermissionSet::new(), |set, resource| {
        let set = set.grant(resource, &Action::CRUD).grant(resource, &[Manage, View]);
        match resource {
            Resource::Payments | Resource::Finance => set.grant(resource, &[Refund]),
            _ => set,
        }
    })
}
