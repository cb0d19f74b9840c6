use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::permission::{has_permission, PermissionSet};
use crate::resource::Resource;
use crate::role::Role;

/// Authenticated actor with an already-hydrated permission set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
    /// Role name as issued by the identity provider. May be stale or unknown.
    pub role: String,
    #[serde(default)]
    pub permissions: PermissionSet,
}

impl Principal {
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
        permissions: PermissionSet,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role: role.into(),
            permissions,
        }
    }

    /// Typed role, `None` when the stored name is not a known role.
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }

    pub fn can(&self, resource: Resource, action: Action) -> bool {
        has_permission(Some(&self.permissions), resource, Some(action))
    }

    pub fn has_any_role(&self, allowed: &[Role]) -> bool {
        self.role().is_some_and(|role| allowed.contains(&role))
    }
}
