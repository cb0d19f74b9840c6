use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::overrides::OverrideStore;
use crate::principal::Principal;
use crate::table::RolePermissionTable;

/// Builds principals from identity claims.
///
/// Per-principal overrides win over the static role table; an unknown role
/// with no override ends up with an empty permission set.
#[derive(Clone)]
pub struct PermissionResolver {
    table: &'static RolePermissionTable,
    overrides: Arc<dyn OverrideStore>,
}

impl PermissionResolver {
    pub fn new(overrides: Arc<dyn OverrideStore>) -> Self {
        Self {
            table: RolePermissionTable::global(),
            overrides,
        }
    }

    pub fn table(&self) -> &'static RolePermissionTable {
        self.table
    }

    pub fn overrides(&self) -> &Arc<dyn OverrideStore> {
        &self.overrides
    }

    pub async fn hydrate(&self, id: &str, email: &str, role: &str) -> Result<Principal> {
        let permissions = match self.overrides.get(id).await? {
            Some(set) => {
                debug!(principal = %id, "Using permission override");
                set
            }
            None => {
                let set = self.table.permissions_for(role);
                if set.is_empty() {
                    debug!(principal = %id, role = %role, "Role has no grants");
                }
                set
            }
        };

        Ok(Principal::new(id, email, role, permissions))
    }
}
