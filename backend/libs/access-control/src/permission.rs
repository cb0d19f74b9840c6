//! Permission sets and the resolution function every gate goes through.

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::action::Action;
use crate::resource::Resource;

/// Wire key of the wildcard scope.
pub const WILDCARD: &str = "*";

/// Key of a permission set entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    /// `"*"`: every resource, every action.
    All,
    Resource(Resource),
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::All => WILDCARD,
            Scope::Resource(resource) => resource.as_str(),
        }
    }
}

impl FromStr for Scope {
    type Err = crate::error::AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == WILDCARD {
            return Ok(Scope::All);
        }
        s.parse().map(Scope::Resource)
    }
}

impl From<Resource> for Scope {
    fn from(resource: Resource) -> Self {
        Scope::Resource(resource)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-scope action grants.
pub type ActionGrants = BTreeMap<Action, bool>;

/// Mapping from scope to action grants.
///
/// A `false` entry and a missing entry mean the same thing; both deny.
/// On the wire a resource maps to an object of action booleans, while `"*"`
/// may map to any JSON value: its presence alone is the grant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    grants: BTreeMap<Scope, ActionGrants>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set with only the wildcard scope.
    pub fn wildcard() -> Self {
        let mut set = Self::new();
        set.grants.insert(Scope::All, ActionGrants::new());
        set
    }

    pub fn grant(mut self, resource: Resource, actions: &[Action]) -> Self {
        let entry = self.grants.entry(Scope::Resource(resource)).or_default();
        for action in actions {
            entry.insert(*action, true);
        }
        self
    }

    /// Record an explicit `action: false` entry.
    pub fn revoke(mut self, resource: Resource, action: Action) -> Self {
        self.grants
            .entry(Scope::Resource(resource))
            .or_default()
            .insert(action, false);
        self
    }

    pub fn insert(&mut self, scope: Scope, action: Action, allowed: bool) {
        self.grants.entry(scope).or_default().insert(action, allowed);
    }

    pub fn has_wildcard(&self) -> bool {
        self.grants.contains_key(&Scope::All)
    }

    pub fn scope(&self, scope: Scope) -> Option<&ActionGrants> {
        self.grants.get(&scope)
    }

    pub fn scopes(&self) -> impl Iterator<Item = (&Scope, &ActionGrants)> {
        self.grants.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Typed resolution against this set.
    pub fn allows(&self, resource: Resource, action: Action) -> bool {
        if self.has_wildcard() {
            return true;
        }
        self.grants
            .get(&Scope::Resource(resource))
            .and_then(|actions| actions.get(&action))
            .copied()
            .unwrap_or(false)
    }
}

/// Decide whether `permissions` grants `action` on `resource`.
///
/// `None` permissions deny everything. The presence of the wildcard scope
/// allows everything, whatever its inner grants say. `action` defaults to
/// [`Action::Read`] when omitted.
pub fn has_permission(
    permissions: Option<&PermissionSet>,
    resource: Resource,
    action: Option<Action>,
) -> bool {
    match permissions {
        Some(set) => set.allows(resource, action.unwrap_or_default()),
        None => false,
    }
}

/// String form of [`has_permission`] for callers holding raw names.
///
/// Names that are not part of the vocabulary miss, except under the wildcard.
pub fn has_permission_str(permissions: Option<&PermissionSet>, resource: &str, action: &str) -> bool {
    let Some(set) = permissions else {
        return false;
    };
    if set.has_wildcard() {
        return true;
    }
    match (resource.parse::<Resource>(), action.parse::<Action>()) {
        (Ok(resource), Ok(action)) => set.allows(resource, action),
        _ => false,
    }
}

impl Serialize for PermissionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.grants.len()))?;
        for (scope, actions) in &self.grants {
            let actions: BTreeMap<&str, bool> =
                actions.iter().map(|(a, allowed)| (a.as_str(), *allowed)).collect();
            map.serialize_entry(scope.as_str(), &actions)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PermissionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut set = PermissionSet::new();

        for (scope_key, value) in raw {
            let scope = match scope_key.parse::<Scope>() {
                Ok(scope) => scope,
                Err(_) => {
                    warn!(scope = %scope_key, "Dropping unknown resource from permission set");
                    continue;
                }
            };

            // Only the presence of the wildcard matters, whatever it maps to.
            let actions = match (scope, value) {
                (Scope::All, serde_json::Value::Object(map)) => map
                    .into_iter()
                    .filter_map(|(action, allowed)| allowed.as_bool().map(|b| (action, b)))
                    .collect(),
                (Scope::All, _) => BTreeMap::new(),
                (Scope::Resource(_), value) => BTreeMap::<String, bool>::deserialize(value)
                    .map_err(<D::Error as serde::de::Error>::custom)?,
            };

            let entry = set.grants.entry(scope).or_default();
            for (action_key, allowed) in actions {
                match action_key.parse::<Action>() {
                    Ok(action) => {
                        entry.insert(action, allowed);
                    }
                    Err(_) => {
                        warn!(scope = %scope_key, action = %action_key, "Dropping unknown action from permission set");
                    }
                }
            }
        }

        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scenario_users() -> PermissionSet {
        PermissionSet::new()
            .grant(Resource::Users, &[Action::Read])
            .revoke(Resource::Users, Action::Create)
    }

    #[test]
    fn test_absent_permissions_deny_everything() {
        for resource in Resource::ALL {
            for action in Action::ALL {
                assert!(!has_permission(None, resource, Some(action)));
            }
        }
        assert!(!has_permission_str(None, "users", "read"));
    }

    #[test]
    fn test_wildcard_presence_allows_everything() {
        // Empty inner grants still count.
        let empty_wildcard = PermissionSet::wildcard();
        let mut manage_wildcard = PermissionSet::new();
        manage_wildcard.insert(Scope::All, Action::Manage, true);

        for set in [&empty_wildcard, &manage_wildcard] {
            for resource in Resource::ALL {
                for action in Action::ALL {
                    assert!(has_permission(Some(set), resource, Some(action)));
                }
            }
            assert!(has_permission_str(Some(set), "anything", "anything"));
            assert!(has_permission_str(Some(set), "users", ""));
        }
    }

    #[test]
    fn test_wildcard_with_false_grant_still_allows() {
        let mut set = PermissionSet::new();
        set.insert(Scope::All, Action::Manage, false);
        assert!(has_permission(Some(&set), Resource::Finance, Some(Action::Delete)));
    }

    #[test]
    fn test_explicit_grants() {
        let set = scenario_users();
        assert!(has_permission(Some(&set), Resource::Users, Some(Action::Read)));
        assert!(!has_permission(Some(&set), Resource::Users, Some(Action::Create)));
        assert!(!has_permission(Some(&set), Resource::Users, Some(Action::Delete)));
    }

    #[test]
    fn test_missing_resource_denies_every_action() {
        let set = scenario_users();
        for action in Action::ALL {
            assert!(!has_permission(Some(&set), Resource::Finance, Some(action)));
        }
    }

    #[test]
    fn test_empty_set_denies() {
        let set = PermissionSet::new();
        assert!(!has_permission(Some(&set), Resource::Users, Some(Action::Read)));
    }

    #[test]
    fn test_omitted_action_defaults_to_read() {
        let readable = PermissionSet::new().grant(Resource::Rides, &[Action::Read]);
        let writable = PermissionSet::new().grant(Resource::Rides, &[Action::Update]);

        for set in [&readable, &writable] {
            assert_eq!(
                has_permission(Some(set), Resource::Rides, None),
                has_permission(Some(set), Resource::Rides, Some(Action::Read)),
            );
        }
        assert!(has_permission(Some(&readable), Resource::Rides, None));
        assert!(!has_permission(Some(&writable), Resource::Rides, None));
    }

    #[test]
    fn test_manage_is_not_expanded() {
        let set = PermissionSet::new().grant(Resource::Fleet, &[Action::Manage]);
        assert!(has_permission(Some(&set), Resource::Fleet, Some(Action::Manage)));
        assert!(!has_permission(Some(&set), Resource::Fleet, Some(Action::Update)));
    }

    #[test]
    fn test_string_form_is_exact() {
        let set = scenario_users();
        assert!(has_permission_str(Some(&set), "users", "read"));
        assert!(!has_permission_str(Some(&set), "Users", "read"));
        assert!(!has_permission_str(Some(&set), "users", ""));
        assert!(!has_permission_str(Some(&set), "users*", "read"));
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let set = scenario_users();
        let first = has_permission(Some(&set), Resource::Users, Some(Action::Read));
        let second = has_permission(Some(&set), Resource::Users, Some(Action::Read));
        assert_eq!(first, second);
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(scenario_users()).unwrap();
        assert_eq!(value, json!({ "users": { "create": false, "read": true } }));

        let parsed: PermissionSet =
            serde_json::from_value(json!({ "*": {}, "rides": { "read": true } })).unwrap();
        assert!(parsed.has_wildcard());
        assert_eq!(parsed.scope(Scope::Resource(Resource::Rides)).map(|a| a.len()), Some(1));
    }

    #[test]
    fn test_wildcard_accepts_any_json_value() {
        for value in [
            json!({ "*": true }),
            json!({ "*": null }),
            json!({ "*": { "manage": "yes" } }),
            json!({ "*": { "manage": true, "read": 1 } }),
        ] {
            let parsed: PermissionSet = serde_json::from_value(value.clone()).unwrap();
            assert!(parsed.has_wildcard(), "{value}");
            assert!(has_permission_str(Some(&parsed), "anything", "anything"), "{value}");
        }
    }

    #[test]
    fn test_resource_entries_must_be_action_booleans() {
        assert!(serde_json::from_value::<PermissionSet>(json!({ "users": true })).is_err());
        assert!(serde_json::from_value::<PermissionSet>(json!({ "users": { "read": "yes" } })).is_err());
    }

    #[test]
    fn test_unknown_json_keys_are_dropped() {
        let parsed: PermissionSet = serde_json::from_value(json!({
            "spaceships": { "read": true },
            "users": { "read": true, "launch": true }
        }))
        .unwrap();

        assert!(parsed.scope(Scope::All).is_none());
        assert_eq!(parsed.scopes().count(), 1);
        assert!(parsed.allows(Resource::Users, Action::Read));
        assert!(!has_permission_str(Some(&parsed), "spaceships", "read"));
    }
}
