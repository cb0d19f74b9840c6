//! Enforcement checkpoint for protected entry points.
//!
//! The gate decides; the caller maps the outcome to whatever its transport
//! needs (a redirect, a 401/403, ...). A `Denied` or `Unauthenticated`
//! outcome must stop the caller.

use async_trait::async_trait;
use std::fmt;
use tracing::{error, warn};

use crate::action::Action;
use crate::error::AccessError;
use crate::principal::Principal;
use crate::resource::Resource;
use crate::role::Role;

/// Supplies the principal behind the current request.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_principal(&self) -> anyhow::Result<Option<Principal>>;
}

/// What a denied principal was missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Permission { resource: Resource, action: Action },
    AnyRole(Vec<Role>),
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Permission { resource, action } => write!(f, "{resource}.{action}"),
            Requirement::AnyRole(roles) => {
                let names: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
                write!(f, "role in [{}]", names.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Allowed(Principal),
    Denied {
        principal_id: String,
        role: String,
        requirement: Requirement,
    },
    Unauthenticated,
}

impl GateOutcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateOutcome::Allowed(_))
    }

    pub fn into_result(self) -> Result<Principal, AccessError> {
        match self {
            GateOutcome::Allowed(principal) => Ok(principal),
            GateOutcome::Denied {
                principal_id,
                requirement,
                ..
            } => Err(AccessError::Forbidden {
                principal: principal_id,
                requirement: requirement.to_string(),
            }),
            GateOutcome::Unauthenticated => Err(AccessError::Unauthenticated),
        }
    }
}

/// Permission check for an already-resolved principal.
///
/// `action` defaults to [`Action::Read`] when omitted.
pub fn evaluate_permission(
    principal: Option<Principal>,
    resource: Resource,
    action: Option<Action>,
) -> GateOutcome {
    let Some(principal) = principal else {
        return GateOutcome::Unauthenticated;
    };
    let action = action.unwrap_or_default();

    if principal.can(resource, action) {
        return GateOutcome::Allowed(principal);
    }

    warn!(
        principal = %principal.id,
        role = %principal.role,
        resource = %resource,
        action = %action,
        "Permission denied"
    );
    GateOutcome::Denied {
        principal_id: principal.id,
        role: principal.role,
        requirement: Requirement::Permission { resource, action },
    }
}

/// Role allow-list check, independent of the permission table.
pub fn evaluate_role(principal: Option<Principal>, allowed: &[Role]) -> GateOutcome {
    let Some(principal) = principal else {
        return GateOutcome::Unauthenticated;
    };

    if principal.has_any_role(allowed) {
        return GateOutcome::Allowed(principal);
    }

    let requirement = Requirement::AnyRole(allowed.to_vec());
    warn!(
        principal = %principal.id,
        role = %principal.role,
        requirement = %requirement,
        "Role denied"
    );
    GateOutcome::Denied {
        principal_id: principal.id,
        role: principal.role,
        requirement,
    }
}

pub struct Gate<S> {
    session: S,
}

impl<S: SessionProvider> Gate<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }

    /// Any authenticated principal passes, whatever its grants.
    pub async fn require_session(&self) -> GateOutcome {
        match self.resolve().await {
            Some(principal) => GateOutcome::Allowed(principal),
            None => GateOutcome::Unauthenticated,
        }
    }

    pub async fn require_permission(&self, resource: Resource, action: Option<Action>) -> GateOutcome {
        evaluate_permission(self.resolve().await, resource, action)
    }

    pub async fn require_role(&self, allowed: &[Role]) -> GateOutcome {
        evaluate_role(self.resolve().await, allowed)
    }

    // A failed session lookup counts as no session.
    async fn resolve(&self) -> Option<Principal> {
        match self.session.current_principal().await {
            Ok(principal) => principal,
            Err(e) => {
                error!("Session lookup failed: {:?}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::PermissionSet;
    use crate::table::RolePermissionTable;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture<T>(f: impl FnOnce() -> T) -> (T, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();

        let result = tracing::subscriber::with_default(subscriber, f);
        (result, logs.contents())
    }

    struct FixedSession(Option<Principal>);

    #[async_trait]
    impl SessionProvider for FixedSession {
        async fn current_principal(&self) -> anyhow::Result<Option<Principal>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenSession;

    #[async_trait]
    impl SessionProvider for BrokenSession {
        async fn current_principal(&self) -> anyhow::Result<Option<Principal>> {
            Err(anyhow::anyhow!("identity provider unreachable"))
        }
    }

    fn principal(role: &str) -> Principal {
        Principal::new(
            format!("{role}-1"),
            format!("{role}@ecogo.app"),
            role,
            RolePermissionTable::global().permissions_for(role),
        )
    }

    #[tokio::test]
    async fn test_no_session_is_unauthenticated() {
        let gate = Gate::new(FixedSession(None));
        assert_eq!(
            gate.require_permission(Resource::Users, Some(Action::Read)).await,
            GateOutcome::Unauthenticated
        );
        assert_eq!(gate.require_role(&Role::ALL).await, GateOutcome::Unauthenticated);
    }

    #[tokio::test]
    async fn test_require_session_admits_unknown_roles() {
        let stale = principal("dispatcher");
        let gate = Gate::new(FixedSession(Some(stale.clone())));
        assert_eq!(gate.require_session().await, GateOutcome::Allowed(stale));

        let gate = Gate::new(FixedSession(None));
        assert_eq!(gate.require_session().await, GateOutcome::Unauthenticated);
    }

    #[tokio::test]
    async fn test_session_error_is_unauthenticated() {
        let gate = Gate::new(BrokenSession);
        let outcome = gate.require_permission(Resource::Users, None).await;
        assert_eq!(outcome, GateOutcome::Unauthenticated);
    }

    #[tokio::test]
    async fn test_allowed_returns_principal() {
        let finance = principal("finance");
        let gate = Gate::new(FixedSession(Some(finance.clone())));

        let outcome = gate.require_permission(Resource::Payments, Some(Action::Refund)).await;
        assert_eq!(outcome, GateOutcome::Allowed(finance));
    }

    #[tokio::test]
    async fn test_denied_names_the_requirement() {
        let gate = Gate::new(FixedSession(Some(principal("driver"))));

        let outcome = gate.require_permission(Resource::Finance, None).await;
        assert_eq!(
            outcome,
            GateOutcome::Denied {
                principal_id: "driver-1".to_string(),
                role: "driver".to_string(),
                requirement: Requirement::Permission {
                    resource: Resource::Finance,
                    action: Action::Read,
                },
            }
        );

        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.to_string(), "Access denied for driver-1: requires finance.read");
    }

    #[tokio::test]
    async fn test_require_role_ignores_permission_table() {
        // A wildcard set does not get an operator past the allow-list.
        let mut operator = principal("operator");
        operator.permissions = PermissionSet::wildcard();
        let gate = Gate::new(FixedSession(Some(operator)));
        assert!(!gate.require_role(&[Role::SuperAdmin, Role::Admin]).await.is_allowed());

        // Admin with an empty set still passes the role gate.
        let mut admin = principal("admin");
        admin.permissions = PermissionSet::new();
        let gate = Gate::new(FixedSession(Some(admin)));
        assert!(gate.require_role(&[Role::SuperAdmin, Role::Admin]).await.is_allowed());
    }

    #[test]
    fn test_unknown_role_is_denied_everything() {
        let stale = principal("dispatcher");
        for resource in Resource::ALL {
            assert!(!evaluate_permission(Some(stale.clone()), resource, None).is_allowed());
        }
        assert!(!evaluate_role(Some(stale), &Role::ALL).is_allowed());
    }

    #[test]
    fn test_permission_denial_is_logged() {
        let (outcome, logs) = capture(|| {
            evaluate_permission(Some(principal("driver")), Resource::Finance, Some(Action::Read))
        });

        assert!(!outcome.is_allowed());
        assert!(logs.contains("Permission denied"), "{logs}");
        assert!(logs.contains("driver-1"), "{logs}");
        assert!(logs.contains("finance"), "{logs}");
        assert!(logs.contains("read"), "{logs}");
    }

    #[test]
    fn test_role_denial_is_logged() {
        let (outcome, logs) = capture(|| {
            evaluate_role(Some(principal("driver")), &[Role::SuperAdmin, Role::Admin])
        });

        assert!(!outcome.is_allowed());
        assert!(logs.contains("Role denied"), "{logs}");
        assert!(logs.contains("driver-1"), "{logs}");
        assert!(logs.contains("super_admin"), "{logs}");
    }

    #[test]
    fn test_allowed_is_not_logged() {
        let (outcome, logs) = capture(|| {
            evaluate_permission(Some(principal("driver")), Resource::Fleet, None)
        });

        assert!(outcome.is_allowed());
        assert!(logs.is_empty(), "{logs}");
    }

    #[test]
    fn test_into_result_unauthenticated() {
        let err = GateOutcome::Unauthenticated.into_result().unwrap_err();
        assert!(matches!(err, AccessError::Unauthenticated));
    }

    #[test]
    fn test_role_requirement_display() {
        let requirement = Requirement::AnyRole(vec![Role::SuperAdmin, Role::Admin]);
        assert_eq!(requirement.to_string(), "role in [super_admin, admin]");
    }
}
