//! Role-permission authorization model for the EcoGo admin platform.
//!
//! - [`RolePermissionTable`]: static role → grants table, built once per process
//! - [`has_permission`]: fail-closed resolution over a [`PermissionSet`]
//! - [`PermissionResolver`]: hydrates a [`Principal`] from identity claims,
//!   consulting per-principal overrides before the table
//! - [`Gate`]: `require_permission` / `require_role` checkpoints returning a
//!   [`GateOutcome`]

pub mod action;
pub mod error;
pub mod gate;
pub mod navigation;
pub mod overrides;
pub mod permission;
pub mod principal;
pub mod resolver;
pub mod resource;
pub mod role;
pub mod table;

pub use action::Action;
pub use error::{AccessError, Result};
pub use gate::{evaluate_permission, evaluate_role, Gate, GateOutcome, Requirement, SessionProvider};
pub use navigation::{visible_sections, DashboardSection};
pub use overrides::{InMemoryOverrideStore, OverrideStore};
pub use permission::{has_permission, has_permission_str, PermissionSet, Scope, WILDCARD};
pub use principal::Principal;
pub use resolver::PermissionResolver;
pub use resource::Resource;
pub use role::Role;
pub use table::RolePermissionTable;
