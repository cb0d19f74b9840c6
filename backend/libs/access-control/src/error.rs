use thiserror::Error;

/// Errors surfaced by the access-control layer.
///
/// Permission resolution itself never fails; these come from parsing
/// vocabulary strings, from the gate, and from the override store.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Access denied for {principal}: requires {requirement}")]
    Forbidden {
        principal: String,
        requirement: String,
    },

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Override source error: {0}")]
    OverrideSource(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AccessError>;
