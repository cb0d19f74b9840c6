//! Per-principal permission overrides.
//!
//! An override replaces the role's static grants for one principal. The
//! static table is never touched.

use anyhow::Context;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::permission::PermissionSet;

#[async_trait]
pub trait OverrideStore: Send + Sync {
    async fn get(&self, principal_id: &str) -> anyhow::Result<Option<PermissionSet>>;

    async fn put(&self, principal_id: &str, permissions: PermissionSet) -> anyhow::Result<()>;

    /// Returns whether an override was present.
    async fn remove(&self, principal_id: &str) -> anyhow::Result<bool>;

    async fn list(&self) -> anyhow::Result<Vec<(String, PermissionSet)>>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryOverrideStore {
    entries: Arc<RwLock<HashMap<String, PermissionSet>>>,
}

impl InMemoryOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: HashMap<String, PermissionSet>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Seed from a JSON object of `principal_id -> permission set`.
    pub async fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read overrides file {}", path.display()))?;
        let entries: HashMap<String, PermissionSet> = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid overrides file {}", path.display()))?;

        info!(path = %path.display(), count = entries.len(), "Loaded permission overrides");
        Ok(Self::with_entries(entries))
    }
}

#[async_trait]
impl OverrideStore for InMemoryOverrideStore {
    async fn get(&self, principal_id: &str) -> anyhow::Result<Option<PermissionSet>> {
        Ok(self.entries.read().await.get(principal_id).cloned())
    }

    async fn put(&self, principal_id: &str, permissions: PermissionSet) -> anyhow::Result<()> {
        self.entries
            .write()
            .await
            .insert(principal_id.to_string(), permissions);
        Ok(())
    }

    async fn remove(&self, principal_id: &str) -> anyhow::Result<bool> {
        Ok(self.entries.write().await.remove(principal_id).is_some())
    }

    async fn list(&self) -> anyhow::Result<Vec<(String, PermissionSet)>> {
        let mut entries: Vec<_> = self
            .entries
            .read()
            .await
            .iter()
            .map(|(id, set)| (id.clone(), set.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }
}
