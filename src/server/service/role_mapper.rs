//! Remote role mapper.
//!
//! Translates local group and state names into remote role IDs, creating missing remote roles
//! on demand. Resolutions within one remote namespace (a Discord guild, a TeamSpeak virtual
//! server) are serialized by a per-namespace async lock and share a directory cache, so two
//! concurrent reconciliations needing the same new role create it exactly once.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use dioxus_logger::tracing;

use crate::server::{
    error::Error,
    model::service::{RemoteRole, RoleId},
};

/// Default lifetime of a namespace's cached role directory.
pub const DEFAULT_ROLE_CACHE_TTL: Duration = Duration::from_secs(300);

/// A remote namespace roles can be listed in and created in.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    /// Identifier of the namespace, unique across services.
    fn namespace(&self) -> String;

    /// Longest role name the remote accepts, in characters.
    fn max_name_len(&self) -> usize;

    async fn list_roles(&self) -> Result<Vec<RemoteRole>, Error>;

    async fn create_role(&self, name: &str) -> Result<RemoteRole, Error>;
}

/// Normalizes a role name for comparison: trims, collapses internal whitespace and lowercases.
pub fn normalize_role_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Name a local role is created with remotely: whitespace collapsed and truncated to `max_len`
/// characters.
pub fn remote_role_name(name: &str, max_len: usize) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(max_len)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Result of a role resolution.
#[derive(Debug, Clone, Default)]
pub struct RoleSnapshot {
    ids: HashMap<String, RoleId>,
    max_name_len: usize,
    /// Every role listed in the namespace, managed roles included.
    pub roles: Vec<RemoteRole>,
}

impl RoleSnapshot {
    fn new(roles: Vec<RemoteRole>, max_name_len: usize) -> Self {
        let mut ids = HashMap::new();

        // First matching role wins when the remote holds duplicates
        for role in roles.iter().filter(|r| !r.managed) {
            ids.entry(normalize_role_name(&role.name)).or_insert(role.id);
        }

        Self {
            ids,
            max_name_len,
            roles,
        }
    }

    /// Remote role ID for a local name, if the namespace holds a matching unmanaged role.
    pub fn id_for(&self, local_name: &str) -> Option<RoleId> {
        let key = normalize_role_name(&remote_role_name(local_name, self.max_name_len));
        self.ids.get(&key).copied()
    }
}

#[derive(Default)]
struct NamespaceCache {
    roles: Vec<RemoteRole>,
    fetched_at: Option<Instant>,
}

impl NamespaceCache {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.is_some_and(|at| at.elapsed() < ttl)
    }

    fn contains(&self, key: &str) -> bool {
        self.roles
            .iter()
            .any(|r| !r.managed && normalize_role_name(&r.name) == key)
    }
}

/// Shared role mapper. Clones share locks and cache.
#[derive(Clone)]
pub struct RoleMapper {
    ttl: Duration,
    namespaces: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<NamespaceCache>>>>>,
}

impl RoleMapper {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            namespaces: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn namespace_lock(&self, namespace: &str) -> Arc<tokio::sync::Mutex<NamespaceCache>> {
        let mut namespaces = self
            .namespaces
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        namespaces.entry(namespace.to_string()).or_default().clone()
    }

    /// Drops the cached directory of a namespace, forcing the next resolution to re-list.
    pub async fn invalidate(&self, namespace: &str) {
        let lock = self.namespace_lock(namespace);
        let mut cache = lock.lock().await;
        cache.fetched_at = None;
    }

    /// Resolves local role names against a remote namespace
    ///
    /// Every name in `create` that has no remote counterpart is created. Before the first
    /// creation the directory is re-listed once, so roles created by another process since
    /// the cache was filled are reused. A creation answered with a conflict re-lists the
    /// directory and uses the existing role.
    ///
    /// # Arguments
    /// - `directory` - Remote namespace to resolve against
    /// - `create` - Local names that must exist remotely
    pub async fn resolve<D>(&self, directory: &D, create: &[String]) -> Result<RoleSnapshot, Error>
    where
        D: RoleDirectory + ?Sized,
    {
        let namespace = directory.namespace();
        let max_len = directory.max_name_len();
        let lock = self.namespace_lock(&namespace);
        let mut cache = lock.lock().await;

        let mut relisted = false;
        if !cache.is_fresh(self.ttl) {
            Self::relist(directory, &mut cache).await?;
            relisted = true;
        }

        for local_name in create {
            let remote_name = remote_role_name(local_name, max_len);
            if remote_name.is_empty() {
                continue;
            }

            let key = normalize_role_name(&remote_name);
            if cache.contains(&key) {
                continue;
            }

            if !relisted {
                Self::relist(directory, &mut cache).await?;
                relisted = true;

                if cache.contains(&key) {
                    continue;
                }
            }

            match directory.create_role(&remote_name).await {
                Ok(role) => {
                    tracing::info!(
                        "Created remote role \"{}\" ({}) in {}",
                        role.name,
                        role.id,
                        namespace
                    );
                    cache.roles.push(role);
                }
                Err(Error::RemoteError(e)) if e.is_conflict() => {
                    tracing::debug!(
                        "Remote role \"{}\" already exists in {}, re-listing",
                        remote_name,
                        namespace
                    );
                    Self::relist(directory, &mut cache).await?;

                    if !cache.contains(&key) {
                        return Err(Error::RemoteError(e));
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Ok(RoleSnapshot::new(cache.roles.clone(), max_len))
    }

    async fn relist<D>(directory: &D, cache: &mut NamespaceCache) -> Result<(), Error>
    where
        D: RoleDirectory + ?Sized,
    {
        cache.roles = directory.list_roles().await?;
        cache.fetched_at = Some(Instant::now());

        Ok(())
    }
}

impl Default for RoleMapper {
    fn default() -> Self {
        Self::new(DEFAULT_ROLE_CACHE_TTL)
    }
}
