//! Brand list coordinator.
//!
//! Locally a brand is just its name; remotely it is a row with a server id.
//! The name-to-id mapping is never stored and is re-derived from the remote
//! brand listing whenever an operation needs it.

use std::collections::BTreeMap;

use crate::cache::keys;
use crate::errors::RemoteResult;
use crate::models::{BrandFields, BrandWorkspaceState, Document, RemoteBrand, SearchSettings};
use crate::remote::{find_brand, RemoteStore};
use crate::settings::Settings;

use super::outcome::remote_failed;
use super::{DeletePolicy, LocalOnlyReason, StorageContext, SyncReport};

/// Coordinator for the brand name list.
#[derive(Debug, Clone, Copy)]
pub struct BrandSync {
    delete_policy: DeletePolicy,
}

impl Default for BrandSync {
    fn default() -> Self {
        Self {
            delete_policy: DeletePolicy::Soft,
        }
    }
}

impl BrandSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delete_policy(delete_policy: DeletePolicy) -> Self {
        Self { delete_policy }
    }

    /// Brand names as currently cached.
    pub fn cached(&self, ctx: &StorageContext) -> Vec<String> {
        ctx.cache().read_or_default(keys::BRANDS)
    }

    /// List brands, mirroring the remote listing into the cache when possible.
    pub async fn list(&self, ctx: &StorageContext) -> SyncReport<Vec<String>> {
        let remote = match ctx.connect().await {
            Ok(remote) => remote,
            Err(reason) => return SyncReport::local_only(self.cached(ctx), reason),
        };

        match remote.brands.list(None).await {
            Ok(rows) => {
                let names = brand_names(rows);
                ctx.cache().write(keys::BRANDS, &names);
                tracing::debug!("Mirrored {} remote brands into cache", names.len());
                SyncReport::synced(names)
            }
            Err(err) => {
                SyncReport::local_only(self.cached(ctx), remote_failed("brands.list", &err))
            }
        }
    }

    /// Add a brand. Creating a name that already exists changes nothing locally
    /// and only makes sure the remote store has it too.
    pub async fn create(&self, ctx: &StorageContext, name: &str) -> SyncReport<Vec<String>> {
        let name = name.trim();
        if name.is_empty() {
            return SyncReport::local_only(
                self.cached(ctx),
                LocalOnlyReason::InvalidInput("brand name is empty".to_string()),
            );
        }

        let cache = ctx.cache();
        let mut names = self.cached(ctx);
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
            cache.write(keys::BRANDS, &names);
        }

        let mut workspaces: BTreeMap<String, BrandWorkspaceState> =
            cache.read_or_default(keys::WORKSPACES);
        if !workspaces.contains_key(name) {
            workspaces.insert(name.to_string(), BrandWorkspaceState::default());
            cache.write(keys::WORKSPACES, &workspaces);
        }

        let remote = match ctx.connect().await {
            Ok(remote) => remote,
            Err(reason) => return SyncReport::local_only(names, reason),
        };

        match ensure_remote_brand(remote, name, None).await {
            Ok(_) => SyncReport::synced(self.cached(ctx)),
            Err(err) => {
                SyncReport::local_only(self.cached(ctx), remote_failed("brands.create", &err))
            }
        }
    }

    /// Rename a brand in place, carrying its workspace and documents along.
    ///
    /// When the old name has no remote counterpart the brand is created
    /// remotely under the new name.
    pub async fn rename(
        &self,
        ctx: &StorageContext,
        from: &str,
        to: &str,
    ) -> SyncReport<Vec<String>> {
        let to = to.trim();
        let cache = ctx.cache();
        let mut names = self.cached(ctx);

        let Some(position) = names.iter().position(|n| n == from) else {
            return SyncReport::local_only(
                names,
                LocalOnlyReason::InvalidInput(format!("brand {} is not cached", from)),
            );
        };
        if to.is_empty() || (to != from && names.iter().any(|n| n == to)) {
            return SyncReport::local_only(
                names,
                LocalOnlyReason::InvalidInput(format!("brand name {:?} is unavailable", to)),
            );
        }
        if to == from {
            return SyncReport::synced(names);
        }

        names[position] = to.to_string();
        cache.write(keys::BRANDS, &names);

        let mut workspaces: BTreeMap<String, BrandWorkspaceState> =
            cache.read_or_default(keys::WORKSPACES);
        if let Some(state) = workspaces.remove(from) {
            workspaces.insert(to.to_string(), state);
            cache.write(keys::WORKSPACES, &workspaces);
        }

        let documents: Vec<Document> = cache.read_or_default(&keys::documents(from));
        cache.remove(&keys::documents(from));
        if !documents.is_empty() {
            cache.write(&keys::documents(to), &documents);
        }

        let settings = Settings::new(cache);
        if settings.last_brand().as_deref() == Some(from) {
            settings.set_last_brand(Some(to));
        }

        let remote = match ctx.connect().await {
            Ok(remote) => remote,
            Err(reason) => return SyncReport::local_only(names, reason),
        };

        let result = match find_brand(remote, from).await {
            Ok(Some(existing)) => {
                let fields = BrandFields {
                    name: to.to_string(),
                    ..BrandFields::from(&existing)
                };
                remote
                    .brands
                    .update(&existing.id, fields)
                    .await
                    .map_err(|err| remote_failed("brands.update", &err))
            }
            Ok(None) => ensure_remote_brand(remote, to, None)
                .await
                .map_err(|err| remote_failed("brands.create", &err)),
            Err(err) => Err(remote_failed("brands.list", &err)),
        };

        match result {
            Ok(_) => SyncReport::synced(self.cached(ctx)),
            Err(reason) => SyncReport::local_only(self.cached(ctx), reason),
        }
    }

    /// Remove a brand together with its cached workspace and documents.
    ///
    /// The local removal stands even if the remote delete fails.
    pub async fn delete(&self, ctx: &StorageContext, name: &str) -> SyncReport<Vec<String>> {
        let cache = ctx.cache();

        let mut names = self.cached(ctx);
        names.retain(|n| n != name);
        cache.write(keys::BRANDS, &names);

        let mut workspaces: BTreeMap<String, BrandWorkspaceState> =
            cache.read_or_default(keys::WORKSPACES);
        if workspaces.remove(name).is_some() {
            cache.write(keys::WORKSPACES, &workspaces);
        }
        cache.remove(&keys::documents(name));

        let settings = Settings::new(cache);
        if settings.last_brand().as_deref() == Some(name) {
            settings.set_last_brand(None);
        }

        let remote = match ctx.connect().await {
            Ok(remote) => remote,
            Err(reason) => return SyncReport::local_only(names, reason),
        };

        match find_brand(remote, name).await {
            Ok(Some(existing)) => {
                match self.delete_policy.apply(remote.brands.as_ref(), &existing.id).await {
                    Ok(()) => SyncReport::synced(names),
                    Err(err) => SyncReport::local_only(names, remote_failed("brands.delete", &err)),
                }
            }
            Ok(None) => SyncReport::synced(names),
            Err(err) => SyncReport::local_only(names, remote_failed("brands.list", &err)),
        }
    }
}

fn brand_names(rows: Vec<RemoteBrand>) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(rows.len());
    for row in rows.into_iter().filter(|b| b.is_active) {
        if !names.contains(&row.name) {
            names.push(row.name);
        }
    }
    names
}

/// Find the remote brand called `name`, creating it when missing.
pub(crate) async fn ensure_remote_brand(
    remote: &RemoteStore,
    name: &str,
    search_settings: Option<SearchSettings>,
) -> RemoteResult<RemoteBrand> {
    if let Some(existing) = find_brand(remote, name).await? {
        return Ok(existing);
    }

    let brand = remote
        .brands
        .create(
            None,
            BrandFields {
                search_settings,
                ..BrandFields::named(name)
            },
        )
        .await?;
    tracing::info!(brand = %brand.name, id = %brand.id, "Created remote brand");
    Ok(brand)
}

/// Resolve the remote id of brand `name` without creating it.
pub(crate) async fn resolve_brand_id(
    remote: &RemoteStore,
    name: &str,
) -> Result<String, LocalOnlyReason> {
    match find_brand(remote, name).await {
        Ok(Some(brand)) => Ok(brand.id),
        Ok(None) => {
            tracing::debug!(brand = name, "Brand has no remote counterpart yet");
            Err(LocalOnlyReason::NoRemoteParent(name.to_string()))
        }
        Err(err) => Err(remote_failed("brands.list", &err)),
    }
}
