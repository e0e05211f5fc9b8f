//! Brand workspace coordinator.
//!
//! Workspace states are cached as one map keyed by brand name. A full
//! resync rebuilds that map from several remote collections and replaces
//! the cache entry in one write.

use std::collections::BTreeMap;

use crate::cache::keys;
use crate::errors::RemoteResult;
use crate::models::{
    normalize_text, BrandFields, BrandWorkspaceState, Campaign, KeywordRecord, RemoteCampaign,
    RemoteKeyword,
};
use crate::remote::{find_remote, RemoteStore};

use super::brands::{ensure_remote_brand, resolve_brand_id};
use super::outcome::remote_failed;
use super::{PushReconciler, PushSummary, StorageContext, SyncReport};

/// Workspace states by brand name.
pub type WorkspaceMap = BTreeMap<String, BrandWorkspaceState>;

/// Coordinator for brand workspace state.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkspaceSync;

impl WorkspaceSync {
    pub fn new() -> Self {
        Self
    }

    pub fn cached(&self, ctx: &StorageContext) -> WorkspaceMap {
        ctx.cache().read_or_default(keys::WORKSPACES)
    }

    /// Cached state of one brand, empty when none is cached.
    pub fn get(&self, ctx: &StorageContext, brand: &str) -> BrandWorkspaceState {
        self.cached(ctx).remove(brand).unwrap_or_default()
    }

    /// Rebuild every brand's workspace from the remote store.
    ///
    /// This costs one brand listing, then per brand one keyword listing and
    /// one campaign listing, plus one ad group listing per campaign, all
    /// sequential. Fine for tens of brands; it does not batch.
    ///
    /// Session-only fields come back empty.
    pub async fn get_all(&self, ctx: &StorageContext) -> SyncReport<WorkspaceMap> {
        let remote = match ctx.connect().await {
            Ok(remote) => remote,
            Err(reason) => return SyncReport::local_only(self.cached(ctx), reason),
        };

        match rebuild(remote).await {
            Ok(states) => {
                ctx.cache().write(keys::WORKSPACES, &states);
                tracing::info!("Rebuilt {} brand workspaces from remote", states.len());
                SyncReport::synced(states)
            }
            Err(err) => {
                SyncReport::local_only(self.cached(ctx), remote_failed("workspace.rebuild", &err))
            }
        }
    }

    /// Replace a brand's workspace state wholesale, then push it.
    pub async fn save(
        &self,
        ctx: &StorageContext,
        brand: &str,
        state: BrandWorkspaceState,
    ) -> SyncReport<PushSummary> {
        self.modify(ctx, brand, |current| *current = state);
        self.push(ctx, brand).await
    }

    /// Merge keywords into a brand's workspace by normalized text, then push.
    pub async fn add_keywords(
        &self,
        ctx: &StorageContext,
        brand: &str,
        keywords: Vec<KeywordRecord>,
    ) -> SyncReport<PushSummary> {
        let added = self.modify(ctx, brand, |state| state.merge_keywords(keywords));
        tracing::debug!(brand, added, "Merged keywords into workspace");
        self.push(ctx, brand).await
    }

    /// Remove a keyword locally, then delete its remote record.
    ///
    /// The value says whether a cached keyword was removed.
    pub async fn remove_keyword(
        &self,
        ctx: &StorageContext,
        brand: &str,
        text: &str,
    ) -> SyncReport<bool> {
        let removed = self
            .modify_existing(ctx, brand, |state| state.remove_keyword(text))
            .unwrap_or(false);

        let remote = match ctx.connect().await {
            Ok(remote) => remote,
            Err(reason) => return SyncReport::local_only(removed, reason),
        };
        let brand_id = match resolve_brand_id(remote, brand).await {
            Ok(id) => id,
            Err(reason) => return SyncReport::local_only(removed, reason),
        };

        let wanted = normalize_text(text);
        let found = find_remote(
            remote.keywords.as_ref(),
            Some(brand_id.as_str()),
            |row: &RemoteKeyword| normalize_text(&row.keyword) == wanted,
        )
        .await;

        match found {
            Ok(Some(row)) => match remote.keywords.delete(&row.id).await {
                Ok(()) => SyncReport::synced(removed),
                Err(err) => {
                    SyncReport::local_only(removed, remote_failed("keyword_records.delete", &err))
                }
            },
            Ok(None) => SyncReport::synced(removed),
            Err(err) => {
                SyncReport::local_only(removed, remote_failed("keyword_records.list", &err))
            }
        }
    }

    /// Add or replace a campaign locally, then push.
    ///
    /// A campaign that already exists remotely is not updated by the push.
    pub async fn upsert_campaign(
        &self,
        ctx: &StorageContext,
        brand: &str,
        campaign: Campaign,
    ) -> SyncReport<PushSummary> {
        self.modify(ctx, brand, |state| state.upsert_campaign(campaign));
        self.push(ctx, brand).await
    }

    /// Remove a campaign locally, then delete it and its ad groups remotely.
    pub async fn remove_campaign(
        &self,
        ctx: &StorageContext,
        brand: &str,
        name: &str,
    ) -> SyncReport<bool> {
        let wanted = normalize_text(name);
        let removed = self
            .modify_existing(ctx, brand, |state| {
                let before = state.campaigns.len();
                state.campaigns.retain(|c| normalize_text(&c.name) != wanted);
                state.campaigns.len() != before
            })
            .unwrap_or(false);

        let remote = match ctx.connect().await {
            Ok(remote) => remote,
            Err(reason) => return SyncReport::local_only(removed, reason),
        };
        let brand_id = match resolve_brand_id(remote, brand).await {
            Ok(id) => id,
            Err(reason) => return SyncReport::local_only(removed, reason),
        };

        let found = find_remote(
            remote.campaigns.as_ref(),
            Some(brand_id.as_str()),
            |row: &RemoteCampaign| normalize_text(&row.name) == wanted,
        )
        .await;

        match found {
            Ok(Some(row)) => match delete_campaign_tree(remote, &row.id).await {
                Ok(()) => SyncReport::synced(removed),
                Err(err) => {
                    SyncReport::local_only(removed, remote_failed("campaigns.delete", &err))
                }
            },
            Ok(None) => SyncReport::synced(removed),
            Err(err) => SyncReport::local_only(removed, remote_failed("campaigns.list", &err)),
        }
    }

    /// Record the session's search text. Never leaves the local cache.
    ///
    /// Does nothing for a brand with no cached workspace.
    pub fn set_recent_search(&self, ctx: &StorageContext, brand: &str, text: &str) {
        self.modify_existing(ctx, brand, |state| state.recent_search = text.to_string());
    }

    /// Push a brand's cached workspace, creating the remote brand first when
    /// it has no counterpart and bringing its search settings up to date.
    pub async fn push(&self, ctx: &StorageContext, brand: &str) -> SyncReport<PushSummary> {
        let remote = match ctx.connect().await {
            Ok(remote) => remote,
            Err(reason) => return SyncReport::local_only(PushSummary::default(), reason),
        };

        let state = self.get(ctx, brand);
        let remote_brand =
            match ensure_remote_brand(remote, brand, Some(state.search_settings.clone())).await {
                Ok(found) => found,
                Err(err) => {
                    return SyncReport::local_only(
                        PushSummary::default(),
                        remote_failed("brands.create", &err),
                    )
                }
            };

        if remote_brand.search_settings.as_ref() != Some(&state.search_settings) {
            let fields = BrandFields {
                search_settings: Some(state.search_settings.clone()),
                ..BrandFields::from(&remote_brand)
            };
            if let Err(err) = remote.brands.update(&remote_brand.id, fields).await {
                return SyncReport::local_only(
                    PushSummary::default(),
                    remote_failed("brands.update", &err),
                );
            }
            tracing::debug!(brand, "Updated remote search settings");
        }

        match PushReconciler::new(remote).push(&remote_brand.id, &state).await {
            Ok(summary) => SyncReport::synced(summary),
            Err(err) => SyncReport::local_only(
                PushSummary::default(),
                remote_failed("workspace.push", &err),
            ),
        }
    }

    /// Read the map, change one brand's entry, write the whole map back.
    fn modify<R>(
        &self,
        ctx: &StorageContext,
        brand: &str,
        change: impl FnOnce(&mut BrandWorkspaceState) -> R,
    ) -> R {
        let mut states = self.cached(ctx);
        let result = change(states.entry(brand.to_string()).or_default());
        ctx.cache().write(keys::WORKSPACES, &states);
        result
    }

    /// Like `modify`, but leaves the cache alone when `brand` has no entry.
    fn modify_existing<R>(
        &self,
        ctx: &StorageContext,
        brand: &str,
        change: impl FnOnce(&mut BrandWorkspaceState) -> R,
    ) -> Option<R> {
        let mut states = self.cached(ctx);
        let result = change(states.get_mut(brand)?);
        ctx.cache().write(keys::WORKSPACES, &states);
        Some(result)
    }
}

async fn rebuild(remote: &RemoteStore) -> RemoteResult<WorkspaceMap> {
    let brands = remote.brands.list(None).await?;

    let mut states = WorkspaceMap::new();
    for brand in brands.into_iter().filter(|b| b.is_active) {
        let keywords = remote.keywords.list(Some(brand.id.as_str())).await?;
        let campaign_rows = remote.campaigns.list(Some(brand.id.as_str())).await?;

        let mut campaigns = Vec::with_capacity(campaign_rows.len());
        for row in campaign_rows {
            let ad_groups = remote.ad_groups.list(Some(row.id.as_str())).await?;
            campaigns.push(Campaign::from_remote(row, ad_groups));
        }

        let state = BrandWorkspaceState {
            keywords: keywords.into_iter().map(KeywordRecord::from).collect(),
            campaigns,
            search_settings: brand.search_settings.unwrap_or_default(),
            ..Default::default()
        };
        states.insert(brand.name, state);
    }

    Ok(states)
}

async fn delete_campaign_tree(remote: &RemoteStore, campaign_id: &str) -> RemoteResult<()> {
    for group in remote.ad_groups.list(Some(campaign_id)).await? {
        remote.ad_groups.delete(&group.id).await?;
    }
    remote.campaigns.delete(campaign_id).await
}
