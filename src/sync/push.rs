//! Local-to-remote push of a brand workspace.
//!
//! The push only ever creates: it lists what the remote store already has,
//! computes the local records missing from it (by normalized keyword text or
//! campaign name) and bulk-creates that delta. Records present on both sides
//! are left alone, so when their other fields differ the remote version
//! stays and the local differences are not pushed.

use std::collections::HashSet;

use crate::errors::RemoteResult;
use crate::models::{
    normalize_text, AdGroupFields, BrandWorkspaceState, Campaign, CampaignFields, KeywordFields,
    KeywordRecord, RemoteCampaign, RemoteKeyword,
};
use crate::remote::RemoteStore;

/// Counts of records a push created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushSummary {
    pub keywords_created: usize,
    pub campaigns_created: usize,
    pub ad_groups_created: usize,
}

impl PushSummary {
    pub fn is_empty(&self) -> bool {
        self.keywords_created == 0 && self.campaigns_created == 0 && self.ad_groups_created == 0
    }
}

/// Pushes workspace deltas for one resolved remote brand.
pub struct PushReconciler<'a> {
    remote: &'a RemoteStore,
}

impl<'a> PushReconciler<'a> {
    pub fn new(remote: &'a RemoteStore) -> Self {
        Self { remote }
    }

    /// Push keyword and campaign deltas of `state` under `brand_id`.
    pub async fn push(
        &self,
        brand_id: &str,
        state: &BrandWorkspaceState,
    ) -> RemoteResult<PushSummary> {
        let keywords_created = self.push_keywords(brand_id, &state.keywords).await?;
        let (campaigns_created, ad_groups_created) =
            self.push_campaigns(brand_id, &state.campaigns).await?;

        let summary = PushSummary {
            keywords_created,
            campaigns_created,
            ad_groups_created,
        };
        tracing::info!(
            brand_id,
            keywords = summary.keywords_created,
            campaigns = summary.campaigns_created,
            ad_groups = summary.ad_groups_created,
            "Pushed workspace delta"
        );
        Ok(summary)
    }

    pub async fn push_keywords(
        &self,
        brand_id: &str,
        local: &[KeywordRecord],
    ) -> RemoteResult<usize> {
        let existing = self.remote.keywords.list(Some(brand_id)).await?;
        let delta = keyword_delta(local, &existing);
        if delta.is_empty() {
            return Ok(0);
        }

        let fields: Vec<KeywordFields> = delta.into_iter().map(KeywordFields::from).collect();
        let created = self.remote.keywords.bulk_create(Some(brand_id), fields).await?;
        Ok(created.len())
    }

    /// Create missing campaigns, then the ad groups of each new campaign.
    ///
    /// Returns `(campaigns_created, ad_groups_created)`.
    pub async fn push_campaigns(
        &self,
        brand_id: &str,
        local: &[Campaign],
    ) -> RemoteResult<(usize, usize)> {
        let existing = self.remote.campaigns.list(Some(brand_id)).await?;
        let delta = campaign_delta(local, &existing);
        if delta.is_empty() {
            return Ok((0, 0));
        }

        let fields: Vec<CampaignFields> = delta.iter().map(|c| CampaignFields::from(*c)).collect();
        let created = self.remote.campaigns.bulk_create(Some(brand_id), fields).await?;

        let mut ad_groups_created = 0;
        for (campaign, row) in delta.iter().zip(created.iter()) {
            if campaign.ad_groups.is_empty() {
                continue;
            }
            let groups: Vec<AdGroupFields> =
                campaign.ad_groups.iter().map(AdGroupFields::from).collect();
            ad_groups_created += self
                .remote
                .ad_groups
                .bulk_create(Some(row.id.as_str()), groups)
                .await?
                .len();
        }

        Ok((created.len(), ad_groups_created))
    }
}

/// Local keyword records whose normalized text the remote set lacks.
///
/// Local duplicates collapse to their first occurrence.
pub fn keyword_delta<'s>(
    local: &'s [KeywordRecord],
    remote: &[RemoteKeyword],
) -> Vec<&'s KeywordRecord> {
    let mut seen: HashSet<String> =
        remote.iter().map(|row| normalize_text(&row.keyword)).collect();
    local
        .iter()
        .filter(|record| !record.text.trim().is_empty())
        .filter(|record| seen.insert(record.normalized_text()))
        .collect()
}

/// Local campaigns whose normalized name the remote set lacks.
pub fn campaign_delta<'s>(local: &'s [Campaign], remote: &[RemoteCampaign]) -> Vec<&'s Campaign> {
    let mut seen: HashSet<String> = remote.iter().map(|row| normalize_text(&row.name)).collect();
    local
        .iter()
        .filter(|campaign| !campaign.name.trim().is_empty())
        .filter(|campaign| seen.insert(normalize_text(&campaign.name)))
        .collect()
}
