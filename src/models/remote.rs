//! Fixed-schema records exchanged with the remote store.
//!
//! Each collection has a record type (what the store returns, with its
//! server-assigned id and timestamps) and a fields type (what a create or
//! update sends).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    AdGroup, Campaign, CompetitionLevel, Document, DocumentCategory, KeywordRecord, KeywordSource,
    MatchType, SearchSettings, VolumeBucket,
};

/// The authenticated account behind the current session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Row in the remote `brands` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteBrand {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    #[serde(default)]
    pub search_settings: Option<SearchSettings>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrandFields {
    pub name: String,
    pub is_active: bool,
    #[serde(default)]
    pub search_settings: Option<SearchSettings>,
}

impl BrandFields {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_active: true,
            search_settings: None,
        }
    }
}

impl From<&RemoteBrand> for BrandFields {
    fn from(brand: &RemoteBrand) -> Self {
        Self {
            name: brand.name.clone(),
            is_active: brand.is_active,
            search_settings: brand.search_settings.clone(),
        }
    }
}

/// Row in the remote `keyword_records` collection, parented by a brand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteKeyword {
    pub id: String,
    pub brand_id: String,
    pub keyword: String,
    pub match_type: MatchType,
    pub category: String,
    pub volume: VolumeBucket,
    pub competition: CompetitionLevel,
    pub relevance: u8,
    pub source: KeywordSource,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordFields {
    pub keyword: String,
    pub match_type: MatchType,
    pub category: String,
    pub volume: VolumeBucket,
    pub competition: CompetitionLevel,
    pub relevance: u8,
    pub source: KeywordSource,
}

impl From<&KeywordRecord> for KeywordFields {
    fn from(record: &KeywordRecord) -> Self {
        Self {
            keyword: record.text.trim().to_string(),
            match_type: record.match_type,
            category: record.category.clone(),
            volume: record.volume,
            competition: record.competition,
            relevance: record.relevance,
            source: record.source,
        }
    }
}

impl From<RemoteKeyword> for KeywordRecord {
    fn from(row: RemoteKeyword) -> Self {
        Self {
            text: row.keyword,
            match_type: row.match_type,
            category: row.category,
            volume: row.volume,
            competition: row.competition,
            relevance: row.relevance,
            source: row.source,
        }
    }
}

/// Row in the remote `campaigns` collection, parented by a brand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteCampaign {
    pub id: String,
    pub brand_id: String,
    pub name: String,
    #[serde(default)]
    pub daily_budget: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignFields {
    pub name: String,
    #[serde(default)]
    pub daily_budget: Option<f64>,
}

impl From<&Campaign> for CampaignFields {
    fn from(campaign: &Campaign) -> Self {
        Self {
            name: campaign.name.clone(),
            daily_budget: campaign.daily_budget,
        }
    }
}

impl Campaign {
    /// Assemble a campaign from its remote row and its ad group rows.
    pub fn from_remote(row: RemoteCampaign, ad_groups: Vec<RemoteAdGroup>) -> Self {
        Self {
            name: row.name,
            daily_budget: row.daily_budget,
            ad_groups: ad_groups.into_iter().map(AdGroup::from).collect(),
        }
    }
}

/// Row in the remote `ad_groups` collection, parented by a campaign.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteAdGroup {
    pub id: String,
    pub campaign_id: String,
    pub name: String,
    #[serde(default)]
    pub default_bid: Option<f64>,
    pub default_match_type: MatchType,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdGroupFields {
    pub name: String,
    #[serde(default)]
    pub default_bid: Option<f64>,
    pub default_match_type: MatchType,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl From<&AdGroup> for AdGroupFields {
    fn from(group: &AdGroup) -> Self {
        Self {
            name: group.name.clone(),
            default_bid: group.default_bid,
            default_match_type: group.default_match_type,
            keywords: group.keywords.clone(),
        }
    }
}

impl From<RemoteAdGroup> for AdGroup {
    fn from(row: RemoteAdGroup) -> Self {
        Self {
            name: row.name,
            default_bid: row.default_bid,
            default_match_type: row.default_match_type,
            keywords: row.keywords,
        }
    }
}

/// Row in the remote `documents` collection, parented by a brand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteDocument {
    pub id: String,
    pub brand_id: String,
    pub title: String,
    pub content: String,
    pub category: DocumentCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub view_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentFields {
    pub title: String,
    pub content: String,
    pub category: DocumentCategory,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub view_count: u64,
}

impl From<&Document> for DocumentFields {
    fn from(doc: &Document) -> Self {
        Self {
            title: doc.title.clone(),
            content: doc.content.clone(),
            category: doc.category,
            tags: doc.tags.iter().cloned().collect(),
            is_favorite: doc.is_favorite,
            view_count: doc.view_count,
        }
    }
}

impl From<RemoteDocument> for Document {
    fn from(row: RemoteDocument) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            category: row.category,
            tags: row.tags.into_iter().collect(),
            is_favorite: row.is_favorite,
            view_count: row.view_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
