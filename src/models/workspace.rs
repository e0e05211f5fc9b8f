//! Brand workspace model: keyword records, campaigns and search settings.

use serde::{Deserialize, Serialize};

/// Keyword match type used by ad platforms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    #[default]
    Broad,
    Phrase,
    Exact,
}

/// Search volume bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VolumeBucket {
    #[default]
    Unknown,
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Advertiser competition level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionLevel {
    #[default]
    Unknown,
    Low,
    Medium,
    High,
}

/// Where a keyword record came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeywordSource {
    #[default]
    Manual,
    Generated,
    Imported,
}

/// Normalized form of keyword text and campaign names used for equality within a brand.
///
/// Two values are equal when their trimmed, lowercased text is equal.
pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// A single keyword tracked for a brand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRecord {
    pub text: String,
    #[serde(default)]
    pub match_type: MatchType,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub volume: VolumeBucket,
    #[serde(default)]
    pub competition: CompetitionLevel,
    /// Relevance score, 0-100
    #[serde(default)]
    pub relevance: u8,
    #[serde(default)]
    pub source: KeywordSource,
}

impl KeywordRecord {
    /// A manual keyword with default metadata.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            match_type: MatchType::default(),
            category: String::new(),
            volume: VolumeBucket::default(),
            competition: CompetitionLevel::default(),
            relevance: 0,
            source: KeywordSource::default(),
        }
    }

    pub fn normalized_text(&self) -> String {
        normalize_text(&self.text)
    }
}

/// An ad group inside a campaign.
///
/// `keywords` holds keyword text references, not foreign keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdGroup {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_bid: Option<f64>,
    #[serde(default)]
    pub default_match_type: MatchType,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A campaign and its ordered ad groups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<f64>,
    #[serde(default)]
    pub ad_groups: Vec<AdGroup>,
}

impl Campaign {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Keyword research settings for a brand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchSettings {
    pub location: String,
    pub language: String,
    pub max_results: u32,
    #[serde(default)]
    pub include_questions: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            location: "US".to_string(),
            language: "en".to_string(),
            max_results: 50,
            include_questions: false,
        }
    }
}

/// Everything a brand owns in the keyword workspace.
///
/// `recent_search` and `cluster_cache` are session-only and never synced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BrandWorkspaceState {
    #[serde(default)]
    pub keywords: Vec<KeywordRecord>,
    #[serde(default)]
    pub campaigns: Vec<Campaign>,
    #[serde(default)]
    pub recent_search: String,
    #[serde(default)]
    pub cluster_cache: Vec<serde_json::Value>,
    #[serde(default)]
    pub search_settings: SearchSettings,
}

impl BrandWorkspaceState {
    /// Find a keyword by normalized text.
    pub fn keyword(&self, text: &str) -> Option<&KeywordRecord> {
        let wanted = normalize_text(text);
        self.keywords.iter().find(|k| k.normalized_text() == wanted)
    }

    /// Append keywords whose normalized text is not already present.
    ///
    /// Returns how many were added.
    pub fn merge_keywords(&mut self, incoming: Vec<KeywordRecord>) -> usize {
        let mut added = 0;
        for record in incoming {
            if record.text.trim().is_empty() || self.keyword(&record.text).is_some() {
                continue;
            }
            self.keywords.push(record);
            added += 1;
        }
        added
    }

    /// Remove a keyword by normalized text. Returns whether one was removed.
    pub fn remove_keyword(&mut self, text: &str) -> bool {
        let wanted = normalize_text(text);
        let before = self.keywords.len();
        self.keywords.retain(|k| k.normalized_text() != wanted);
        self.keywords.len() != before
    }

    /// Insert a campaign, replacing one with the same normalized name in place.
    pub fn upsert_campaign(&mut self, campaign: Campaign) {
        let wanted = normalize_text(&campaign.name);
        match self
            .campaigns
            .iter_mut()
            .find(|c| normalize_text(&c.name) == wanted)
        {
            Some(slot) => *slot = campaign,
            None => self.campaigns.push(campaign),
        }
    }
}
