//! Knowledge-base document model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of document categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    BrandVoice,
    Product,
    Audience,
    Competitor,
    Research,
    #[default]
    Other,
}

/// A knowledge-base document owned by a brand.
///
/// `id` is a placeholder until the remote store acknowledges the document,
/// then the server id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: DocumentCategory,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub view_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Build a document from a create request under the given identity.
    pub fn draft(id: String, request: NewDocument, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: request.title,
            content: request.content,
            category: request.category,
            tags: request.tags,
            is_favorite: false,
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a patch. Identity and `created_at` never change; `updated_at`
    /// always moves to `now`.
    pub fn apply(&mut self, patch: &DocumentPatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
        if let Some(is_favorite) = patch.is_favorite {
            self.is_favorite = is_favorite;
        }
        if let Some(view_count) = patch.view_count {
            self.view_count = view_count;
        }
        self.updated_at = now;
    }
}

/// Request for creating a new document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: DocumentCategory,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl NewDocument {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }
}

/// Partial update for a document; `None` fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category: Option<DocumentCategory>,
    #[serde(default)]
    pub tags: Option<BTreeSet<String>>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
    #[serde(default)]
    pub view_count: Option<u64>,
}
