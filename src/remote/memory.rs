//! In-memory remote store.
//!
//! Behaves like the hosted store for every collection: assigns server ids
//! and timestamps, scopes children by parent id, and hides archived brands
//! from listings. Sessions and per-collection failures can be switched on
//! and off, which is how tests exercise the degraded paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::{RemoteCollection, RemoteStore, SessionProbe};
use crate::errors::{RemoteError, RemoteResult};
use crate::models::{
    AdGroupFields, BrandFields, CampaignFields, DocumentFields, KeywordFields, RemoteAdGroup,
    RemoteBrand, RemoteCampaign, RemoteDocument, RemoteKeyword, RemoteUser,
};

/// A record type the in-memory store knows how to build and mutate.
pub trait StoredRecord: Clone + Send + Sync + 'static {
    type Fields: Clone + Send + Sync + 'static;

    fn build(id: String, parent: Option<&str>, fields: Self::Fields, now: DateTime<Utc>) -> Self;
    fn id(&self) -> &str;
    fn parent_id(&self) -> Option<&str>;
    fn apply(&mut self, fields: Self::Fields, now: DateTime<Utc>);

    /// Soft-delete the record. Returns false when the kind has no such flag.
    fn archive(&mut self, _now: DateTime<Utc>) -> bool {
        false
    }

    fn is_visible(&self) -> bool {
        true
    }
}

/// One in-memory collection.
pub struct MemoryCollection<R: StoredRecord> {
    name: &'static str,
    rows: Mutex<Vec<R>>,
    failing: AtomicBool,
    creates: AtomicUsize,
}

impl<R: StoredRecord> MemoryCollection<R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            creates: AtomicUsize::new(0),
        }
    }

    /// Make every call fail with a server error until switched back off.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every stored row, archived ones included.
    pub fn rows(&self) -> Vec<R> {
        self.rows.lock().clone()
    }

    /// Number of records created so far (single and bulk).
    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    /// Insert a row directly, bypassing failure injection.
    pub fn seed(&self, parent: Option<&str>, fields: R::Fields) -> R {
        let row = R::build(new_id(), parent, fields, Utc::now());
        self.rows.lock().push(row.clone());
        row
    }

    fn check(&self) -> RemoteResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RemoteError::Server {
                status: 503,
                message: format!("{} unavailable", self.name),
            });
        }
        Ok(())
    }

    fn not_found(&self, id: &str) -> RemoteError {
        RemoteError::NotFound(format!("{} {} not found", self.name, id))
    }
}

#[async_trait]
impl<R: StoredRecord> RemoteCollection for MemoryCollection<R> {
    type Record = R;
    type Fields = R::Fields;

    fn name(&self) -> &'static str {
        self.name
    }

    async fn list(&self, parent: Option<&str>) -> RemoteResult<Vec<R>> {
        self.check()?;
        let rows = self.rows.lock();
        let visible: Vec<R> = rows
            .iter()
            .filter(|row| row.is_visible())
            .filter(|row| parent.is_none() || row.parent_id() == parent)
            .cloned()
            .collect();
        Ok(visible)
    }

    async fn get(&self, id: &str) -> RemoteResult<R> {
        self.check()?;
        let found = self.rows.lock().iter().find(|row| row.id() == id).cloned();
        found.ok_or_else(|| self.not_found(id))
    }

    async fn create(&self, parent: Option<&str>, fields: R::Fields) -> RemoteResult<R> {
        self.check()?;
        let row = R::build(new_id(), parent, fields, Utc::now());
        self.rows.lock().push(row.clone());
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(row)
    }

    async fn update(&self, id: &str, fields: R::Fields) -> RemoteResult<R> {
        self.check()?;
        let mut rows = self.rows.lock();
        let row = rows
            .iter_mut()
            .find(|row| row.id() == id)
            .ok_or_else(|| self.not_found(id))?;
        row.apply(fields, Utc::now());
        Ok(row.clone())
    }

    async fn delete(&self, id: &str) -> RemoteResult<()> {
        self.check()?;
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        if rows.len() == before {
            return Err(self.not_found(id));
        }
        Ok(())
    }

    async fn archive(&self, id: &str) -> RemoteResult<()> {
        self.check()?;
        let mut rows = self.rows.lock();
        let row = rows
            .iter_mut()
            .find(|row| row.id() == id)
            .ok_or_else(|| self.not_found(id))?;
        if row.archive(Utc::now()) {
            Ok(())
        } else {
            Err(RemoteError::Unsupported(format!(
                "{} does not support soft delete",
                self.name
            )))
        }
    }
}

/// Session state for [`MemoryRemote`].
#[derive(Default)]
pub struct MemorySession {
    user: Mutex<Option<RemoteUser>>,
    failing: AtomicBool,
}

impl MemorySession {
    pub fn sign_in(&self, user: RemoteUser) {
        *self.user.lock() = Some(user);
    }

    pub fn sign_out(&self) {
        *self.user.lock() = None;
    }

    /// Make the probe itself error out.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionProbe for MemorySession {
    async fn current_user(&self) -> RemoteResult<Option<RemoteUser>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RemoteError::Network("session probe unreachable".to_string()));
        }
        Ok(self.user.lock().clone())
    }
}

/// Every collection of the remote store, held in memory.
pub struct MemoryRemote {
    pub brands: Arc<MemoryCollection<RemoteBrand>>,
    pub keywords: Arc<MemoryCollection<RemoteKeyword>>,
    pub campaigns: Arc<MemoryCollection<RemoteCampaign>>,
    pub ad_groups: Arc<MemoryCollection<RemoteAdGroup>>,
    pub documents: Arc<MemoryCollection<RemoteDocument>>,
    pub session: Arc<MemorySession>,
}

impl MemoryRemote {
    /// An empty store with a signed-in session.
    pub fn new() -> Self {
        let session = Arc::new(MemorySession::default());
        session.sign_in(RemoteUser {
            id: "user-1".to_string(),
            email: Some("owner@example.com".to_string()),
        });

        Self {
            brands: Arc::new(MemoryCollection::new("brands")),
            keywords: Arc::new(MemoryCollection::new("keyword_records")),
            campaigns: Arc::new(MemoryCollection::new("campaigns")),
            ad_groups: Arc::new(MemoryCollection::new("ad_groups")),
            documents: Arc::new(MemoryCollection::new("documents")),
            session,
        }
    }

    /// Handles to the collections as the engine sees them.
    pub fn store(&self) -> RemoteStore {
        RemoteStore {
            brands: self.brands.clone(),
            keywords: self.keywords.clone(),
            campaigns: self.campaigns.clone(),
            ad_groups: self.ad_groups.clone(),
            documents: self.documents.clone(),
            session: self.session.clone(),
        }
    }

    /// Fail (or stop failing) every collection at once.
    pub fn set_failing(&self, failing: bool) {
        self.brands.set_failing(failing);
        self.keywords.set_failing(failing);
        self.campaigns.set_failing(failing);
        self.ad_groups.set_failing(failing);
        self.documents.set_failing(failing);
    }
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn parent_or_empty(parent: Option<&str>) -> String {
    parent.unwrap_or_default().to_string()
}

impl StoredRecord for RemoteBrand {
    type Fields = BrandFields;

    fn build(id: String, _parent: Option<&str>, fields: BrandFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: fields.name,
            is_active: fields.is_active,
            search_settings: fields.search_settings,
            created_at: now,
            updated_at: now,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        None
    }

    fn apply(&mut self, fields: BrandFields, now: DateTime<Utc>) {
        self.name = fields.name;
        self.is_active = fields.is_active;
        self.search_settings = fields.search_settings;
        self.updated_at = now;
    }

    fn archive(&mut self, now: DateTime<Utc>) -> bool {
        self.is_active = false;
        self.updated_at = now;
        true
    }

    fn is_visible(&self) -> bool {
        self.is_active
    }
}

impl StoredRecord for RemoteKeyword {
    type Fields = KeywordFields;

    fn build(id: String, parent: Option<&str>, fields: KeywordFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            brand_id: parent_or_empty(parent),
            keyword: fields.keyword,
            match_type: fields.match_type,
            category: fields.category,
            volume: fields.volume,
            competition: fields.competition,
            relevance: fields.relevance,
            source: fields.source,
            created_at: now,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        Some(self.brand_id.as_str())
    }

    fn apply(&mut self, fields: KeywordFields, _now: DateTime<Utc>) {
        self.keyword = fields.keyword;
        self.match_type = fields.match_type;
        self.category = fields.category;
        self.volume = fields.volume;
        self.competition = fields.competition;
        self.relevance = fields.relevance;
        self.source = fields.source;
    }
}

impl StoredRecord for RemoteCampaign {
    type Fields = CampaignFields;

    fn build(id: String, parent: Option<&str>, fields: CampaignFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            brand_id: parent_or_empty(parent),
            name: fields.name,
            daily_budget: fields.daily_budget,
            created_at: now,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        Some(self.brand_id.as_str())
    }

    fn apply(&mut self, fields: CampaignFields, _now: DateTime<Utc>) {
        self.name = fields.name;
        self.daily_budget = fields.daily_budget;
    }
}

impl StoredRecord for RemoteAdGroup {
    type Fields = AdGroupFields;

    fn build(id: String, parent: Option<&str>, fields: AdGroupFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            campaign_id: parent_or_empty(parent),
            name: fields.name,
            default_bid: fields.default_bid,
            default_match_type: fields.default_match_type,
            keywords: fields.keywords,
            created_at: now,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        Some(self.campaign_id.as_str())
    }

    fn apply(&mut self, fields: AdGroupFields, _now: DateTime<Utc>) {
        self.name = fields.name;
        self.default_bid = fields.default_bid;
        self.default_match_type = fields.default_match_type;
        self.keywords = fields.keywords;
    }
}

impl StoredRecord for RemoteDocument {
    type Fields = DocumentFields;

    fn build(id: String, parent: Option<&str>, fields: DocumentFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            brand_id: parent_or_empty(parent),
            title: fields.title,
            content: fields.content,
            category: fields.category,
            tags: fields.tags,
            is_favorite: fields.is_favorite,
            view_count: fields.view_count,
            created_at: now,
            updated_at: now,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        Some(self.brand_id.as_str())
    }

    fn apply(&mut self, fields: DocumentFields, now: DateTime<Utc>) {
        self.title = fields.title;
        self.content = fields.content;
        self.category = fields.category;
        self.tags = fields.tags;
        self.is_favorite = fields.is_favorite;
        self.view_count = fields.view_count;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::find_brand;

    #[tokio::test]
    async fn test_archived_brands_are_hidden() {
        let remote = MemoryRemote::new();
        let store = remote.store();

        let brand = store.brands.create(None, BrandFields::named("Acme")).await.unwrap();
        store.brands.archive(&brand.id).await.unwrap();

        assert!(store.brands.list(None).await.unwrap().is_empty());
        assert!(find_brand(&store, "Acme").await.unwrap().is_none());
        assert_eq!(remote.brands.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_children_are_scoped_by_parent() {
        let remote = MemoryRemote::new();
        let store = remote.store();

        store
            .campaigns
            .create(Some("brand-a"), CampaignFields { name: "A".into(), daily_budget: None })
            .await
            .unwrap();
        store
            .campaigns
            .create(Some("brand-b"), CampaignFields { name: "B".into(), daily_budget: None })
            .await
            .unwrap();

        let scoped = store.campaigns.list(Some("brand-a")).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].name, "A");
        assert_eq!(store.campaigns.list(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_hard_delete_only_collections_reject_archive() {
        let remote = MemoryRemote::new();
        let store = remote.store();
        let campaign = store
            .campaigns
            .create(Some("b"), CampaignFields { name: "A".into(), daily_budget: None })
            .await
            .unwrap();

        let err = store.campaigns.archive(&campaign.id).await.unwrap_err();
        assert!(matches!(err, RemoteError::Unsupported(_)));
    }

    #[tokio::test]
    async fn test_failure_injection_and_session() {
        let remote = MemoryRemote::new();
        let store = remote.store();

        remote.brands.set_failing(true);
        assert!(store.brands.list(None).await.is_err());
        remote.brands.set_failing(false);
        assert!(store.brands.list(None).await.is_ok());

        assert!(store.session.current_user().await.unwrap().is_some());
        remote.session.sign_out();
        assert!(store.session.current_user().await.unwrap().is_none());
        remote.session.set_failing(true);
        assert!(store.session.current_user().await.is_err());
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let remote = MemoryRemote::new();
        let err = remote.store().documents.get("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
