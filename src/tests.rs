//! End-to-end tests for the sync coordinators against the in-memory remote.

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use crate::cache::keys;
use crate::config::{Config, RemoteSettings};
use crate::errors::RemoteResult;
use crate::models::{
    BrandWorkspaceState, Campaign, CompetitionLevel, Document, DocumentPatch, KeywordFields,
    DocumentFields, KeywordRecord, KeywordSource, MatchType, NewDocument, RemoteBrand,
    RemoteDocument, RemoteKeyword, SearchSettings, VolumeBucket,
};
use crate::remote::memory::{MemoryCollection, MemoryRemote};
use crate::remote::{find_remote, RemoteCollection, RemoteStore};
use crate::settings::Settings;
use crate::sync::{
    is_placeholder, BrandSync, DocumentSync, LocalOnlyReason, PushReconciler, SyncOutcome,
    WorkspaceSync,
};
use crate::{open_context, LocalCache, StorageContext};

/// Test fixture: a configured context over an in-memory cache and remote.
struct TestFixture {
    remote: MemoryRemote,
    ctx: StorageContext,
}

impl TestFixture {
    fn new() -> Self {
        let remote = MemoryRemote::new();
        let ctx = StorageContext::new(
            &remote_config(),
            LocalCache::in_memory(),
            Some(remote.store()),
        );
        TestFixture { remote, ctx }
    }

    /// Signed out, so every call degrades until `go_online`.
    fn offline() -> Self {
        let fixture = Self::new();
        fixture.remote.session.sign_out();
        fixture
    }

    fn go_online(&self) {
        self.remote.session.sign_in(crate::models::RemoteUser {
            id: "user-1".to_string(),
            email: None,
        });
    }

    fn brand_id(&self, name: &str) -> String {
        self.remote
            .brands
            .rows()
            .into_iter()
            .find(|b| b.is_active && b.name == name)
            .map(|b| b.id)
            .expect("brand not found remotely")
    }
}

fn remote_config() -> Config {
    Config {
        remote: Some(RemoteSettings {
            url: "https://db.example".to_string(),
            api_key: "anon-key".to_string(),
        }),
        ..Config::local_only("./unused.sqlite")
    }
}

/// What happens to the document collection while a write is in flight.
enum Interference {
    /// Another device deletes the row just before an update lands.
    DeleteBeforeUpdate,
    /// A listing mirrors the remote rows into the cache before a create returns.
    ListDuringCreate { cache: LocalCache, brand: String },
}

/// Document collection over the fixture's rows that interferes with writes.
struct InterferingDocuments {
    inner: Arc<MemoryCollection<RemoteDocument>>,
    interference: Interference,
}

#[async_trait]
impl RemoteCollection for InterferingDocuments {
    type Record = RemoteDocument;
    type Fields = DocumentFields;

    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn list(&self, parent: Option<&str>) -> RemoteResult<Vec<RemoteDocument>> {
        self.inner.list(parent).await
    }

    async fn get(&self, id: &str) -> RemoteResult<RemoteDocument> {
        self.inner.get(id).await
    }

    async fn create(
        &self,
        parent: Option<&str>,
        fields: DocumentFields,
    ) -> RemoteResult<RemoteDocument> {
        let row = self.inner.create(parent, fields).await?;
        if let Interference::ListDuringCreate { cache, brand } = &self.interference {
            let listed: Vec<Document> = self
                .inner
                .list(parent)
                .await?
                .into_iter()
                .map(Document::from)
                .collect();
            cache.write(&keys::documents(brand), &listed);
        }
        Ok(row)
    }

    async fn update(&self, id: &str, fields: DocumentFields) -> RemoteResult<RemoteDocument> {
        if let Interference::DeleteBeforeUpdate = self.interference {
            self.inner.delete(id).await?;
        }
        self.inner.update(id, fields).await
    }

    async fn delete(&self, id: &str) -> RemoteResult<()> {
        self.inner.delete(id).await
    }
}

/// A second context sharing the fixture's cache and remote rows, with an
/// interfering document collection.
fn interfering_context(fixture: &TestFixture, interference: Interference) -> StorageContext {
    let documents = InterferingDocuments {
        inner: fixture.remote.documents.clone(),
        interference,
    };
    let store = RemoteStore {
        documents: Arc::new(documents),
        ..fixture.remote.store()
    };
    StorageContext::new(&remote_config(), fixture.ctx.cache().clone(), Some(store))
}

fn keyword(text: &str, category: &str, relevance: u8) -> KeywordRecord {
    KeywordRecord {
        category: category.to_string(),
        relevance,
        ..KeywordRecord::new(text)
    }
}

// ==================== Brands ====================

#[tokio::test]
async fn test_offline_brand_lost_on_online_list() {
    let fixture = TestFixture::offline();
    let brands = BrandSync::new();

    let report = brands.create(&fixture.ctx, "Acme").await;
    assert_eq!(report.value, vec!["Acme".to_string()]);
    assert_eq!(report.outcome, SyncOutcome::LocalOnly(LocalOnlyReason::Unauthenticated));

    let report = brands.list(&fixture.ctx).await;
    assert!(!report.is_synced());
    assert_eq!(report.value, vec!["Acme".to_string()]);

    fixture
        .remote
        .brands
        .seed(None, crate::models::BrandFields::named("Bravo"));
    fixture.go_online();

    let report = brands.list(&fixture.ctx).await;
    assert!(report.is_synced());
    assert_eq!(report.value, vec!["Bravo".to_string()]);

    // The offline "Acme" is gone from the cache: listings mirror, they do not merge.
    assert_eq!(brands.cached(&fixture.ctx), vec!["Bravo".to_string()]);
}

#[tokio::test]
async fn test_create_brand_online() {
    let fixture = TestFixture::new();
    let brands = BrandSync::new();

    let report = brands.create(&fixture.ctx, "  Acme ").await;
    assert!(report.is_synced());
    assert_eq!(report.value, vec!["Acme".to_string()]);

    let again = brands.create(&fixture.ctx, "Acme").await;
    assert!(again.is_synced());
    assert_eq!(again.value, vec!["Acme".to_string()]);
    assert_eq!(fixture.remote.brands.create_count(), 1);

    let workspaces = WorkspaceSync::new().cached(&fixture.ctx);
    assert_eq!(workspaces.get("Acme"), Some(&BrandWorkspaceState::default()));
}

#[tokio::test]
async fn test_create_blank_brand_is_ignored() {
    let fixture = TestFixture::new();

    let report = BrandSync::new().create(&fixture.ctx, "   ").await;
    assert!(report.value.is_empty());
    assert!(matches!(
        report.local_only_reason(),
        Some(LocalOnlyReason::InvalidInput(_))
    ));
    assert!(fixture.remote.brands.rows().is_empty());
}

#[tokio::test]
async fn test_delete_brand_cascades_even_when_remote_fails() {
    let fixture = TestFixture::new();
    let brands = BrandSync::new();
    let documents = DocumentSync::new();

    brands.create(&fixture.ctx, "Acme").await;
    brands.create(&fixture.ctx, "Bravo").await;
    documents
        .create(&fixture.ctx, "Acme", NewDocument::new("Voice", "Friendly"))
        .await;
    Settings::new(fixture.ctx.cache()).set_last_brand(Some("Acme"));

    fixture.remote.set_failing(true);
    let report = brands.delete(&fixture.ctx, "Acme").await;
    assert!(matches!(
        report.local_only_reason(),
        Some(LocalOnlyReason::RemoteFailed { .. })
    ));
    assert_eq!(report.value, vec!["Bravo".to_string()]);

    let workspaces = WorkspaceSync::new().cached(&fixture.ctx);
    assert!(!workspaces.contains_key("Acme"));
    assert!(workspaces.contains_key("Bravo"));
    assert!(documents.cached(&fixture.ctx, "Acme").is_empty());
    assert!(Settings::new(fixture.ctx.cache()).last_brand().is_none());
}

#[tokio::test]
async fn test_delete_brand_archives_remote_row() {
    let fixture = TestFixture::new();
    let brands = BrandSync::new();

    brands.create(&fixture.ctx, "Acme").await;
    let report = brands.delete(&fixture.ctx, "Acme").await;
    assert!(report.is_synced());

    let rows = fixture.remote.brands.rows();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].is_active);

    let listed = brands.list(&fixture.ctx).await;
    assert!(listed.value.is_empty());
}

#[tokio::test]
async fn test_rename_brand_moves_local_state() {
    let fixture = TestFixture::new();
    let brands = BrandSync::new();
    let documents = DocumentSync::new();

    brands.create(&fixture.ctx, "Acme").await;
    brands.create(&fixture.ctx, "Bravo").await;
    documents
        .create(&fixture.ctx, "Acme", NewDocument::new("Voice", "Friendly"))
        .await;
    Settings::new(fixture.ctx.cache()).set_last_brand(Some("Acme"));

    let report = brands.rename(&fixture.ctx, "Acme", "Acme Labs").await;
    assert!(report.is_synced());
    assert_eq!(report.value, vec!["Acme Labs".to_string(), "Bravo".to_string()]);

    assert_eq!(documents.cached(&fixture.ctx, "Acme Labs").len(), 1);
    assert!(documents.cached(&fixture.ctx, "Acme").is_empty());
    assert_eq!(
        Settings::new(fixture.ctx.cache()).last_brand().as_deref(),
        Some("Acme Labs")
    );

    let found = find_remote(
        fixture.remote.brands.as_ref(),
        None,
        |b: &RemoteBrand| b.name == "Acme Labs",
    )
    .await
    .unwrap();
    assert!(found.is_some());
    assert_eq!(fixture.remote.brands.rows().len(), 2);
}

#[tokio::test]
async fn test_rename_rejects_taken_name() {
    let fixture = TestFixture::new();
    let brands = BrandSync::new();

    brands.create(&fixture.ctx, "Acme").await;
    brands.create(&fixture.ctx, "Bravo").await;

    let report = brands.rename(&fixture.ctx, "Acme", "Bravo").await;
    assert!(matches!(
        report.local_only_reason(),
        Some(LocalOnlyReason::InvalidInput(_))
    ));
    assert_eq!(report.value, vec!["Acme".to_string(), "Bravo".to_string()]);
}

// ==================== Connectivity ====================

#[tokio::test]
async fn test_unconfigured_context_never_calls_remote() {
    let remote = MemoryRemote::new();
    let ctx = StorageContext::new(
        &Config::local_only("./unused.sqlite"),
        LocalCache::in_memory(),
        Some(remote.store()),
    );

    let report = BrandSync::new().create(&ctx, "Acme").await;
    assert_eq!(report.local_only_reason(), Some(&LocalOnlyReason::NotConfigured));
    assert!(remote.brands.rows().is_empty());
}

#[tokio::test]
async fn test_probe_failure_degrades_to_local() {
    let fixture = TestFixture::new();
    fixture.remote.session.set_failing(true);

    let report = BrandSync::new().create(&fixture.ctx, "Acme").await;
    assert!(matches!(
        report.local_only_reason(),
        Some(LocalOnlyReason::ProbeFailed(_))
    ));
    assert_eq!(report.value, vec!["Acme".to_string()]);
    assert!(fixture.remote.brands.rows().is_empty());
}

#[tokio::test]
async fn test_remote_failure_on_list_serves_cache() {
    let fixture = TestFixture::new();
    let brands = BrandSync::new();

    brands.create(&fixture.ctx, "Acme").await;
    fixture.remote.brands.set_failing(true);

    let report = brands.list(&fixture.ctx).await;
    assert_eq!(report.value, vec!["Acme".to_string()]);
    match report.outcome {
        SyncOutcome::LocalOnly(LocalOnlyReason::RemoteFailed { operation, .. }) => {
            assert_eq!(operation, "brands.list")
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

// ==================== Documents ====================

#[tokio::test]
async fn test_document_placeholder_replaced_in_place() {
    let fixture = TestFixture::new();
    let documents = DocumentSync::new();
    BrandSync::new().create(&fixture.ctx, "Acme").await;

    documents
        .create(&fixture.ctx, "Acme", NewDocument::new("First", "one"))
        .await;
    let report = documents
        .create(&fixture.ctx, "Acme", NewDocument::new("Second", "two"))
        .await;
    assert!(report.is_synced());
    assert!(!is_placeholder(&report.value.id));

    let cached = documents.cached(&fixture.ctx, "Acme");
    assert_eq!(cached.len(), 2);
    assert_eq!(cached[1].id, report.value.id);
    assert_eq!(cached[1].title, "Second");
    assert!(cached.iter().all(|d| !is_placeholder(&d.id)));
    assert_eq!(fixture.remote.documents.rows().len(), 2);
}

#[tokio::test]
async fn test_offline_document_survives_offline_list() {
    let fixture = TestFixture::new();
    let documents = DocumentSync::new();
    BrandSync::new().create(&fixture.ctx, "Acme").await;
    fixture.remote.session.sign_out();

    let report = documents
        .create(&fixture.ctx, "Acme", NewDocument::new("Draft", "offline"))
        .await;
    assert!(is_placeholder(&report.value.id));

    let listed = documents.list(&fixture.ctx, "Acme").await;
    assert!(!listed.is_synced());
    assert_eq!(listed.value, vec![report.value.clone()]);
    assert_eq!(documents.cached(&fixture.ctx, "Acme"), vec![report.value]);
}

#[tokio::test]
async fn test_document_for_unsynced_brand_stays_local() {
    let fixture = TestFixture::offline();
    let documents = DocumentSync::new();
    BrandSync::new().create(&fixture.ctx, "Acme").await;
    fixture.go_online();

    let report = documents
        .create(&fixture.ctx, "Acme", NewDocument::new("Voice", "Friendly"))
        .await;
    assert_eq!(
        report.local_only_reason(),
        Some(&LocalOnlyReason::NoRemoteParent("Acme".to_string()))
    );
    assert!(fixture.remote.documents.rows().is_empty());
}

#[tokio::test]
async fn test_online_list_mirrors_remote_documents() {
    let fixture = TestFixture::new();
    let documents = DocumentSync::new();
    BrandSync::new().create(&fixture.ctx, "Acme").await;

    fixture.remote.session.sign_out();
    documents
        .create(&fixture.ctx, "Acme", NewDocument::new("Local only", "draft"))
        .await;
    fixture.go_online();

    let brand_id = fixture.brand_id("Acme");
    fixture.remote.documents.seed(
        Some(brand_id.as_str()),
        crate::models::DocumentFields::from(&Document::draft(
            "ignored".to_string(),
            NewDocument::new("Server doc", "from elsewhere"),
            chrono::Utc::now(),
        )),
    );

    let report = documents.list(&fixture.ctx, "Acme").await;
    assert!(report.is_synced());

    let expected: Vec<Document> = fixture
        .remote
        .documents
        .rows()
        .into_iter()
        .map(Document::from)
        .collect();
    assert_eq!(report.value, expected);
    assert_eq!(documents.cached(&fixture.ctx, "Acme"), expected);
    assert!(expected.iter().all(|d| d.title != "Local only"));
}

#[tokio::test]
async fn test_update_without_counterpart_creates_remote() {
    let fixture = TestFixture::new();
    let documents = DocumentSync::new();
    BrandSync::new().create(&fixture.ctx, "Acme").await;

    fixture.remote.session.sign_out();
    let draft = documents
        .create(&fixture.ctx, "Acme", NewDocument::new("Draft", "offline"))
        .await
        .into_value();
    fixture.go_online();

    let patch = DocumentPatch {
        content: Some("now online".to_string()),
        ..Default::default()
    };
    let report = documents.update(&fixture.ctx, "Acme", &draft.id, patch).await;
    assert!(report.is_synced());

    let updated = report.value.expect("document should exist");
    assert!(!is_placeholder(&updated.id));
    assert_eq!(updated.content, "now online");

    let cached = documents.cached(&fixture.ctx, "Acme");
    assert_eq!(cached, vec![updated]);
    assert_eq!(fixture.remote.documents.rows().len(), 1);
}

#[tokio::test]
async fn test_retitled_document_keeps_remote_identity() {
    let fixture = TestFixture::new();
    let documents = DocumentSync::new();
    BrandSync::new().create(&fixture.ctx, "Acme").await;

    let created = documents
        .create(&fixture.ctx, "Acme", NewDocument::new("Voice", "Friendly"))
        .await
        .into_value();

    let patch = DocumentPatch {
        title: Some("Brand voice".to_string()),
        ..Default::default()
    };
    documents.update(&fixture.ctx, "Acme", &created.id, patch).await;
    let report = documents.toggle_favorite(&fixture.ctx, "Acme", &created.id).await;
    assert!(report.is_synced());

    let rows = fixture.remote.documents.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, created.id);
    assert_eq!(rows[0].title, "Brand voice");
    assert!(rows[0].is_favorite);

    documents.record_view(&fixture.ctx, "Acme", &created.id).await;
    assert_eq!(fixture.remote.documents.rows()[0].view_count, 1);
}

#[tokio::test]
async fn test_delete_document_removes_remote_row() {
    let fixture = TestFixture::new();
    let documents = DocumentSync::new();
    BrandSync::new().create(&fixture.ctx, "Acme").await;

    let first = documents
        .create(&fixture.ctx, "Acme", NewDocument::new("First", "one"))
        .await
        .into_value();
    documents
        .create(&fixture.ctx, "Acme", NewDocument::new("Second", "two"))
        .await;

    let report = documents.delete(&fixture.ctx, "Acme", &first.id).await;
    assert!(report.is_synced());
    assert_eq!(report.value.len(), 1);
    assert_eq!(report.value[0].title, "Second");

    let rows = fixture.remote.documents.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "Second");
}

#[tokio::test]
async fn test_update_unknown_document_is_ignored() {
    let fixture = TestFixture::new();

    let report = DocumentSync::new()
        .update(&fixture.ctx, "Acme", "missing", DocumentPatch::default())
        .await;
    assert!(report.value.is_none());
    assert!(matches!(
        report.local_only_reason(),
        Some(LocalOnlyReason::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_update_recreates_document_deleted_elsewhere() {
    let fixture = TestFixture::new();
    let documents = DocumentSync::new();
    BrandSync::new().create(&fixture.ctx, "Acme").await;

    let created = documents
        .create(&fixture.ctx, "Acme", NewDocument::new("Voice", "Friendly"))
        .await
        .into_value();
    assert!(!is_placeholder(&created.id));

    let ctx = interfering_context(&fixture, Interference::DeleteBeforeUpdate);
    let patch = DocumentPatch {
        content: Some("Warm".to_string()),
        ..Default::default()
    };
    let report = documents.update(&ctx, "Acme", &created.id, patch).await;
    assert!(report.is_synced());

    let updated = report.value.expect("document should exist");
    assert_ne!(updated.id, created.id);
    assert!(!is_placeholder(&updated.id));
    assert_eq!(updated.content, "Warm");

    let rows = fixture.remote.documents.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, updated.id);
    assert_eq!(rows[0].content, "Warm");
    assert_eq!(documents.cached(&fixture.ctx, "Acme"), vec![updated]);
}

#[tokio::test]
async fn test_listing_during_create_leaves_no_placeholder() {
    let fixture = TestFixture::new();
    let documents = DocumentSync::new();
    BrandSync::new().create(&fixture.ctx, "Acme").await;

    let ctx = interfering_context(
        &fixture,
        Interference::ListDuringCreate {
            cache: fixture.ctx.cache().clone(),
            brand: "Acme".to_string(),
        },
    );
    let report = documents
        .create(&ctx, "Acme", NewDocument::new("Voice", "Friendly"))
        .await;
    assert!(report.is_synced());

    let expected: Vec<Document> = fixture
        .remote
        .documents
        .rows()
        .into_iter()
        .map(Document::from)
        .collect();
    let cached = documents.cached(&fixture.ctx, "Acme");
    assert_eq!(cached, expected);
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].id, report.value.id);
    assert!(cached.iter().all(|d| !is_placeholder(&d.id)));
}

#[tokio::test]
async fn test_failed_create_is_dropped_by_next_online_list() {
    let fixture = TestFixture::new();
    let documents = DocumentSync::new();
    BrandSync::new().create(&fixture.ctx, "Acme").await;

    fixture.remote.documents.set_failing(true);
    let report = documents
        .create(&fixture.ctx, "Acme", NewDocument::new("Draft", "unsent"))
        .await;
    assert!(matches!(
        report.local_only_reason(),
        Some(LocalOnlyReason::RemoteFailed { operation: "documents.create", .. })
    ));
    assert!(is_placeholder(&report.value.id));
    assert_eq!(documents.cached(&fixture.ctx, "Acme"), vec![report.value]);

    fixture.remote.documents.set_failing(false);
    let listed = documents.list(&fixture.ctx, "Acme").await;
    assert!(listed.is_synced());
    assert!(listed.value.is_empty());
    assert!(documents.cached(&fixture.ctx, "Acme").is_empty());
}

// ==================== Workspaces ====================

#[tokio::test]
async fn test_push_is_idempotent() {
    let fixture = TestFixture::new();
    let workspaces = WorkspaceSync::new();

    let mut campaign = Campaign::new("Spring Sale");
    campaign.ad_groups.push(crate::models::AdGroup {
        name: "Earbuds".to_string(),
        default_bid: Some(0.8),
        default_match_type: MatchType::Phrase,
        keywords: vec!["wireless earbuds".to_string()],
    });
    let state = BrandWorkspaceState {
        keywords: vec![
            keyword("wireless earbuds", "audio", 80),
            keyword("anc headphones", "audio", 70),
        ],
        campaigns: vec![campaign],
        ..Default::default()
    };

    let first = workspaces.save(&fixture.ctx, "Acme", state).await;
    assert!(first.is_synced());
    assert_eq!(first.value.keywords_created, 2);
    assert_eq!(first.value.campaigns_created, 1);
    assert_eq!(first.value.ad_groups_created, 1);

    let second = workspaces.push(&fixture.ctx, "Acme").await;
    assert!(second.is_synced());
    assert!(second.value.is_empty());

    assert_eq!(fixture.remote.keywords.rows().len(), 2);
    assert_eq!(fixture.remote.campaigns.rows().len(), 1);
    assert_eq!(fixture.remote.ad_groups.rows().len(), 1);
    assert_eq!(fixture.remote.brands.rows().len(), 1);
}

#[tokio::test]
async fn test_push_keeps_existing_remote_metadata() {
    let fixture = TestFixture::new();
    BrandSync::new().create(&fixture.ctx, "Acme").await;
    let brand_id = fixture.brand_id("Acme");

    fixture.remote.keywords.seed(
        Some(brand_id.as_str()),
        KeywordFields {
            keyword: "wireless earbuds".to_string(),
            match_type: MatchType::Exact,
            category: "imported".to_string(),
            volume: VolumeBucket::High,
            competition: CompetitionLevel::High,
            relevance: 95,
            source: KeywordSource::Imported,
        },
    );
    let before = fixture.remote.keywords.rows();

    let state = BrandWorkspaceState {
        keywords: vec![
            keyword("wireless earbuds", "audio", 10),
            keyword("Wireless Earbuds ", "audio", 20),
        ],
        ..Default::default()
    };
    let summary = PushReconciler::new(&fixture.remote.store())
        .push(&brand_id, &state)
        .await
        .unwrap();

    assert_eq!(summary.keywords_created, 0);
    assert_eq!(fixture.remote.keywords.rows(), before);
}

#[tokio::test]
async fn test_add_keywords_pushes_only_new_text() {
    let fixture = TestFixture::new();
    let workspaces = WorkspaceSync::new();
    BrandSync::new().create(&fixture.ctx, "Acme").await;

    workspaces
        .add_keywords(&fixture.ctx, "Acme", vec![keyword("wireless earbuds", "audio", 80)])
        .await;
    let report = workspaces
        .add_keywords(
            &fixture.ctx,
            "Acme",
            vec![
                keyword("Wireless Earbuds ", "audio", 50),
                keyword("earbud case", "accessories", 40),
            ],
        )
        .await;

    assert!(report.is_synced());
    assert_eq!(report.value.keywords_created, 1);

    let texts: Vec<String> = workspaces
        .get(&fixture.ctx, "Acme")
        .keywords
        .into_iter()
        .map(|k| k.text)
        .collect();
    assert_eq!(texts, vec!["wireless earbuds".to_string(), "earbud case".to_string()]);
    assert_eq!(fixture.remote.keywords.rows().len(), 2);
}

#[tokio::test]
async fn test_remove_keyword_deletes_remote_match() {
    let fixture = TestFixture::new();
    let workspaces = WorkspaceSync::new();

    workspaces
        .add_keywords(
            &fixture.ctx,
            "Acme",
            vec![
                keyword("wireless earbuds", "audio", 80),
                keyword("earbud case", "accessories", 40),
            ],
        )
        .await;

    let report = workspaces
        .remove_keyword(&fixture.ctx, "Acme", "Wireless Earbuds")
        .await;
    assert!(report.is_synced());
    assert!(report.value);

    let remaining: Vec<String> = fixture
        .remote
        .keywords
        .rows()
        .into_iter()
        .map(|k: RemoteKeyword| k.keyword)
        .collect();
    assert_eq!(remaining, vec!["earbud case".to_string()]);
}

#[tokio::test]
async fn test_remove_campaign_deletes_ad_groups() {
    let fixture = TestFixture::new();
    let workspaces = WorkspaceSync::new();

    let mut campaign = Campaign::new("Launch");
    campaign.ad_groups.push(crate::models::AdGroup {
        name: "Core".to_string(),
        default_bid: None,
        default_match_type: MatchType::Broad,
        keywords: Vec::new(),
    });
    workspaces.upsert_campaign(&fixture.ctx, "Acme", campaign).await;
    assert_eq!(fixture.remote.ad_groups.rows().len(), 1);

    let report = workspaces.remove_campaign(&fixture.ctx, "Acme", "launch").await;
    assert!(report.is_synced());
    assert!(report.value);
    assert!(fixture.remote.campaigns.rows().is_empty());
    assert!(fixture.remote.ad_groups.rows().is_empty());
    assert!(workspaces.get(&fixture.ctx, "Acme").campaigns.is_empty());
}

#[tokio::test]
async fn test_get_all_rebuilds_from_remote() {
    let fixture = TestFixture::new();
    let workspaces = WorkspaceSync::new();

    let settings = SearchSettings {
        location: "DE".to_string(),
        ..Default::default()
    };
    let mut campaign = Campaign::new("Spring Sale");
    campaign.ad_groups.push(crate::models::AdGroup {
        name: "Earbuds".to_string(),
        default_bid: Some(0.8),
        default_match_type: MatchType::Exact,
        keywords: vec!["wireless earbuds".to_string()],
    });
    workspaces
        .save(
            &fixture.ctx,
            "Acme",
            BrandWorkspaceState {
                keywords: vec![keyword("wireless earbuds", "audio", 80)],
                campaigns: vec![campaign.clone()],
                search_settings: settings.clone(),
                ..Default::default()
            },
        )
        .await;
    workspaces.set_recent_search(&fixture.ctx, "Acme", "earbuds");

    let report = workspaces.get_all(&fixture.ctx).await;
    assert!(report.is_synced());

    let state = report.value.get("Acme").expect("Acme should be rebuilt");
    assert_eq!(state.keywords, vec![keyword("wireless earbuds", "audio", 80)]);
    assert_eq!(state.campaigns, vec![campaign]);
    assert_eq!(state.search_settings, settings);
    assert!(state.recent_search.is_empty());
    assert_eq!(workspaces.cached(&fixture.ctx), report.value);
}

#[tokio::test]
async fn test_get_all_falls_back_to_cache() {
    let fixture = TestFixture::new();
    let workspaces = WorkspaceSync::new();

    workspaces
        .add_keywords(&fixture.ctx, "Acme", vec![keyword("trail shoes", "running", 60)])
        .await;
    fixture.remote.ad_groups.set_failing(true);
    let brand_id = fixture.brand_id("Acme");
    fixture.remote.campaigns.seed(
        Some(brand_id.as_str()),
        crate::models::CampaignFields::from(&Campaign::new("Trail")),
    );

    let report = workspaces.get_all(&fixture.ctx).await;
    assert!(matches!(
        report.local_only_reason(),
        Some(LocalOnlyReason::RemoteFailed { operation: "workspace.rebuild", .. })
    ));
    assert_eq!(report.value, workspaces.cached(&fixture.ctx));
    assert_eq!(report.value["Acme"].keywords.len(), 1);
}

#[tokio::test]
async fn test_saved_search_settings_reach_existing_brand() {
    let fixture = TestFixture::new();
    let workspaces = WorkspaceSync::new();
    BrandSync::new().create(&fixture.ctx, "Acme").await;

    let settings = SearchSettings {
        location: "DE".to_string(),
        ..Default::default()
    };
    let report = workspaces
        .save(
            &fixture.ctx,
            "Acme",
            BrandWorkspaceState {
                search_settings: settings.clone(),
                ..Default::default()
            },
        )
        .await;
    assert!(report.is_synced());
    assert_eq!(fixture.remote.brands.create_count(), 1);

    let brand = fixture
        .remote
        .brands
        .rows()
        .into_iter()
        .find(|b| b.name == "Acme")
        .expect("brand should exist remotely");
    assert_eq!(brand.search_settings, Some(settings.clone()));

    let rebuilt = workspaces.get_all(&fixture.ctx).await;
    assert!(rebuilt.is_synced());
    assert_eq!(rebuilt.value["Acme"].search_settings, settings);
}

#[tokio::test]
async fn test_edits_to_unknown_brand_leave_cache_alone() {
    let fixture = TestFixture::offline();
    let workspaces = WorkspaceSync::new();

    let removed = workspaces.remove_keyword(&fixture.ctx, "Ghost", "earbuds").await;
    assert!(!removed.value);
    let removed = workspaces.remove_campaign(&fixture.ctx, "Ghost", "Launch").await;
    assert!(!removed.value);
    workspaces.set_recent_search(&fixture.ctx, "Ghost", "earbuds");

    assert!(workspaces.cached(&fixture.ctx).is_empty());
}

// ==================== Persistent cache ====================

#[tokio::test]
async fn test_sqlite_context_persists_offline_work() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = Config::local_only(temp_dir.path().join("cache.sqlite"));

    {
        let (ctx, store) = open_context(&config, None).await.expect("Failed to open cache");
        BrandSync::new().create(&ctx, "Acme").await;
        DocumentSync::new()
            .create(&ctx, "Acme", NewDocument::new("Voice", "Friendly"))
            .await;
        store.flush().await;
    }

    let (ctx, _store) = open_context(&config, None).await.expect("Failed to reopen cache");
    assert_eq!(BrandSync::new().cached(&ctx), vec!["Acme".to_string()]);

    let documents = DocumentSync::new().cached(&ctx, "Acme");
    assert_eq!(documents.len(), 1);
    assert!(is_placeholder(&documents[0].id));

    let raw: Vec<String> = ctx.cache().read_or_default(keys::BRANDS);
    assert_eq!(raw, vec!["Acme".to_string()]);
}
