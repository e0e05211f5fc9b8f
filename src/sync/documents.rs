//! Knowledge-base document coordinator.
//!
//! Documents are created under a placeholder id so they show up at once. If
//! the remote create succeeds, the placeholder is swapped in place for the
//! server record, keeping its position in the list.

use chrono::Utc;

use crate::cache::keys;
use crate::errors::RemoteResult;
use crate::models::{Document, DocumentFields, DocumentPatch, NewDocument, RemoteDocument};
use crate::remote::RemoteStore;

use super::brands::resolve_brand_id;
use super::outcome::remote_failed;
use super::{
    is_placeholder, placeholder_id, DeletePolicy, LocalOnlyReason, StorageContext, SyncReport,
};

/// Coordinator for the per-brand document lists.
#[derive(Debug, Clone, Copy)]
pub struct DocumentSync {
    delete_policy: DeletePolicy,
}

impl Default for DocumentSync {
    fn default() -> Self {
        Self {
            delete_policy: DeletePolicy::Hard,
        }
    }
}

impl DocumentSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delete_policy(delete_policy: DeletePolicy) -> Self {
        Self { delete_policy }
    }

    /// Documents of `brand` as currently cached.
    pub fn cached(&self, ctx: &StorageContext, brand: &str) -> Vec<Document> {
        ctx.cache().read_or_default(&keys::documents(brand))
    }

    fn store(&self, ctx: &StorageContext, brand: &str, documents: &[Document]) {
        ctx.cache().write(&keys::documents(brand), documents);
    }

    /// List documents, mirroring the remote listing into the cache when possible.
    pub async fn list(&self, ctx: &StorageContext, brand: &str) -> SyncReport<Vec<Document>> {
        let remote = match ctx.connect().await {
            Ok(remote) => remote,
            Err(reason) => return SyncReport::local_only(self.cached(ctx, brand), reason),
        };
        let brand_id = match resolve_brand_id(remote, brand).await {
            Ok(id) => id,
            Err(reason) => return SyncReport::local_only(self.cached(ctx, brand), reason),
        };

        match remote.documents.list(Some(brand_id.as_str())).await {
            Ok(rows) => {
                let documents: Vec<Document> = rows.into_iter().map(Document::from).collect();
                self.store(ctx, brand, &documents);
                SyncReport::synced(documents)
            }
            Err(err) => SyncReport::local_only(
                self.cached(ctx, brand),
                remote_failed("documents.list", &err),
            ),
        }
    }

    /// Create a document. The returned value carries the server identity when
    /// the remote create succeeded, the placeholder otherwise.
    pub async fn create(
        &self,
        ctx: &StorageContext,
        brand: &str,
        request: NewDocument,
    ) -> SyncReport<Document> {
        let now = Utc::now();
        let draft = Document::draft(placeholder_id(now), request, now);

        let mut documents = self.cached(ctx, brand);
        documents.push(draft.clone());
        self.store(ctx, brand, &documents);

        let remote = match ctx.connect().await {
            Ok(remote) => remote,
            Err(reason) => return SyncReport::local_only(draft, reason),
        };
        let brand_id = match resolve_brand_id(remote, brand).await {
            Ok(id) => id,
            Err(reason) => return SyncReport::local_only(draft, reason),
        };

        match remote
            .documents
            .create(Some(brand_id.as_str()), DocumentFields::from(&draft))
            .await
        {
            Ok(row) => {
                let canonical = Document::from(row);
                self.adopt(ctx, brand, &draft.id, &canonical);
                SyncReport::synced(canonical)
            }
            Err(err) => SyncReport::local_only(draft, remote_failed("documents.create", &err)),
        }
    }

    /// Patch a cached document, then push the full record remotely.
    ///
    /// A document with no remote counterpart is created remotely instead,
    /// including one that disappears between lookup and update.
    /// On success the cached record is replaced by the server's version.
    pub async fn update(
        &self,
        ctx: &StorageContext,
        brand: &str,
        id: &str,
        patch: DocumentPatch,
    ) -> SyncReport<Option<Document>> {
        let mut documents = self.cached(ctx, brand);
        let Some(document) = documents.iter_mut().find(|d| d.id == id) else {
            return SyncReport::local_only(
                None,
                LocalOnlyReason::InvalidInput(format!("document {} is not cached", id)),
            );
        };
        let previous_title = document.title.clone();
        document.apply(&patch, Utc::now());
        let updated = document.clone();
        self.store(ctx, brand, &documents);

        let remote = match ctx.connect().await {
            Ok(remote) => remote,
            Err(reason) => return SyncReport::local_only(Some(updated), reason),
        };
        let brand_id = match resolve_brand_id(remote, brand).await {
            Ok(id) => id,
            Err(reason) => return SyncReport::local_only(Some(updated), reason),
        };

        let counterpart =
            match find_counterpart(remote, &brand_id, &updated.id, &previous_title).await {
                Ok(found) => found,
                Err(err) => {
                    return SyncReport::local_only(
                        Some(updated),
                        remote_failed("documents.list", &err),
                    )
                }
            };

        let fields = DocumentFields::from(&updated);
        let result = match counterpart {
            Some(row) => match remote.documents.update(&row.id, fields.clone()).await {
                Err(err) if err.is_not_found() => {
                    tracing::debug!(id = %row.id, "Remote document vanished, creating it again");
                    remote
                        .documents
                        .create(Some(brand_id.as_str()), fields)
                        .await
                        .map_err(|err| remote_failed("documents.create", &err))
                }
                other => other.map_err(|err| remote_failed("documents.update", &err)),
            },
            None => remote
                .documents
                .create(Some(brand_id.as_str()), fields)
                .await
                .map_err(|err| remote_failed("documents.create", &err)),
        };

        match result {
            Ok(row) => {
                let canonical = Document::from(row);
                self.adopt(ctx, brand, &updated.id, &canonical);
                SyncReport::synced(Some(canonical))
            }
            Err(reason) => SyncReport::local_only(Some(updated), reason),
        }
    }

    /// Remove a document from the cache, then from the remote store.
    ///
    /// Returns the remaining cached documents. A failed remote delete is not
    /// retried and the document is not restored locally.
    pub async fn delete(
        &self,
        ctx: &StorageContext,
        brand: &str,
        id: &str,
    ) -> SyncReport<Vec<Document>> {
        let mut documents = self.cached(ctx, brand);
        let Some(position) = documents.iter().position(|d| d.id == id) else {
            return SyncReport::local_only(
                documents,
                LocalOnlyReason::InvalidInput(format!("document {} is not cached", id)),
            );
        };
        let removed = documents.remove(position);
        self.store(ctx, brand, &documents);

        let remote = match ctx.connect().await {
            Ok(remote) => remote,
            Err(reason) => return SyncReport::local_only(documents, reason),
        };
        let brand_id = match resolve_brand_id(remote, brand).await {
            Ok(id) => id,
            Err(reason) => return SyncReport::local_only(documents, reason),
        };

        match find_counterpart(remote, &brand_id, &removed.id, &removed.title).await {
            Ok(Some(row)) => {
                match self.delete_policy.apply(remote.documents.as_ref(), &row.id).await {
                    Ok(()) => SyncReport::synced(documents),
                    Err(err) => {
                        SyncReport::local_only(documents, remote_failed("documents.delete", &err))
                    }
                }
            }
            Ok(None) => SyncReport::synced(documents),
            Err(err) => SyncReport::local_only(documents, remote_failed("documents.list", &err)),
        }
    }

    /// Flip the favorite flag.
    pub async fn toggle_favorite(
        &self,
        ctx: &StorageContext,
        brand: &str,
        id: &str,
    ) -> SyncReport<Option<Document>> {
        let current = self.cached(ctx, brand).into_iter().find(|d| d.id == id);
        let Some(current) = current else {
            return SyncReport::local_only(
                None,
                LocalOnlyReason::InvalidInput(format!("document {} is not cached", id)),
            );
        };
        let patch = DocumentPatch {
            is_favorite: Some(!current.is_favorite),
            ..Default::default()
        };
        self.update(ctx, brand, id, patch).await
    }

    /// Count one more view of the document.
    pub async fn record_view(
        &self,
        ctx: &StorageContext,
        brand: &str,
        id: &str,
    ) -> SyncReport<Option<Document>> {
        let current = self.cached(ctx, brand).into_iter().find(|d| d.id == id);
        let Some(current) = current else {
            return SyncReport::local_only(
                None,
                LocalOnlyReason::InvalidInput(format!("document {} is not cached", id)),
            );
        };
        let patch = DocumentPatch {
            view_count: Some(current.view_count.saturating_add(1)),
            ..Default::default()
        };
        self.update(ctx, brand, id, patch).await
    }

    /// Replace the cached document `local_id` with `canonical`, in place.
    ///
    /// If the document has since left the cache (a concurrent listing
    /// replaced it) it is not re-added.
    fn adopt(&self, ctx: &StorageContext, brand: &str, local_id: &str, canonical: &Document) {
        let mut documents = self.cached(ctx, brand);
        match documents.iter_mut().find(|d| d.id == local_id) {
            Some(slot) => {
                *slot = canonical.clone();
                self.store(ctx, brand, &documents);
                if local_id != canonical.id {
                    tracing::debug!(
                        placeholder = local_id,
                        id = %canonical.id,
                        "Adopted server identity for document"
                    );
                }
            }
            None => tracing::debug!(
                id = local_id,
                "Document left the cache before the remote write landed"
            ),
        }
    }
}

/// Find the remote record behind a cached document.
///
/// An adopted server id wins; otherwise, and for placeholders, the document
/// is matched by title.
async fn find_counterpart(
    remote: &RemoteStore,
    brand_id: &str,
    local_id: &str,
    title: &str,
) -> RemoteResult<Option<RemoteDocument>> {
    let rows = remote.documents.list(Some(brand_id)).await?;

    if !is_placeholder(local_id) {
        if let Some(row) = rows.iter().find(|row| row.id == local_id) {
            return Ok(Some(row.clone()));
        }
    }
    Ok(rows.into_iter().find(|row| row.title == title))
}
