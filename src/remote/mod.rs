//! Remote store collaborators.
//!
//! The remote store is only seen through [`RemoteCollection`] (one per
//! collection kind) and [`SessionProbe`]. Its transport and schema live
//! behind these traits.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{RemoteError, RemoteResult};
use crate::models::{
    AdGroupFields, BrandFields, CampaignFields, DocumentFields, KeywordFields, RemoteAdGroup,
    RemoteBrand, RemoteCampaign, RemoteDocument, RemoteKeyword, RemoteUser,
};

/// CRUD access to one remote collection.
///
/// `parent` scopes child collections (brand id for keyword records,
/// campaigns and documents; campaign id for ad groups).
#[async_trait]
pub trait RemoteCollection: Send + Sync {
    type Record: Clone + Send + Sync + 'static;
    type Fields: Clone + Send + Sync + 'static;

    /// Collection name, used in logs.
    fn name(&self) -> &'static str;

    async fn list(&self, parent: Option<&str>) -> RemoteResult<Vec<Self::Record>>;

    /// Fetch one record; a missing id is [`RemoteError::NotFound`].
    async fn get(&self, id: &str) -> RemoteResult<Self::Record>;

    async fn create(&self, parent: Option<&str>, fields: Self::Fields)
        -> RemoteResult<Self::Record>;

    async fn update(&self, id: &str, fields: Self::Fields) -> RemoteResult<Self::Record>;

    /// Remove a record permanently.
    async fn delete(&self, id: &str) -> RemoteResult<()>;

    /// Mark a record inactive without removing it.
    async fn archive(&self, _id: &str) -> RemoteResult<()> {
        Err(RemoteError::Unsupported(format!(
            "{} does not support soft delete",
            self.name()
        )))
    }

    /// Create several records under one parent, returned in input order.
    async fn bulk_create(
        &self,
        parent: Option<&str>,
        fields: Vec<Self::Fields>,
    ) -> RemoteResult<Vec<Self::Record>> {
        let mut created = Vec::with_capacity(fields.len());
        for item in fields {
            created.push(self.create(parent, item).await?);
        }
        Ok(created)
    }
}

/// Reports who the current session belongs to.
#[async_trait]
pub trait SessionProbe: Send + Sync {
    async fn current_user(&self) -> RemoteResult<Option<RemoteUser>>;
}

pub type BrandCollection = dyn RemoteCollection<Record = RemoteBrand, Fields = BrandFields>;
pub type KeywordCollection = dyn RemoteCollection<Record = RemoteKeyword, Fields = KeywordFields>;
pub type CampaignCollection =
    dyn RemoteCollection<Record = RemoteCampaign, Fields = CampaignFields>;
pub type AdGroupCollection = dyn RemoteCollection<Record = RemoteAdGroup, Fields = AdGroupFields>;
pub type DocumentCollection =
    dyn RemoteCollection<Record = RemoteDocument, Fields = DocumentFields>;

/// Every remote collection plus the session probe.
#[derive(Clone)]
pub struct RemoteStore {
    pub brands: Arc<BrandCollection>,
    pub keywords: Arc<KeywordCollection>,
    pub campaigns: Arc<CampaignCollection>,
    pub ad_groups: Arc<AdGroupCollection>,
    pub documents: Arc<DocumentCollection>,
    pub session: Arc<dyn SessionProbe>,
}

/// Linear scan of a remote listing for the first record matching `predicate`.
pub async fn find_remote<C, F>(
    collection: &C,
    parent: Option<&str>,
    predicate: F,
) -> RemoteResult<Option<C::Record>>
where
    C: RemoteCollection + ?Sized,
    F: Fn(&C::Record) -> bool + Send,
{
    let records = collection.list(parent).await?;
    Ok(records.into_iter().find(|record| predicate(record)))
}

/// Resolve an active brand's remote record by name.
pub async fn find_brand(remote: &RemoteStore, name: &str) -> RemoteResult<Option<RemoteBrand>> {
    find_remote(remote.brands.as_ref(), None, |b: &RemoteBrand| {
        b.is_active && b.name == name
    })
    .await
}
