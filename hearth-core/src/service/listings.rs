use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use hearth_model::{Property, PropertyDraft, PropertyId, PropertyPatch, UserId};

use crate::error::{CoreError, Result};
use crate::storage::FileStorage;
use crate::store::{PropertiesRepository, PropertyFilter};

const NOT_OWNER: &str = "Unauthorized: You are not the owner";

/// How the image for a new listing is supplied: a ready URL, or raw bytes
/// that must first go through the file-storage collaborator.
#[derive(Debug)]
pub enum ImageSource {
    Url(String),
    Upload { filename: String, bytes: Vec<u8> },
}

/// Listing lifecycle and the ownership rules around it.
pub struct ListingService {
    properties: Arc<dyn PropertiesRepository>,
    storage: Arc<dyn FileStorage>,
}

impl fmt::Debug for ListingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListingService").finish_non_exhaustive()
    }
}

impl ListingService {
    pub fn new(properties: Arc<dyn PropertiesRepository>, storage: Arc<dyn FileStorage>) -> Self {
        Self {
            properties,
            storage,
        }
    }

    /// Two phases: acquire the image URL (uploading through the storage
    /// collaborator when bytes were supplied), then commit the record. A
    /// storage failure aborts before anything is persisted.
    pub async fn create_listing(
        &self,
        owner: UserId,
        draft: PropertyDraft,
        image: ImageSource,
    ) -> Result<Property> {
        draft
            .validate()
            .map_err(|e| CoreError::InvalidInput(e.to_string()))?;

        let image_url = match image {
            ImageSource::Url(url) => {
                let url = url.trim().to_string();
                if url.is_empty() {
                    return Err(CoreError::InvalidInput(
                        "An image URL is required".to_string(),
                    ));
                }
                url
            }
            ImageSource::Upload { filename, bytes } => {
                self.storage.store(&filename, &bytes).await?
            }
        };

        let now = Utc::now();
        let property = Property {
            id: PropertyId::new(),
            title: draft.title,
            address: draft.address,
            description: draft.description,
            price_per_night: draft.price_per_night,
            image_url,
            owner,
            created_at: now,
            updated_at: now,
        };
        self.properties.insert(&property).await?;

        info!("created listing {} for owner {owner}", property.id);
        Ok(property)
    }

    pub async fn get_listing(&self, id: PropertyId) -> Result<Property> {
        self.properties
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("Property".to_string()))
    }

    /// An absent or blank query returns everything; otherwise a
    /// case-insensitive address-contains match.
    pub async fn list_listings(&self, location: Option<&str>) -> Result<Vec<Property>> {
        let filter = PropertyFilter {
            address_contains: location
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(String::from),
        };
        self.properties.find_all(&filter).await
    }

    pub async fn list_owned_listings(&self, owner: UserId) -> Result<Vec<Property>> {
        self.properties.find_by_owner(owner).await
    }

    /// Full-document replace guarded by the ownership check. The patch's
    /// own `owner` field must also equal the stored owner, so the owner
    /// of a listing can never change through an update.
    pub async fn update_listing(
        &self,
        id: PropertyId,
        caller: UserId,
        patch: PropertyPatch,
    ) -> Result<Property> {
        patch
            .validate()
            .map_err(|e| CoreError::InvalidInput(e.to_string()))?;

        let existing = self
            .properties
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("Property".to_string()))?;
        if existing.owner != caller || patch.owner != existing.owner {
            return Err(CoreError::Forbidden(NOT_OWNER.to_string()));
        }

        // Read-then-write without a transaction; a concurrent delete can
        // slip between the two calls. See the interleaving test below.
        self.properties
            .update_by_id(id, &patch)
            .await?
            .ok_or_else(|| CoreError::NotFound("Property".to_string()))
    }

    pub async fn delete_listing(&self, id: PropertyId, caller: UserId) -> Result<()> {
        let existing = self
            .properties
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("Property".to_string()))?;
        if existing.owner != caller {
            return Err(CoreError::Forbidden(NOT_OWNER.to_string()));
        }

        if !self.properties.delete_by_id(id).await? {
            return Err(CoreError::NotFound("Property".to_string()));
        }

        info!("deleted listing {id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDatabase;
    use async_trait::async_trait;

    struct StaticStorage;

    #[async_trait]
    impl FileStorage for StaticStorage {
        async fn store(&self, filename: &str, _bytes: &[u8]) -> Result<String> {
            Ok(format!("https://files.example/{filename}"))
        }
    }

    struct FailingStorage;

    #[async_trait]
    impl FileStorage for FailingStorage {
        async fn store(&self, _filename: &str, _bytes: &[u8]) -> Result<String> {
            Err(CoreError::Upstream("storage is down".to_string()))
        }
    }

    fn service() -> ListingService {
        ListingService::new(Arc::new(MemoryDatabase::new()), Arc::new(StaticStorage))
    }

    fn draft(title: &str, address: &str) -> PropertyDraft {
        PropertyDraft {
            title: title.to_string(),
            address: address.to_string(),
            description: Some("Cosy".to_string()),
            price_per_night: 90.0,
        }
    }

    fn patch_from(property: &Property) -> PropertyPatch {
        PropertyPatch {
            title: property.title.clone(),
            address: property.address.clone(),
            description: property.description.clone(),
            price_per_night: property.price_per_night,
            image_url: property.image_url.clone(),
            owner: property.owner,
        }
    }

    async fn seeded(service: &ListingService, owner: UserId, address: &str) -> Property {
        service
            .create_listing(
                owner,
                draft("Listing", address),
                ImageSource::Url("https://img.example/p.jpg".to_string()),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_without_any_image_is_invalid() {
        let listings = service();
        let err = listings
            .create_listing(
                UserId::new(),
                draft("Loft", "Lisbon"),
                ImageSource::Url("   ".to_string()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));

        // Nothing was persisted.
        assert!(listings.list_listings(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_with_upload_goes_through_the_storage_collaborator() {
        let listings = service();
        let property = listings
            .create_listing(
                UserId::new(),
                draft("Loft", "Lisbon"),
                ImageSource::Upload {
                    filename: "loft.jpg".to_string(),
                    bytes: b"jpeg bytes".to_vec(),
                },
            )
            .await
            .unwrap();

        assert_eq!(property.image_url, "https://files.example/loft.jpg");
    }

    #[tokio::test]
    async fn storage_failure_aborts_create_with_no_partial_state() {
        let listings =
            ListingService::new(Arc::new(MemoryDatabase::new()), Arc::new(FailingStorage));

        let err = listings
            .create_listing(
                UserId::new(),
                draft("Loft", "Lisbon"),
                ImageSource::Upload {
                    filename: "loft.jpg".to_string(),
                    bytes: b"jpeg bytes".to_vec(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Upstream(_)));
        assert!(listings.list_listings(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_then_get_round_trips_every_field() {
        let listings = service();
        let owner = UserId::new();
        let created = listings
            .create_listing(
                owner,
                draft("Canal loft", "Prinsengracht 7, Amsterdam"),
                ImageSource::Url("https://img.example/loft.jpg".to_string()),
            )
            .await
            .unwrap();

        let fetched = listings.get_listing(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "Canal loft");
        assert_eq!(fetched.address, "Prinsengracht 7, Amsterdam");
        assert_eq!(fetched.description.as_deref(), Some("Cosy"));
        assert_eq!(fetched.price_per_night, 90.0);
        assert_eq!(fetched.image_url, "https://img.example/loft.jpg");
        assert_eq!(fetched.owner, owner);
    }

    #[tokio::test]
    async fn location_query_filters_case_insensitively() {
        let listings = service();
        let owner = UserId::new();
        seeded(&listings, owner, "Paris Center").await;
        seeded(&listings, owner, "Berlin").await;

        let hits = listings.list_listings(Some("par")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].address, "Paris Center");

        // Blank queries degrade to "everything".
        assert_eq!(listings.list_listings(Some("  ")).await.unwrap().len(), 2);
        assert_eq!(listings.list_listings(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn owned_listings_are_an_exact_owner_match() {
        let listings = service();
        let alice = UserId::new();
        let bob = UserId::new();
        seeded(&listings, alice, "Paris").await;
        seeded(&listings, bob, "Berlin").await;

        let owned = listings.list_owned_listings(alice).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].owner, alice);
    }

    #[tokio::test]
    async fn non_owner_cannot_update() {
        let listings = service();
        let owner = UserId::new();
        let intruder = UserId::new();
        let property = seeded(&listings, owner, "Paris").await;

        let mut patch = patch_from(&property);
        patch.title = "Hijacked".to_string();
        let err = listings
            .update_listing(property.id, intruder, patch)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));

        // The record is untouched.
        let fetched = listings.get_listing(property.id).await.unwrap();
        assert_eq!(fetched.title, property.title);
    }

    #[tokio::test]
    async fn update_cannot_reassign_the_owner() {
        let listings = service();
        let owner = UserId::new();
        let property = seeded(&listings, owner, "Paris").await;

        let mut patch = patch_from(&property);
        patch.owner = UserId::new();
        let err = listings
            .update_listing(property.id, owner, patch)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[tokio::test]
    async fn owner_update_is_applied_and_visible() {
        let listings = service();
        let owner = UserId::new();
        let property = seeded(&listings, owner, "Paris").await;

        let mut patch = patch_from(&property);
        patch.title = "Renovated".to_string();
        patch.price_per_night = 150.0;
        let updated = listings
            .update_listing(property.id, owner, patch)
            .await
            .unwrap();

        assert_eq!(updated.title, "Renovated");
        assert_eq!(updated.price_per_night, 150.0);
        assert_eq!(updated.owner, owner);

        let fetched = listings.get_listing(property.id).await.unwrap();
        assert_eq!(fetched.title, "Renovated");
    }

    #[tokio::test]
    async fn non_owner_cannot_delete() {
        let listings = service();
        let owner = UserId::new();
        let property = seeded(&listings, owner, "Paris").await;

        let err = listings
            .delete_listing(property.id, UserId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
        assert!(listings.get_listing(property.id).await.is_ok());
    }

    #[tokio::test]
    async fn owner_delete_removes_the_listing() {
        let listings = service();
        let owner = UserId::new();
        let property = seeded(&listings, owner, "Paris").await;

        listings.delete_listing(property.id, owner).await.unwrap();

        let err = listings.get_listing(property.id).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
        assert!(listings.list_listings(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_nonexistent_listing_is_not_found() {
        let listings = service();
        let err = listings
            .delete_listing(PropertyId::new(), UserId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    /// Update and delete are read-then-write with no transaction. This
    /// pins down what happens when a delete lands between an updater's
    /// read and its write: the update resolves to NotFound rather than
    /// resurrecting the record. No atomicity is claimed beyond that.
    #[tokio::test]
    async fn delete_interleaved_with_update_loses_the_record() {
        let store = Arc::new(MemoryDatabase::new());
        let listings = ListingService::new(store.clone(), Arc::new(StaticStorage));
        let owner = UserId::new();
        let property = seeded(&listings, owner, "Paris").await;

        // A delete landing directly on the store, standing in for the
        // interleaving that read-then-write allows.
        use crate::store::PropertiesRepository;
        assert!(store.delete_by_id(property.id).await.unwrap());

        let patch = patch_from(&property);
        let err = listings
            .update_listing(property.id, owner, patch)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
