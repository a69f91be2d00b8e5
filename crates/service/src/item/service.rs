use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use super::domain::{ImageInput, IngestPolicy, Item, NewItem, PriceInput, SubmitFields};
use super::repository::ItemStore;
use crate::errors::ServiceError;
use crate::image::{storage_name, ImageHost};
use crate::observability::{
    IMAGE_UPLOADS_TOTAL, IMAGE_UPLOAD_FAILURES_TOTAL, ITEMS_CREATED_TOTAL, ITEMS_DELETED_TOTAL,
    VALIDATION_REJECTIONS_TOTAL,
};

/// Ingestion pipeline: validate, resolve image, insert. Stops at the first failure.
pub struct ItemService {
    store: Arc<dyn ItemStore>,
    images: Arc<dyn ImageHost>,
    policy: IngestPolicy,
}

impl ItemService {
    pub fn new(store: Arc<dyn ItemStore>, images: Arc<dyn ImageHost>, policy: IngestPolicy) -> Self {
        Self { store, images, policy }
    }

    pub fn policy(&self) -> IngestPolicy { self.policy }

    /// Validate a submission, upload its image if one was sent, and store the result.
    ///
    /// Nothing is written unless validation and the image step both succeed.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::image::local::LocalDiskHost;
    /// use service::item::ItemService;
    /// use service::item::domain::{ImageInput, IngestPolicy, ItemId, PriceInput, SubmitFields};
    /// use service::item::repository::memory::MemoryItemStore;
    /// let svc = ItemService::new(
    ///     Arc::new(MemoryItemStore::new()),
    ///     Arc::new(LocalDiskHost::new("uploads", "/uploads")),
    ///     IngestPolicy::default(),
    /// );
    /// let fields = SubmitFields {
    ///     name: Some("Drone X".into()),
    ///     description: Some("quad".into()),
    ///     price: Some(PriceInput::Text("199.99".into())),
    /// };
    /// let item = tokio_test::block_on(svc.submit(fields, ImageInput::Absent)).unwrap();
    /// assert_eq!(item.id, ItemId::Seq(1));
    /// assert_eq!(item.price, 199.99);
    /// assert_eq!(item.image, "");
    /// ```
    #[instrument(skip(self, submission, image), fields(store = self.store.backend(), images = self.images.backend()))]
    pub async fn submit(&self, submission: SubmitFields, image: ImageInput) -> Result<Item, ServiceError> {
        let (record, image) = match self.validate(submission, image) {
            Ok(v) => v,
            Err(e) => {
                VALIDATION_REJECTIONS_TOTAL.inc();
                warn!(error = %e, "submission_rejected");
                return Err(e);
            }
        };

        let image_ref = self.resolve_image(image).await?;
        let record = NewItem { image: image_ref, ..record };

        let id = self.store.insert(&record).await.map_err(|e| {
            error!(error = %e, "item_insert_failed");
            e
        })?;
        ITEMS_CREATED_TOTAL.inc();
        info!(%id, name = %record.name, image = %record.image, "item_created");
        Ok(record.with_id(id))
    }

    /// Field rules, applied before any side effect. Returns the record with an empty image.
    fn validate(&self, fields: SubmitFields, image: ImageInput) -> Result<(NewItem, ImageInput), ServiceError> {
        let name = models::item::validate_name(fields.name.as_deref().unwrap_or_default())?;
        let price = match fields.price {
            None => return Err(ServiceError::Validation("price required".into())),
            Some(PriceInput::Number(v)) => models::item::check_price(v)?,
            Some(PriceInput::Text(s)) => models::item::parse_price(&s)?,
        };

        let image = image.normalize();
        match &image {
            ImageInput::Absent if self.policy.require_image => {
                return Err(ServiceError::Validation("image required".into()));
            }
            ImageInput::Hosted(r) => models::item::validate_image_ref(r)?,
            _ => {}
        }

        let record = NewItem { name, description: fields.description.unwrap_or_default(), price, image: String::new() };
        Ok((record, image))
    }

    async fn resolve_image(&self, image: ImageInput) -> Result<String, ServiceError> {
        match image {
            ImageInput::Absent => Ok(String::new()),
            ImageInput::Hosted(r) => Ok(r),
            ImageInput::Upload { bytes, filename } => {
                let name = storage_name(&filename);
                debug!(original = %filename, storage_name = %name, size = bytes.len(), "image_upload_start");
                IMAGE_UPLOADS_TOTAL.inc();
                let reference = self
                    .images
                    .upload(bytes, &name)
                    .await
                    .and_then(|r| {
                        // a reply we could not dereference later counts as a backend fault
                        models::item::validate_image_ref(&r)
                            .map(|_| r)
                            .map_err(|e| ServiceError::Upstream(format!("image backend returned unusable reference: {e}")))
                    });
                reference.map_err(|e| {
                    IMAGE_UPLOAD_FAILURES_TOTAL.inc();
                    error!(error = %e, storage_name = %name, "image_upload_failed");
                    e
                })
            }
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Item>, ServiceError> {
        self.store.find_all().await
    }

    /// Look up by the raw path segment; malformed ids are validation errors.
    pub async fn get_by_id(&self, raw_id: &str) -> Result<Item, ServiceError> {
        let id = self.store.parse_id(raw_id)?;
        self.store.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("item"))
    }

    /// Idempotent: an unknown id is not an error. Returns whether something was removed.
    #[instrument(skip(self), fields(store = self.store.backend()))]
    pub async fn delete_by_id(&self, raw_id: &str) -> Result<bool, ServiceError> {
        let id = self.store.parse_id(raw_id)?;
        let deleted = self.store.delete_by_id(id).await?;
        if deleted {
            ITEMS_DELETED_TOTAL.inc();
            info!(%id, "item_deleted");
        } else {
            debug!(%id, "delete_of_absent_item");
        }
        Ok(deleted)
    }
}
