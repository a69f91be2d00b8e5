use once_cell::sync::Lazy;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

use crate::errors::ServiceError;

// Prometheus metrics (default registry)
pub static ITEMS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "itemhub_items_created_total",
        "Items persisted by the ingestion pipeline"
    )
    .expect("register items_created_total")
});

pub static ITEMS_DELETED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "itemhub_items_deleted_total",
        "Delete requests that removed an item"
    )
    .expect("register items_deleted_total")
});

pub static VALIDATION_REJECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "itemhub_validation_rejections_total",
        "Submissions rejected before any upload or insert"
    )
    .expect("register validation_rejections_total")
});

pub static IMAGE_UPLOADS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "itemhub_image_uploads_total",
        "Image backend upload attempts"
    )
    .expect("register image_uploads_total")
});

pub static IMAGE_UPLOAD_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "itemhub_image_upload_failures_total",
        "Image backend upload failures"
    )
    .expect("register image_upload_failures_total")
});

/// Force registration so every counter shows up in the first scrape.
pub fn init() {
    Lazy::force(&ITEMS_CREATED_TOTAL);
    Lazy::force(&ITEMS_DELETED_TOTAL);
    Lazy::force(&VALIDATION_REJECTIONS_TOTAL);
    Lazy::force(&IMAGE_UPLOADS_TOTAL);
    Lazy::force(&IMAGE_UPLOAD_FAILURES_TOTAL);
}

/// Prometheus text exposition of the default registry.
pub fn encode_metrics() -> Result<String, ServiceError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| ServiceError::Upstream(format!("metrics encode error: {e}")))?;
    String::from_utf8(buffer).map_err(|e| ServiceError::Upstream(format!("metrics encode error: {e}")))
}
