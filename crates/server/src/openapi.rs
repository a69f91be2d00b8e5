use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

/// Stored item as returned by the API.
#[derive(ToSchema)]
pub struct ItemDoc {
    /// Integer (memory store) or UUID string (postgres store).
    #[schema(example = "1")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Empty, a site-relative path or an absolute URL.
    pub image: String,
}

#[derive(ToSchema)]
pub struct CreateItemDoc {
    pub name: String,
    pub description: Option<String>,
    /// Number or decimal text, >= 0.
    pub price: String,
    /// File part (multipart) or an existing reference.
    pub image: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::metrics,
        crate::routes::items::create,
        crate::routes::items::list,
        crate::routes::items::get,
        crate::routes::items::delete,
    ),
    components(schemas(HealthResponse, ItemDoc, CreateItemDoc)),
    tags((name = "health"), (name = "items"))
)]
pub struct ApiDoc;
