use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header, StatusCode},
    Json,
};
use serde::Deserialize;
use tracing::{debug, info};

use service::item::domain::{ImageInput, Item, PriceInput, SubmitFields};

use super::ServerState;
use crate::errors::JsonApiError;

/// JSON form of a submission; `image` may only reference an already hosted image.
#[derive(Debug, Default, Deserialize)]
pub struct CreateItemJson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<PriceInput>,
    #[serde(default)]
    pub image: Option<String>,
}

impl CreateItemJson {
    fn into_parts(self) -> (SubmitFields, ImageInput) {
        let fields = SubmitFields { name: self.name, description: self.description, price: self.price };
        let image = self.image.map(ImageInput::Hosted).unwrap_or_default();
        (fields, image)
    }
}

/// Unreadable or mistyped submissions are validation failures; only an oversized body keeps 413.
fn bad_body(status: StatusCode, detail: String) -> JsonApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        JsonApiError::new(status, "Payload Too Large", Some(detail))
    } else {
        JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(detail))
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<(SubmitFields, ImageInput), JsonApiError> {
    let mut fields = SubmitFields::default();
    let mut image = ImageInput::Absent;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_body(e.status(), e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else { continue };
        match name.as_str() {
            "image" => {
                // a file part is an upload, a plain text part an existing reference
                image = match field.file_name().map(str::to_string) {
                    Some(filename) => {
                        let bytes = field.bytes().await.map_err(|e| bad_body(e.status(), e.body_text()))?;
                        ImageInput::Upload { bytes: bytes.to_vec(), filename }
                    }
                    None => ImageInput::Hosted(field.text().await.map_err(|e| bad_body(e.status(), e.body_text()))?),
                };
            }
            "name" | "description" | "price" => {
                let text = field.text().await.map_err(|e| bad_body(e.status(), e.body_text()))?;
                match name.as_str() {
                    "name" => fields.name = Some(text),
                    "description" => fields.description = Some(text),
                    _ => fields.price = Some(PriceInput::Text(text)),
                }
            }
            other => debug!(field = %other, "ignoring unknown form field"),
        }
    }
    Ok((fields, image))
}

/// Multipart when the client says so, JSON otherwise.
async fn read_submission(req: Request, state: &ServerState) -> Result<(SubmitFields, ImageInput), JsonApiError> {
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false);

    if is_multipart {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| bad_body(e.status(), e.body_text()))?;
        read_multipart(multipart).await
    } else {
        let Json(body) = Json::<CreateItemJson>::from_request(req, state)
            .await
            .map_err(|e| bad_body(e.status(), e.body_text()))?;
        Ok(body.into_parts())
    }
}

#[utoipa::path(post, path = "/items", tag = "items",
    request_body(content = crate::openapi::CreateItemDoc, description = "multipart/form-data or application/json"),
    responses(
        (status = 201, description = "Item stored", body = crate::openapi::ItemDoc),
        (status = 400, description = "Validation failed"),
        (status = 500, description = "Image backend or store failed")
    )
)]
pub async fn create(State(state): State<ServerState>, req: Request) -> Result<(StatusCode, Json<Item>), JsonApiError> {
    let (fields, image) = read_submission(req, &state).await?;
    let item = state.items.submit(fields, image).await?;
    info!(id = %item.id, "item_created_response");
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(get, path = "/items", tag = "items",
    responses((status = 200, description = "All items in insertion order", body = [crate::openapi::ItemDoc]))
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Item>>, JsonApiError> {
    Ok(Json(state.items.list_all().await?))
}

#[utoipa::path(get, path = "/items/{id}", tag = "items",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item", body = crate::openapi::ItemDoc),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No such item")
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Item>, JsonApiError> {
    Ok(Json(state.items.get_by_id(&id).await?))
}

#[utoipa::path(delete, path = "/items/{id}", tag = "items",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 204, description = "Deleted, or already absent"),
        (status = 400, description = "Malformed id")
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<String>) -> Result<StatusCode, JsonApiError> {
    let removed = state.items.delete_by_id(&id).await?;
    debug!(%id, removed, "item_delete_response");
    Ok(StatusCode::NO_CONTENT)
}
