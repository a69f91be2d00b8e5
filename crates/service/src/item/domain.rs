use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier assigned by the store on insert. One scheme per backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    /// Memory store: 1, 2, 3, ... never reused.
    Seq(u64),
    /// Postgres store: UUID generated on insert.
    Key(Uuid),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Seq(n) => write!(f, "{n}"),
            ItemId::Key(k) => write!(f, "{k}"),
        }
    }
}

/// Canonical stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// `""` for no image, otherwise a site-relative path or http(s) URL.
    pub image: String,
}

/// Validated record awaiting an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: String,
}

impl NewItem {
    pub fn with_id(self, id: ItemId) -> Item {
        Item { id, name: self.name, description: self.description, price: self.price, image: self.image }
    }
}

/// Price as submitted: JSON number or form/JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

/// Raw submission fields before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmitFields {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<PriceInput>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ImageInput {
    #[default]
    Absent,
    /// Raw bytes to forward to the image backend.
    Upload { bytes: Vec<u8>, filename: String },
    /// Reference that is already hosted somewhere; stored as-is.
    Hosted(String),
}

impl ImageInput {
    /// Empty uploads and blank references mean "no image".
    pub fn normalize(self) -> Self {
        match self {
            ImageInput::Upload { bytes, .. } if bytes.is_empty() => ImageInput::Absent,
            ImageInput::Hosted(r) if r.trim().is_empty() => ImageInput::Absent,
            ImageInput::Hosted(r) => ImageInput::Hosted(r.trim().to_string()),
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestPolicy {
    /// Reject submissions without an image.
    pub require_image: bool,
}
