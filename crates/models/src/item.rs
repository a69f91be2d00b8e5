use sea_orm::{entity::prelude::*, DatabaseConnection, NotSet, QueryOrder, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

pub const NAME_MAX_LEN: usize = 256;
pub const IMAGE_MAX_LEN: usize = 2048;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: f64,
    pub image: String,
    pub created_at: DateTimeWithTimeZone,
    /// Assigned by the database; defines listing order.
    pub seq: i64,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match *self {}
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Trimmed name, or a validation error when blank or over the column width.
pub fn validate_name(name: &str) -> Result<String, errors::ModelError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(errors::ModelError::Validation("name required".into()));
    }
    if trimmed.chars().count() > NAME_MAX_LEN {
        return Err(errors::ModelError::Validation(format!("name longer than {NAME_MAX_LEN} characters")));
    }
    Ok(trimmed.to_string())
}

/// Prices must be finite and non-negative. `-0` collapses to `0`.
pub fn check_price(price: f64) -> Result<f64, errors::ModelError> {
    if !price.is_finite() || price < 0.0 {
        return Err(errors::ModelError::Validation("price required".into()));
    }
    Ok(if price == 0.0 { 0.0 } else { price })
}

/// Parse a textual price such as `"199.99"`.
pub fn parse_price(raw: &str) -> Result<f64, errors::ModelError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| errors::ModelError::Validation("price required".into()))?;
    check_price(value)
}

/// An image reference is empty, a site-relative path, or an absolute http(s) URL.
pub fn validate_image_ref(image: &str) -> Result<(), errors::ModelError> {
    if image.is_empty() {
        return Ok(());
    }
    if image.len() > IMAGE_MAX_LEN {
        return Err(errors::ModelError::Validation("image reference too long".into()));
    }
    let lower = image.to_ascii_lowercase();
    let is_path = image.starts_with('/') && !image.starts_with("//");
    let is_url = lower.starts_with("http://") || lower.starts_with("https://");
    if !(is_path || is_url) {
        return Err(errors::ModelError::Validation("image must be a path or http(s) url".into()));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    name: &str,
    description: &str,
    price: f64,
    image: &str,
) -> Result<Model, errors::ModelError> {
    let name = validate_name(name)?;
    let price = check_price(price)?;
    validate_image_ref(image)?;

    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(description.to_string()),
        price: Set(price),
        image: Set(image.to_string()),
        created_at: Set(Utc::now().into()),
        seq: NotSet,
    };
    Ok(am.insert(db).await?)
}

/// All items in insertion order.
pub async fn list_ordered(db: &DatabaseConnection) -> Result<Vec<Model>, errors::ModelError> {
    let rows = Entity::find()
        .order_by_asc(Column::Seq)
        .all(db)
        .await?;
    Ok(rows)
}

pub async fn find(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Ok(Entity::find_by_id(id).one(db).await?)
}

/// Returns whether a row was removed.
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<bool, errors::ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}
