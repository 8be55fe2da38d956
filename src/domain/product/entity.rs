//! Product entity and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Physical condition of a listed product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCondition {
    New,
    Used,
    /// Given away for free
    Donation,
}

impl ProductCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Used => "used",
            Self::Donation => "donation",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "new" => Ok(Self::New),
            "used" => Ok(Self::Used),
            "donation" => Ok(Self::Donation),
            other => Err(DomainError::validation(format!(
                "Unknown product condition '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for ProductCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product listing
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Units available; never negative
    pub stock: i32,
    pub price: Decimal,
    pub condition: ProductCondition,
    /// Owning vendor
    pub user_id: i64,
    pub published_at: DateTime<Utc>,
}

/// Image variants attached to a product. The resized variants are produced by
/// an external processing step; this service only stores their names.
#[derive(Debug, Clone, Serialize)]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    pub url: String,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimized_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_name: Option<String>,
}

impl ProductImage {
    /// All stored file names for this image, for cleanup on delete
    pub fn file_names(&self) -> Vec<&str> {
        let mut names = vec![self.file_name.as_str()];
        if let Some(optimized) = &self.optimized_name {
            names.push(optimized.as_str());
        }
        if let Some(thumbnail) = &self.thumbnail_name {
            names.push(thumbnail.as_str());
        }
        names
    }
}

/// Listing row: a product plus the seller's name and primary image,
/// as shown in catalogs
#[derive(Debug, Clone, Serialize)]
pub struct ProductOverview {
    #[serde(flatten)]
    pub product: Product,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Data needed to insert a new product row
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub stock: i32,
    pub price: Decimal,
    pub condition: ProductCondition,
    pub user_id: i64,
}

/// Data needed to attach an image to a product
#[derive(Debug, Clone)]
pub struct NewProductImage {
    pub product_id: i64,
    pub url: String,
    pub file_name: String,
    pub optimized_name: Option<String>,
    pub thumbnail_name: Option<String>,
}

/// Partial update of a product; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub stock: Option<i32>,
    pub price: Option<Decimal>,
    pub condition: Option<ProductCondition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_parse() {
        assert_eq!(
            ProductCondition::parse("new").unwrap(),
            ProductCondition::New
        );
        assert_eq!(
            ProductCondition::parse("donation").unwrap(),
            ProductCondition::Donation
        );
        assert!(ProductCondition::parse("refurbished").is_err());
    }

    #[test]
    fn test_image_file_names() {
        let image = ProductImage {
            id: 1,
            product_id: 7,
            url: "/uploads/products/abc.jpg".to_string(),
            file_name: "abc.jpg".to_string(),
            optimized_name: Some("abc-opt.webp".to_string()),
            thumbnail_name: None,
        };

        assert_eq!(image.file_names(), vec!["abc.jpg", "abc-opt.webp"]);
    }
}
