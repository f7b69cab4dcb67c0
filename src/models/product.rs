use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub quantity: i32,
    pub category: String,
    pub brand: String,
    pub models: Vec<String>,
    pub colors: Vec<String>,
    pub image: String,
    pub back_image: Option<String>,
    pub discount: Decimal,
    pub discount_added: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn discounted_price(&self) -> Decimal {
        discounted_price(self.price, Some(self.discount))
    }
}

/// Price after a percentage discount. Zero or missing discounts leave the price as is.
pub fn discounted_price(price: Decimal, discount: Option<Decimal>) -> Decimal {
    match discount {
        Some(discount) if discount > Decimal::ZERO => {
            price * (Decimal::ONE - discount / Decimal::ONE_HUNDRED)
        }
        _ => price,
    }
}

pub fn validate_discount(discount: Decimal) -> Result<()> {
    if discount < Decimal::ZERO || discount > Decimal::ONE_HUNDRED {
        return Err(AppError::BadRequest(
            "discount must be between 0 and 100".to_string(),
        ));
    }
    Ok(())
}

// Request types

/// Product form fields. Image URLs are optional because the image can
/// arrive as an uploaded file alongside the form instead.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub quantity: i32,
    pub category: String,
    pub brand: String,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    pub image: Option<String>,
    pub back_image: Option<String>,
    pub discount: Option<Decimal>,
}

impl ProductInput {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("Product name is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(AppError::BadRequest("Description is required".to_string()));
        }
        if self.category.trim().is_empty() {
            return Err(AppError::BadRequest("Category is required".to_string()));
        }
        if self.brand.trim().is_empty() {
            return Err(AppError::BadRequest("Brand is required".to_string()));
        }
        if self.price < Decimal::ZERO {
            return Err(AppError::BadRequest("Price must be positive".to_string()));
        }
        if self.quantity < 0 {
            return Err(AppError::BadRequest("Quantity must be positive".to_string()));
        }
        if let Some(discount) = self.discount {
            validate_discount(discount)?;
        }
        Ok(())
    }

    pub fn has_discount(&self) -> bool {
        self.discount.is_some_and(|d| d > Decimal::ZERO)
    }
}

#[derive(Debug, Deserialize)]
pub struct DiscountRequest {
    pub discount: Decimal,
}

// Response types

#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub final_price: Decimal,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            final_price: product.discounted_price(),
            product,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MediaObject {
    pub name: String,
    pub size: Option<i64>,
    pub last_modified: Option<String>,
    pub public_url: String,
}
