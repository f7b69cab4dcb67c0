use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct HeroBanner {
    pub id: Uuid,
    pub image_url: String,
    pub link_url: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub custom_url_added: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Banner form fields. The image travels as a separate multipart part.
#[derive(Debug, Clone, Deserialize)]
pub struct BannerInput {
    pub link_url: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub custom_url_added: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerTarget {
    pub link_url: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub custom_url_added: bool,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl BannerInput {
    /// Resolves where the banner points: a custom URL when one was entered,
    /// otherwise the brand page, otherwise the category listing.
    pub fn resolve_target(&self) -> Result<BannerTarget> {
        if self.custom_url_added {
            let link_url = non_empty(&self.link_url)
                .ok_or_else(|| AppError::BadRequest("Please enter a link URL".to_string()))?;

            return Ok(BannerTarget {
                link_url,
                brand: None,
                category: None,
                custom_url_added: true,
            });
        }

        if let Some(brand) = non_empty(&self.brand) {
            return Ok(BannerTarget {
                link_url: format!("/brand/{}", brand),
                brand: Some(brand),
                category: None,
                custom_url_added: false,
            });
        }

        if let Some(category) = non_empty(&self.category) {
            return Ok(BannerTarget {
                link_url: format!("/products/{}", category),
                brand: None,
                category: Some(category),
                custom_url_added: false,
            });
        }

        Err(AppError::BadRequest(
            "Please select a brand or category".to_string(),
        ))
    }
}
