use std::collections::HashMap;

use aws_sdk_s3 as s3;
use axum::extract::Multipart;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    services::storage_service,
};

#[derive(Debug)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn extension(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
            .unwrap_or(match self.content_type.as_str() {
                "image/png" => "png",
                "image/webp" => "webp",
                "image/gif" => "gif",
                _ => "jpg",
            })
    }
}

/// Multipart form: a `data` part holding the JSON fields plus any number of
/// file parts keyed by their field name.
#[derive(Debug)]
pub struct FormParts<T> {
    pub data: T,
    pub images: HashMap<String, ImageUpload>,
}

pub fn validate_image(content_type: &str, size: usize, max_size: usize) -> Result<()> {
    if !content_type.starts_with("image/") {
        return Err(AppError::BadRequest(
            "Please select a valid image file".to_string(),
        ));
    }

    if size == 0 {
        return Err(AppError::BadRequest("Image file is empty".to_string()));
    }

    if size > max_size {
        return Err(AppError::BadRequest(format!(
            "Image size should be less than {}MB",
            max_size / (1024 * 1024)
        )));
    }

    Ok(())
}

pub async fn read_form<T: DeserializeOwned>(
    mut multipart: Multipart,
    max_image_size: usize,
) -> Result<FormParts<T>> {
    let mut data = None;
    let mut images = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "data" {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid form data: {}", e)))?;
            let parsed = serde_json::from_str::<T>(&text)
                .map_err(|e| AppError::BadRequest(format!("Invalid form data: {}", e)))?;
            data = Some(parsed);
            continue;
        }

        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read {}: {}", name, e)))?;

        // Browsers send an empty part for an untouched file input.
        if file_name.is_empty() && bytes.is_empty() {
            continue;
        }

        validate_image(&content_type, bytes.len(), max_image_size)?;

        images.insert(
            name,
            ImageUpload {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            },
        );
    }

    let data = data.ok_or_else(|| AppError::BadRequest("data part is required".to_string()))?;

    Ok(FormParts { data, images })
}

pub fn banner_object_name(file_name: &str, millis: i64) -> String {
    let file_name = file_name.replace(['/', '\\'], "_");
    format!("banner-{}-{}", millis, file_name)
}

pub fn product_object_name(prefix: &str, upload: &ImageUpload, millis: i64) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}-{}.{}", prefix, millis, &suffix[..6], upload.extension())
}

/// Uploads and returns the object's public URL.
pub async fn store_image(
    client: &s3::Client,
    bucket: &str,
    assets_url: &str,
    key: &str,
    upload: ImageUpload,
) -> Result<String> {
    storage_service::upload_object(client, bucket, key, &upload.content_type, upload.bytes)
        .await
        .map_err(|e| AppError::StorageError(format!("Failed to upload image: {}", e)))?;

    tracing::info!("Uploaded {}/{}", bucket, key);

    Ok(storage_service::public_url(assets_url, bucket, key))
}
