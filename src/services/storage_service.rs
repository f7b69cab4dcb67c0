use aws_sdk_s3 as s3;
use aws_sdk_s3::primitives::ByteStream;

use crate::models::MediaObject;

pub async fn upload_object(
    client: &s3::Client,
    bucket: &str,
    key: &str,
    content_type: &str,
    body: Vec<u8>,
) -> Result<(), s3::Error> {
    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .content_type(content_type)
        .cache_control("max-age=3600")
        .body(ByteStream::from(body))
        .send()
        .await?;

    Ok(())
}

pub async fn delete_single_object(
    client: &s3::Client,
    bucket: &str,
    key: &str,
) -> Result<(), s3::Error> {
    client
        .delete_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await?;

    Ok(())
}

/// Removes the object behind `public_url`, logging instead of failing. The
/// record mutation that triggered it has already happened or must not be
/// blocked by storage.
pub async fn delete_by_url_best_effort(client: &s3::Client, bucket: &str, public_url: &str) {
    let Some(key) = object_name_from_url(public_url) else {
        tracing::warn!("Could not derive object name from {}", public_url);
        return;
    };

    match delete_single_object(client, bucket, key).await {
        Ok(()) => tracing::info!("Deleted object {}/{}", bucket, key),
        Err(e) => tracing::error!("Failed to delete object {}/{}: {}", bucket, key, e),
    }
}

pub async fn check_bucket(client: &s3::Client, bucket: &str) -> Result<(), s3::Error> {
    client.head_bucket().bucket(bucket).send().await?;
    Ok(())
}

pub async fn list_objects(
    client: &s3::Client,
    bucket: &str,
    assets_url: &str,
    limit: i32,
) -> Result<Vec<MediaObject>, s3::Error> {
    let response = client
        .list_objects_v2()
        .bucket(bucket)
        .max_keys(limit)
        .send()
        .await?;

    let objects = response
        .contents
        .unwrap_or_default()
        .into_iter()
        .filter_map(|object| {
            let name = object.key?;
            Some(MediaObject {
                public_url: public_url(assets_url, bucket, &name),
                size: object.size,
                last_modified: object.last_modified.map(|t| t.to_string()),
                name,
            })
        })
        .collect();

    Ok(objects)
}

pub fn public_url(assets_url: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", assets_url.trim_end_matches('/'), bucket, key)
}

/// Objects live flat in their bucket, so the last path segment of the public
/// URL is the object key.
pub fn object_name_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/').next().filter(|name| !name.is_empty())
}
