use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{BannerInput, HeroBanner},
    queries::banner_queries,
    services::{query_cache::BANNERS, storage_service, upload},
};

pub async fn list_banners(State(state): State<AppState>) -> Result<Json<Vec<HeroBanner>>> {
    let banners = state
        .cache
        .banners
        .get_or_fetch(BANNERS, async {
            Ok(Arc::new(banner_queries::get_active_banners(&state.db).await?))
        })
        .await?;

    Ok(Json(banners.as_ref().clone()))
}

pub async fn create_banner(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<HeroBanner>)> {
    let mut form = upload::read_form::<BannerInput>(multipart, state.storage.max_image_size).await?;
    let target = form.data.resolve_target()?;
    let image = form
        .images
        .remove("image")
        .ok_or_else(|| AppError::BadRequest("Banner image is required".to_string()))?;

    let key = upload::banner_object_name(&image.file_name, chrono::Utc::now().timestamp_millis());
    let bucket = &state.storage.banner_bucket;
    let image_url = upload::store_image(
        &state.s3_client,
        bucket,
        &state.storage.assets_url,
        &key,
        image,
    )
    .await?;

    let banner = match banner_queries::insert_banner(&state.db, &image_url, &target).await {
        Ok(banner) => banner,
        Err(e) => {
            // Don't leave an orphaned upload behind.
            if let Err(delete_err) =
                storage_service::delete_single_object(&state.s3_client, bucket, &key).await
            {
                tracing::error!("Failed to remove uploaded banner {}: {}", key, delete_err);
            }
            return Err(e);
        }
    };

    state.cache.banners.invalidate();
    tracing::info!("Created banner {} linking to {}", banner.id, banner.link_url);

    Ok((StatusCode::CREATED, Json(banner)))
}

pub async fn update_banner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<HeroBanner>> {
    let mut form = upload::read_form::<BannerInput>(multipart, state.storage.max_image_size).await?;
    let target = form.data.resolve_target()?;

    let current = banner_queries::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Banner {} not found", id)))?;

    let bucket = &state.storage.banner_bucket;
    let mut image_url = None;

    if let Some(image) = form.images.remove("image") {
        storage_service::delete_by_url_best_effort(&state.s3_client, bucket, &current.image_url)
            .await;

        let key =
            upload::banner_object_name(&image.file_name, chrono::Utc::now().timestamp_millis());
        image_url = Some(
            upload::store_image(
                &state.s3_client,
                bucket,
                &state.storage.assets_url,
                &key,
                image,
            )
            .await?,
        );
    }

    let banner = banner_queries::update_banner(&state.db, id, &target, image_url.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Banner {} not found", id)))?;

    state.cache.banners.invalidate();

    Ok(Json(banner))
}

pub async fn delete_banner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let banner = banner_queries::soft_delete_banner(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Banner {} not found", id)))?;

    state.cache.banners.invalidate();

    storage_service::delete_by_url_best_effort(
        &state.s3_client,
        &state.storage.banner_bucket,
        &banner.image_url,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
