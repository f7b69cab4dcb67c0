use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{DiscountRequest, ListQuery, MediaObject, ProductInput, ProductView, validate_discount},
    queries::products_queries,
    services::{
        listing::{self, PRODUCTS_PAGE_SIZE, Page},
        query_cache::PRODUCTS,
        storage_service,
        upload::{self, FormParts},
    },
};

const MEDIA_LIST_LIMIT: i32 = 100;

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Page<ProductView>>> {
    let products = state
        .cache
        .products
        .get_or_fetch(PRODUCTS, async {
            Ok(Arc::new(products_queries::get_active_products(&state.db).await?))
        })
        .await?;

    let search = params.search.unwrap_or_default();
    let filtered: Vec<_> = products
        .iter()
        .filter(|p| listing::matches_search(&[&p.name], &search))
        .cloned()
        .collect();

    let page = listing::paginate(filtered, params.page, PRODUCTS_PAGE_SIZE);

    Ok(Json(page.map(ProductView::from)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductView>> {
    let product = state
        .cache
        .product_by_id
        .get_or_fetch(id, async {
            products_queries::find_by_id(&state.db, id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))
        })
        .await?;

    Ok(Json(product.into()))
}

/// Uploads the `image` and `back_image` parts, if present, and returns their URLs.
async fn store_product_images(
    state: &AppState,
    form: &mut FormParts<ProductInput>,
) -> Result<(Option<String>, Option<String>)> {
    let millis = chrono::Utc::now().timestamp_millis();
    let mut urls = [None, None];

    for (slot, (field, prefix)) in [("image", "front-"), ("back_image", "back-")]
        .into_iter()
        .enumerate()
    {
        if let Some(file) = form.images.remove(field) {
            let key = upload::product_object_name(prefix, &file, millis);
            let url = upload::store_image(
                &state.s3_client,
                &state.storage.products_bucket,
                &state.storage.assets_url,
                &key,
                file,
            )
            .await?;
            urls[slot] = Some(url);
        }
    }

    let [image, back_image] = urls;
    Ok((image, back_image))
}

pub async fn create_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ProductView>)> {
    let mut form =
        upload::read_form::<ProductInput>(multipart, state.storage.max_image_size).await?;
    form.data.validate()?;

    if !form.images.contains_key("image") && form.data.image.is_none() {
        return Err(AppError::BadRequest("Product image is required".to_string()));
    }

    let (uploaded_image, uploaded_back) = store_product_images(&state, &mut form).await?;

    let input = form.data;
    let image = uploaded_image
        .or_else(|| input.image.clone())
        .unwrap_or_default();
    let back_image = uploaded_back.or_else(|| input.back_image.clone());

    let product =
        products_queries::create_product(&state.db, &input, &image, back_image.as_deref()).await?;

    state.cache.invalidate_products();
    tracing::info!("Created product {} ({})", product.id, product.name);

    Ok((StatusCode::CREATED, Json(product.into())))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ProductView>> {
    let mut form =
        upload::read_form::<ProductInput>(multipart, state.storage.max_image_size).await?;
    form.data.validate()?;

    let current = products_queries::find_by_id(&state.db, id).await?;
    if current.is_none_or(|product| product.is_deleted) {
        return Err(AppError::NotFound(format!("Product {} not found", id)));
    }

    let (image, back_image) = store_product_images(&state, &mut form).await?;

    let product = products_queries::update_product(
        &state.db,
        id,
        &form.data,
        image.as_deref(),
        back_image.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;

    state.cache.invalidate_products();

    Ok(Json(product.into()))
}

pub async fn set_discount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DiscountRequest>,
) -> Result<Json<ProductView>> {
    validate_discount(payload.discount)?;

    let product = products_queries::set_discount(&state.db, id, payload.discount)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;

    state.cache.invalidate_products();

    Ok(Json(product.into()))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    products_queries::soft_delete_product(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;

    state.cache.invalidate_products();
    tracing::info!("Soft deleted product {}", id);

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_media(State(state): State<AppState>) -> Result<Json<Vec<MediaObject>>> {
    let objects = storage_service::list_objects(
        &state.s3_client,
        &state.storage.products_bucket,
        &state.storage.assets_url,
        MEDIA_LIST_LIMIT,
    )
    .await
    .map_err(|e| AppError::StorageError(format!("Failed to list product media: {}", e)))?;

    Ok(Json(objects))
}
