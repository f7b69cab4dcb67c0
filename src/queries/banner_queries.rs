use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{BannerTarget, HeroBanner},
};

pub async fn get_active_banners(pool: &PgPool) -> Result<Vec<HeroBanner>> {
    let banners = sqlx::query_as::<_, HeroBanner>(
        "SELECT * FROM hero WHERE is_deleted = false ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(banners)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<HeroBanner>> {
    let banner = sqlx::query_as::<_, HeroBanner>(
        "SELECT * FROM hero WHERE id = $1 AND is_deleted = false",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(banner)
}

pub async fn insert_banner(
    pool: &PgPool,
    image_url: &str,
    target: &BannerTarget,
) -> Result<HeroBanner> {
    let banner = sqlx::query_as::<_, HeroBanner>(
        r#"
        INSERT INTO hero (image_url, link_url, brand, category, custom_url_added)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(image_url)
    .bind(&target.link_url)
    .bind(&target.brand)
    .bind(&target.category)
    .bind(target.custom_url_added)
    .fetch_one(pool)
    .await?;

    Ok(banner)
}

pub async fn update_banner(
    pool: &PgPool,
    id: Uuid,
    target: &BannerTarget,
    image_url: Option<&str>,
) -> Result<Option<HeroBanner>> {
    let banner = sqlx::query_as::<_, HeroBanner>(
        r#"
        UPDATE hero
        SET
            link_url = $1,
            brand = $2,
            category = $3,
            custom_url_added = $4,
            image_url = COALESCE($5, image_url),
            updated_at = NOW()
        WHERE id = $6 AND is_deleted = false
        RETURNING *
        "#,
    )
    .bind(&target.link_url)
    .bind(&target.brand)
    .bind(&target.category)
    .bind(target.custom_url_added)
    .bind(image_url)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(banner)
}

pub async fn soft_delete_banner(pool: &PgPool, id: Uuid) -> Result<Option<HeroBanner>> {
    let banner = sqlx::query_as::<_, HeroBanner>(
        "UPDATE hero SET is_deleted = true, updated_at = NOW()
         WHERE id = $1 AND is_deleted = false
         RETURNING *",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(banner)
}
