use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{Product, ProductInput},
};

pub async fn get_active_products(pool: &PgPool) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE is_deleted = false ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(products)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

pub async fn create_product(
    pool: &PgPool,
    input: &ProductInput,
    image: &str,
    back_image: Option<&str>,
) -> Result<Product> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (
            name, price, description, quantity, category, brand,
            models, colors, image, back_image, discount, discount_added, is_deleted
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, false)
        RETURNING *
        "#,
    )
    .bind(&input.name)
    .bind(input.price)
    .bind(&input.description)
    .bind(input.quantity)
    .bind(&input.category)
    .bind(&input.brand)
    .bind(&input.models)
    .bind(&input.colors)
    .bind(image)
    .bind(back_image)
    .bind(input.discount.unwrap_or(Decimal::ZERO))
    .bind(input.has_discount())
    .fetch_one(pool)
    .await?;

    Ok(product)
}

/// Image columns are only overwritten when a new URL is given. Soft-deleted
/// products are left alone and come back as `None`.
pub async fn update_product(
    pool: &PgPool,
    id: Uuid,
    input: &ProductInput,
    image: Option<&str>,
    back_image: Option<&str>,
) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET
            name = $1,
            price = $2,
            description = $3,
            quantity = $4,
            category = $5,
            brand = $6,
            models = $7,
            colors = $8,
            discount = $9,
            discount_added = $10,
            image = COALESCE($11, image),
            back_image = COALESCE($12, back_image),
            updated_at = NOW()
        WHERE id = $13 AND is_deleted = false
        RETURNING *
        "#,
    )
    .bind(&input.name)
    .bind(input.price)
    .bind(&input.description)
    .bind(input.quantity)
    .bind(&input.category)
    .bind(&input.brand)
    .bind(&input.models)
    .bind(&input.colors)
    .bind(input.discount.unwrap_or(Decimal::ZERO))
    .bind(input.has_discount())
    .bind(image)
    .bind(back_image)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(product)
}

pub async fn set_discount(pool: &PgPool, id: Uuid, discount: Decimal) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET discount = $1, discount_added = $2, updated_at = NOW()
        WHERE id = $3 AND is_deleted = false
        RETURNING *
        "#,
    )
    .bind(discount)
    .bind(discount > Decimal::ZERO)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(product)
}

pub async fn soft_delete_product(pool: &PgPool, id: Uuid) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET is_deleted = true, updated_at = NOW()
        WHERE id = $1 AND is_deleted = false
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(product)
}

pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;

    Ok(products)
}
