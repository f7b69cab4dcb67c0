use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{
        AcceptOrderResponse, Customer, Order, OrderItem, OrderItemView, OrderView,
        plan_stock_updates,
    },
    queries::products_queries,
};

pub async fn get_active_orders(pool: &PgPool) -> Result<Vec<OrderView>> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE is_deleted = false ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    attach_details(pool, orders).await
}

pub async fn find_order(pool: &PgPool, id: Uuid) -> Result<Option<OrderView>> {
    let order = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE id = $1 AND is_deleted = false",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(order) = order else {
        return Ok(None);
    };

    Ok(attach_details(pool, vec![order]).await?.pop())
}

pub async fn get_items_for_orders(pool: &PgPool, order_ids: &[Uuid]) -> Result<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items
         WHERE order_id = ANY($1) AND is_deleted = false
         ORDER BY created_at ASC",
    )
    .bind(order_ids)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

async fn get_customers_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Customer>> {
    let customers = sqlx::query_as::<_, Customer>(
        "SELECT id, email, phone_number, address, is_deleted, created_date
         FROM users WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(customers)
}

/// Joins customers, line items and their products onto `orders` with one
/// batched query per table.
async fn attach_details(pool: &PgPool, orders: Vec<Order>) -> Result<Vec<OrderView>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let all_items = get_items_for_orders(pool, &order_ids).await?;

    let mut product_ids: Vec<Uuid> = all_items.iter().map(|i| i.product_id).collect();
    product_ids.sort_unstable();
    product_ids.dedup();
    let products: HashMap<Uuid, _> = products_queries::find_by_ids(pool, &product_ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let user_ids: Vec<Uuid> = orders.iter().filter_map(|o| o.user_id).collect();
    let customers: HashMap<Uuid, Customer> = get_customers_by_ids(pool, &user_ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let mut items_map: HashMap<Uuid, Vec<OrderItemView>> = HashMap::new();
    for item in all_items {
        let product = products.get(&item.product_id).cloned();
        items_map
            .entry(item.order_id)
            .or_default()
            .push(OrderItemView { item, product });
    }

    let views = orders
        .into_iter()
        .map(|order| OrderView {
            customer: order.user_id.and_then(|id| customers.get(&id).cloned()),
            items: items_map.remove(&order.id).unwrap_or_default(),
            order,
        })
        .collect();

    Ok(views)
}

/// Decrements stock for every line item and marks the order completed, all in
/// one transaction. The order row is locked first, so a second acceptance of
/// the same order waits and then sees it already completed.
pub async fn accept_order(pool: &PgPool, id: Uuid, track_id: &str) -> Result<AcceptOrderResponse> {
    let mut tx = pool.begin().await?;

    let order = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE id = $1 AND is_deleted = false FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))?;

    if order.status {
        return Err(AppError::Conflict(format!(
            "Order {} is already completed",
            id
        )));
    }

    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items
         WHERE order_id = $1 AND is_deleted = false
         ORDER BY created_at ASC",
    )
    .bind(id)
    .fetch_all(&mut *tx)
    .await?;

    if items.is_empty() {
        return Err(AppError::BadRequest(
            "No order items found for this order".to_string(),
        ));
    }

    let mut product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    product_ids.sort_unstable();
    product_ids.dedup();

    // Lock in id order so concurrent acceptances of overlapping orders can't deadlock.
    let stock: HashMap<Uuid, i32> = sqlx::query_as::<_, (Uuid, i32)>(
        "SELECT id, quantity FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE",
    )
    .bind(&product_ids)
    .fetch_all(&mut *tx)
    .await?
    .into_iter()
    .collect();

    let updates = plan_stock_updates(&items, &stock)?;

    for update in &updates {
        if update.quantity < 0 {
            tracing::warn!(
                "Product {} stock goes negative ({}) accepting order {}",
                update.product_id,
                update.quantity,
                id
            );
        }

        sqlx::query("UPDATE products SET quantity = $1, updated_at = NOW() WHERE id = $2")
            .bind(update.quantity)
            .bind(update.product_id)
            .execute(&mut *tx)
            .await?;
    }

    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET status = true, track_id = $1, updated_at = NOW()
         WHERE id = $2
         RETURNING *",
    )
    .bind(track_id)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(AcceptOrderResponse {
        order,
        updated_products: updates,
    })
}

/// Back to pending with the tracking id cleared. Stock is left as is.
pub async fn cancel_order(pool: &PgPool, id: Uuid) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET status = false, track_id = '', updated_at = NOW()
         WHERE id = $1 AND is_deleted = false
         RETURNING *",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    async fn seed_customer(pool: &PgPool, email: &str) -> Uuid {
        sqlx::query_scalar::<_, Uuid>("INSERT INTO users (email) VALUES ($1) RETURNING id")
            .bind(email)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn seed_product(pool: &PgPool, quantity: i32) -> Uuid {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO products (name, price, category, brand, image, quantity)
             VALUES ('Silicone case', 10, 'cases', 'Apple', 'https://cdn.example.com/case.jpg', $1)
             RETURNING id",
        )
        .bind(quantity)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn seed_order(pool: &PgPool, user_id: Option<Uuid>, is_deleted: bool) -> Uuid {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO orders (user_id, total_amount, is_deleted)
             VALUES ($1, 20, $2)
             RETURNING id",
        )
        .bind(user_id)
        .bind(is_deleted)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn seed_item(
        pool: &PgPool,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        is_deleted: bool,
    ) {
        sqlx::query(
            "INSERT INTO order_items
                (order_id, product_id, price, quantity, total_amount, is_deleted)
             VALUES ($1, $2, 10, $3, $4, $5)",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .bind(Decimal::from(quantity) * Decimal::TEN)
        .bind(is_deleted)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn stock(pool: &PgPool, product_id: Uuid) -> i32 {
        sqlx::query_scalar::<_, i32>("SELECT quantity FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn raw_order(pool: &PgPool, id: Uuid) -> Order {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn soft_deleted_orders_and_items_are_hidden(pool: PgPool) {
        let customer = seed_customer(&pool, "ana@example.com").await;
        let product = seed_product(&pool, 10).await;

        let visible = seed_order(&pool, Some(customer), false).await;
        seed_item(&pool, visible, product, 2, false).await;
        seed_item(&pool, visible, product, 3, true).await;

        let hidden = seed_order(&pool, Some(customer), true).await;
        seed_item(&pool, hidden, product, 1, false).await;

        let orders = get_active_orders(&pool).await.unwrap();
        assert_eq!(orders.len(), 1);

        let view = &orders[0];
        assert_eq!(view.order.id, visible);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].item.quantity, 2);
        assert_eq!(
            view.items[0].product.as_ref().map(|p| p.id),
            Some(product)
        );
        assert_eq!(
            view.customer.as_ref().map(|c| c.email.as_str()),
            Some("ana@example.com")
        );

        assert!(find_order(&pool, hidden).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn accepting_twice_decrements_stock_once(pool: PgPool) {
        let case = seed_product(&pool, 10).await;
        let charger = seed_product(&pool, 4).await;
        let order = seed_order(&pool, None, false).await;
        seed_item(&pool, order, case, 2, false).await;
        seed_item(&pool, order, case, 1, false).await;
        seed_item(&pool, order, charger, 1, false).await;
        seed_item(&pool, order, charger, 3, true).await;

        let accepted = accept_order(&pool, order, "TRK-100").await.unwrap();
        assert!(accepted.order.status);
        assert_eq!(accepted.order.track_id, "TRK-100");
        assert_eq!(accepted.updated_products.len(), 3);
        assert_eq!(stock(&pool, case).await, 7);
        assert_eq!(stock(&pool, charger).await, 3);

        let again = accept_order(&pool, order, "TRK-200").await;
        assert!(matches!(again, Err(AppError::Conflict(_))));
        assert_eq!(stock(&pool, case).await, 7);
        assert_eq!(stock(&pool, charger).await, 3);
        assert_eq!(raw_order(&pool, order).await.track_id, "TRK-100");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn failed_acceptance_leaves_nothing_behind(pool: PgPool) {
        let case = seed_product(&pool, 10).await;
        let broken = seed_product(&pool, i32::MIN).await;
        let order = seed_order(&pool, None, false).await;
        seed_item(&pool, order, case, 2, false).await;
        seed_item(&pool, order, broken, 1, false).await;

        let result = accept_order(&pool, order, "TRK-300").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        assert_eq!(stock(&pool, case).await, 10);
        assert_eq!(stock(&pool, broken).await, i32::MIN);
        let row = raw_order(&pool, order).await;
        assert!(!row.status);
        assert_eq!(row.track_id, "");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn accept_rejects_missing_and_empty_orders(pool: PgPool) {
        let missing = accept_order(&pool, Uuid::new_v4(), "TRK-1").await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        let deleted = seed_order(&pool, None, true).await;
        let result = accept_order(&pool, deleted, "TRK-1").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let empty = seed_order(&pool, None, false).await;
        let result = accept_order(&pool, empty, "TRK-1").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(!raw_order(&pool, empty).await.status);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn cancel_clears_tracking_and_keeps_stock(pool: PgPool) {
        let case = seed_product(&pool, 5).await;
        let order = seed_order(&pool, None, false).await;
        seed_item(&pool, order, case, 2, false).await;

        accept_order(&pool, order, "TRK-400").await.unwrap();
        let canceled = cancel_order(&pool, order).await.unwrap().unwrap();

        assert!(!canceled.status);
        assert_eq!(canceled.track_id, "");
        assert_eq!(stock(&pool, case).await, 3);

        let deleted = seed_order(&pool, None, true).await;
        assert!(cancel_order(&pool, deleted).await.unwrap().is_none());
    }
}
