use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{Customer, Product},
    services::listing::matches_search,
};

// DB models

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub total_amount: Decimal,
    /// `false` while pending, `true` once completed.
    pub status: bool,
    pub track_id: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub price: Decimal,
    pub quantity: i32,
    pub colors: Vec<String>,
    pub models: Vec<String>,
    pub total_amount: Decimal,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

// Request types

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl OrderStatusFilter {
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            OrderStatusFilter::All => true,
            OrderStatusFilter::Completed => order.status,
            OrderStatusFilter::Pending => !order.status,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub search: Option<String>,
    #[serde(default)]
    pub status: OrderStatusFilter,
    pub page: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AcceptOrderRequest {
    pub track_id: String,
}

// Response types

#[derive(Debug, Clone, Serialize)]
pub struct OrderItemView {
    #[serde(flatten)]
    pub item: OrderItem,
    pub product: Option<Product>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub customer: Option<Customer>,
    pub items: Vec<OrderItemView>,
}

impl OrderView {
    /// Order id, customer email and tracking id are searchable.
    pub fn matches_search(&self, term: &str) -> bool {
        let id = self.order.id.to_string();
        let email = self
            .customer
            .as_ref()
            .map(|c| c.email.as_str())
            .unwrap_or_default();

        matches_search(&[&id, email, &self.order.track_id], term)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockUpdate {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct AcceptOrderResponse {
    pub order: Order,
    pub updated_products: Vec<StockUpdate>,
}

/// Walks the line items in order, subtracting each ordered quantity from the
/// running stock of its product. Repeated products accumulate, so every item
/// is applied exactly once. Results can go negative but must stay within
/// the stock column's range.
pub fn plan_stock_updates(
    items: &[OrderItem],
    current_stock: &HashMap<Uuid, i32>,
) -> Result<Vec<StockUpdate>> {
    let mut running = current_stock.clone();
    let mut updates = Vec::with_capacity(items.len());

    for item in items {
        let stock = running.get_mut(&item.product_id).ok_or_else(|| {
            AppError::NotFound(format!("Product {} not found", item.product_id))
        })?;

        *stock = stock.checked_sub(item.quantity).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Stock for product {} would overflow",
                item.product_id
            ))
        })?;

        updates.push(StockUpdate {
            product_id: item.product_id,
            quantity: *stock,
        });
    }

    Ok(updates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    fn item(product_id: Uuid, quantity: i32) -> OrderItem {
        OrderItem {
            id: Uuid::new_v4(),
            order_id: Uuid::nil(),
            product_id,
            price: dec!(10),
            quantity,
            colors: vec![],
            models: vec![],
            total_amount: dec!(10) * Decimal::from(quantity),
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    fn order(status: bool) -> Order {
        Order {
            id: Uuid::new_v4(),
            user_id: None,
            total_amount: dec!(30),
            status,
            track_id: String::new(),
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn each_item_decrements_its_product_once() {
        let case = Uuid::new_v4();
        let charger = Uuid::new_v4();
        let stock = HashMap::from([(case, 10), (charger, 4)]);

        let updates = plan_stock_updates(&[item(case, 3), item(charger, 1)], &stock).unwrap();

        assert_eq!(
            updates,
            vec![
                StockUpdate {
                    product_id: case,
                    quantity: 7,
                },
                StockUpdate {
                    product_id: charger,
                    quantity: 3,
                },
            ]
        );
    }

    #[test]
    fn repeated_product_accumulates() {
        let case = Uuid::new_v4();
        let stock = HashMap::from([(case, 10)]);

        let updates = plan_stock_updates(&[item(case, 2), item(case, 5)], &stock).unwrap();

        assert_eq!(updates.last().map(|u| u.quantity), Some(3));
    }

    #[test]
    fn stock_may_go_negative() {
        let case = Uuid::new_v4();
        let stock = HashMap::from([(case, 1)]);

        let updates = plan_stock_updates(&[item(case, 4)], &stock).unwrap();

        assert_eq!(updates[0].quantity, -3);
    }

    #[test]
    fn stock_out_of_range_is_rejected() {
        let case = Uuid::new_v4();

        let low = plan_stock_updates(&[item(case, 1)], &HashMap::from([(case, i32::MIN)]));
        assert!(matches!(low, Err(AppError::BadRequest(_))));

        let high = plan_stock_updates(&[item(case, -1)], &HashMap::from([(case, i32::MAX)]));
        assert!(matches!(high, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn unknown_product_is_not_found() {
        let result = plan_stock_updates(&[item(Uuid::new_v4(), 1)], &HashMap::new());
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn status_filter_splits_pending_and_completed() {
        assert!(OrderStatusFilter::All.matches(&order(true)));
        assert!(OrderStatusFilter::Completed.matches(&order(true)));
        assert!(!OrderStatusFilter::Completed.matches(&order(false)));
        assert!(OrderStatusFilter::Pending.matches(&order(false)));
    }
}
