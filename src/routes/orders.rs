use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{AcceptOrderRequest, AcceptOrderResponse, Order, OrderListQuery, OrderView},
    queries::order_queries,
    services::{
        listing::{self, ORDERS_PAGE_SIZE, Page},
        query_cache::ORDERS,
    },
};

pub async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<OrderListQuery>,
) -> Result<Json<Page<OrderView>>> {
    let orders = state
        .cache
        .orders
        .get_or_fetch(ORDERS, async {
            Ok(Arc::new(order_queries::get_active_orders(&state.db).await?))
        })
        .await?;

    let search = params.search.unwrap_or_default();
    let filtered: Vec<OrderView> = orders
        .iter()
        .filter(|view| params.status.matches(&view.order))
        .filter(|view| view.matches_search(&search))
        .cloned()
        .collect();

    Ok(Json(listing::paginate(filtered, params.page, ORDERS_PAGE_SIZE)))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderView>> {
    let order = state
        .cache
        .order_by_id
        .get_or_fetch(id, async {
            order_queries::find_order(&state.db, id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))
        })
        .await?;

    Ok(Json(order))
}

pub async fn accept_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AcceptOrderRequest>,
) -> Result<Json<AcceptOrderResponse>> {
    let track_id = payload.track_id.trim();
    if track_id.is_empty() {
        return Err(AppError::BadRequest("Track ID is required".to_string()));
    }

    let response = order_queries::accept_order(&state.db, id, track_id).await?;

    state.cache.invalidate_products();

    tracing::info!(
        "Accepted order {} with track id {} ({} stock updates)",
        id,
        track_id,
        response.updated_products.len()
    );

    Ok(Json(response))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>> {
    let order = order_queries::cancel_order(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))?;

    state.cache.invalidate_orders();
    tracing::info!("Canceled order {}", id);

    Ok(Json(order))
}
