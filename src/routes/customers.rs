use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    AppState,
    error::Result,
    models::{Customer, ListQuery},
    queries::customer_queries,
    services::{
        listing::{self, CUSTOMERS_PAGE_SIZE, Page},
        query_cache::CUSTOMERS,
    },
};

pub async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Page<Customer>>> {
    let customers = state
        .cache
        .customers
        .get_or_fetch(CUSTOMERS, async {
            Ok(Arc::new(customer_queries::get_all_customers(&state.db).await?))
        })
        .await?;

    let search = params.search.unwrap_or_default();
    let filtered: Vec<Customer> = customers
        .iter()
        .filter(|c| c.matches_search(&search))
        .cloned()
        .collect();

    Ok(Json(listing::paginate(filtered, params.page, CUSTOMERS_PAGE_SIZE)))
}
