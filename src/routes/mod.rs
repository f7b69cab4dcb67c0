mod banners;
mod customers;
mod health;
mod login;
mod orders;
mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/login", post(login::login_admin))
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/products/media", get(products::list_media))
        .route(
            "/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/products/{id}/discount", put(products::set_discount))
        .route("/orders", get(orders::list_orders))
        .route("/orders/{id}", get(orders::get_order))
        .route("/orders/{id}/accept", post(orders::accept_order))
        .route("/orders/{id}/cancel", post(orders::cancel_order))
        .route("/customers", get(customers::list_customers))
        .route(
            "/banners",
            get(banners::list_banners).post(banners::create_banner),
        )
        .route(
            "/banners/{id}",
            put(banners::update_banner).delete(banners::delete_banner),
        )
}
