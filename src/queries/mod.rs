pub mod admin_queries;
pub mod banner_queries;
pub mod customer_queries;
pub mod order_queries;
pub mod products_queries;
