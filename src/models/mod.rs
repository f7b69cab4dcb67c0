mod admin;
mod banner;
mod customer;
mod order;
mod product;

pub use admin::*;
pub use banner::*;
pub use customer::*;
pub use order::*;
pub use product::*;

use serde::Deserialize;

/// Query string shared by the searchable, paginated list screens.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
}
