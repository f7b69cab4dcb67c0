use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::listing::matches_search;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub is_deleted: bool,
    pub created_date: DateTime<Utc>,
}

impl Customer {
    pub fn matches_search(&self, term: &str) -> bool {
        matches_search(&[&self.email, &self.phone_number, &self.address], term)
    }
}
