pub mod listing;
pub mod query_cache;
pub mod storage_service;
pub mod upload;
