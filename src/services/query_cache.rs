use std::{
    future::Future,
    hash::Hash,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use moka::future::Cache;
use uuid::Uuid;

use crate::{
    config::CacheConfig,
    error::{AppError, Result},
    models::{Customer, HeroBanner, OrderView, Product},
};

pub const PRODUCTS: &str = "products";
pub const ORDERS: &str = "orders";
pub const CUSTOMERS: &str = "customers";
pub const BANNERS: &str = "banners";

/// Read-through cache for list and detail queries.
///
/// Concurrent lookups of a missing key share one fetch; failed fetches are
/// not stored. Every entry is stored under the generation it was fetched in.
/// [`QueryCache::invalidate`] bumps the generation, so a fetch that was
/// already running when a mutation landed can never be served afterwards.
#[derive(Clone)]
pub struct QueryCache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<(K, u64), V>,
    generation: Arc<AtomicU64>,
}

impl<K, V> QueryCache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(config: &CacheConfig) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();

        Self {
            inner,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn get_or_fetch<F>(&self, key: K, fetch: F) -> Result<V>
    where
        F: Future<Output = Result<V>>,
    {
        let generation = self.generation.load(Ordering::Acquire);
        let entry = (key, generation);

        let value = self
            .inner
            .try_get_with(entry.clone(), fetch)
            .await
            .map_err(|shared| {
                Arc::try_unwrap(shared)
                    .unwrap_or_else(|shared| AppError::InternalError(shared.to_string()))
            })?;

        // Invalidated mid-fetch: the value is still fine for this caller but
        // must not outlive its generation.
        if self.generation.load(Ordering::Acquire) != generation {
            self.inner.invalidate(&entry).await;
        }

        Ok(value)
    }

    /// Retires every entry of this cache, including fetches still in flight.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.inner.invalidate_all();
    }
}

type ListCache<T> = QueryCache<&'static str, Arc<Vec<T>>>;

/// One cache per screen query.
#[derive(Clone)]
pub struct QueryCaches {
    pub products: ListCache<Product>,
    pub product_by_id: QueryCache<Uuid, Product>,
    pub orders: ListCache<OrderView>,
    pub order_by_id: QueryCache<Uuid, OrderView>,
    pub customers: ListCache<Customer>,
    pub banners: ListCache<HeroBanner>,
}

impl QueryCaches {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            products: QueryCache::new(config),
            product_by_id: QueryCache::new(config),
            orders: QueryCache::new(config),
            order_by_id: QueryCache::new(config),
            customers: QueryCache::new(config),
            banners: QueryCache::new(config),
        }
    }

    /// Order views embed product rows, so product writes drop them too.
    pub fn invalidate_products(&self) {
        self.products.invalidate();
        self.product_by_id.invalidate();
        self.invalidate_orders();
    }

    pub fn invalidate_orders(&self) {
        self.orders.invalidate();
        self.order_by_id.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn cache() -> QueryCache<&'static str, Arc<Vec<u32>>> {
        QueryCache::new(&CacheConfig {
            ttl_secs: 60,
            max_entries: 16,
        })
    }

    #[tokio::test]
    async fn repeated_reads_fetch_once() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_fetch("products", async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Arc::new(vec![1, 2, 3]))
                })
                .await
                .unwrap();
            assert_eq!(*value, vec![1, 2, 3]);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_fetch() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let fetch = |calls: Arc<AtomicUsize>| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, AppError>(Arc::new(vec![7u32]))
        };

        let (a, b) = tokio::join!(
            cache.get_or_fetch("orders", fetch(calls.clone())),
            cache.get_or_fetch("orders", fetch(calls.clone())),
        );

        assert_eq!(*a.unwrap(), vec![7]);
        assert_eq!(*b.unwrap(), vec![7]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let cache = cache();

        cache
            .get_or_fetch("banners", async { Ok(Arc::new(vec![1])) })
            .await
            .unwrap();
        cache.invalidate();

        let value = cache
            .get_or_fetch("banners", async { Ok(Arc::new(vec![2])) })
            .await
            .unwrap();
        assert_eq!(*value, vec![2]);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = cache();

        let err = cache
            .get_or_fetch("customers", async {
                Err(AppError::NotFound("customers".to_string()))
            })
            .await;
        assert!(matches!(err, Err(AppError::NotFound(_))));

        let value = cache
            .get_or_fetch("customers", async { Ok(Arc::new(vec![4])) })
            .await
            .unwrap();
        assert_eq!(*value, vec![4]);
    }

    #[tokio::test]
    async fn invalidation_during_fetch_is_not_lost() {
        let cache = cache();

        let slow = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_fetch("orders", async {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Ok(Arc::new(vec![1]))
                    })
                    .await
            })
        };

        // Let the slow fetch start, then land a write behind it.
        tokio::time::sleep(Duration::from_millis(20)).await;
        cache.invalidate();

        let fresh = cache
            .get_or_fetch("orders", async { Ok(Arc::new(vec![2])) })
            .await
            .unwrap();
        assert_eq!(*fresh, vec![2]);

        // The old fetch still answers its own caller...
        assert_eq!(*slow.await.unwrap().unwrap(), vec![1]);

        // ...but never replaces the post-write value.
        let after = cache
            .get_or_fetch("orders", async { Ok(Arc::new(vec![3])) })
            .await
            .unwrap();
        assert_eq!(*after, vec![2]);
    }

    #[tokio::test]
    async fn stale_fetch_is_dropped_once_it_finishes() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        let (first, ()) = tokio::join!(
            cache.get_or_fetch("products", async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(Arc::new(vec![1]))
            }),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                cache.invalidate();
            },
        );
        assert_eq!(*first.unwrap(), vec![1]);

        let value = cache
            .get_or_fetch("products", async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(vec![5]))
            })
            .await
            .unwrap();
        assert_eq!(*value, vec![5]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
