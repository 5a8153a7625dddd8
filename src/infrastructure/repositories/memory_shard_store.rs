//! 内存分片存储（DashMap），用于测试和临时数据

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::DayShardStore;
use crate::error::AppResult;

#[derive(Default, Clone)]
pub struct InMemoryShardStore {
    map: Arc<DashMap<i64, Vec<u8>>>,
    writes: Arc<AtomicUsize>,
    reads: Arc<AtomicUsize>,
}

impl InMemoryShardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 累计 put 次数
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// 累计 get 次数
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[async_trait]
impl DayShardStore for InMemoryShardStore {
    async fn get(&self, day_key: i64) -> AppResult<Option<Vec<u8>>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.map.get(&day_key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, day_key: i64, payload: Vec<u8>) -> AppResult<()> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.map.insert(day_key, payload);
        Ok(())
    }

    async fn flush(&self) -> AppResult<()> {
        Ok(())
    }

    async fn contains(&self, day_key: i64) -> AppResult<bool> {
        Ok(self.map.contains_key(&day_key))
    }

    async fn key_range(&self) -> AppResult<Option<(i64, i64)>> {
        let mut range: Option<(i64, i64)> = None;
        for entry in self.map.iter() {
            let key = *entry.key();
            range = Some(match range {
                Some((lo, hi)) => (lo.min(key), hi.max(key)),
                None => (key, key),
            });
        }
        Ok(range)
    }

    async fn keys(&self) -> AppResult<Vec<i64>> {
        let mut keys: Vec<i64> = self.map.iter().map(|entry| *entry.key()).collect();
        keys.sort_unstable();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_counts() {
        let store = InMemoryShardStore::new();
        assert!(store.is_empty());
        store.put(0, vec![1]).await.unwrap();
        store.put(86400, vec![2]).await.unwrap();
        assert_eq!(store.get(0).await.unwrap(), Some(vec![1]));
        assert_eq!(store.get(5).await.unwrap(), None);

        assert_eq!(store.write_count(), 2);
        assert_eq!(store.read_count(), 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.key_range().await.unwrap(), Some((0, 86400)));
        assert_eq!(store.keys().await.unwrap(), vec![0, 86400]);
    }

    #[tokio::test]
    async fn test_clone_shares_data() {
        let store = InMemoryShardStore::new();
        let other = store.clone();
        other.put(7, vec![]).await.unwrap();
        assert!(store.contains(7).await.unwrap());
        assert_eq!(store.write_count(), 1);
    }
}
