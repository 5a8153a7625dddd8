//! 新闻存储门面
//!
//! 负责整天批次与分片字节之间的转换，key 统一取当日 0 点

use std::sync::Arc;

use tracing::debug;

use crate::domain::{DayShardStore, EconomicEvent};
use crate::error::{AppError, AppResult};
use crate::time_util;

#[derive(Clone)]
pub struct NewsRepository {
    store: Arc<dyn DayShardStore>,
}

impl NewsRepository {
    pub fn new(store: Arc<dyn DayShardStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DayShardStore> {
        &self.store
    }

    /// 写入一天的新闻，整体替换该日分片
    pub async fn write_news(&self, events: &[EconomicEvent], timestamp: i64) -> AppResult<()> {
        let day_key = time_util::start_of_day(timestamp);
        let payload = serde_json::to_vec(events)?;
        self.store.put(day_key, payload).await?;
        debug!(
            "保存 {} 条新闻: {}",
            events.len(),
            time_util::format_date(day_key)
        );
        Ok(())
    }

    /// 读取一天的新闻，分片不存在返回 None
    pub async fn read_news(&self, timestamp: i64) -> AppResult<Option<Vec<EconomicEvent>>> {
        let day_key = time_util::start_of_day(timestamp);
        let Some(payload) = self.store.get(day_key).await? else {
            return Ok(None);
        };
        let events: Vec<EconomicEvent> = serde_json::from_slice(&payload).map_err(|e| {
            AppError::Parse(format!(
                "corrupt shard {}: {}",
                time_util::format_date(day_key),
                e
            ))
        })?;
        Ok(Some(events))
    }

    pub async fn contains_day(&self, timestamp: i64) -> AppResult<bool> {
        self.store.contains(time_util::start_of_day(timestamp)).await
    }

    /// 已存储数据的首日和末日（均为当日 0 点）
    pub async fn min_max_timestamp(&self) -> AppResult<Option<(i64, i64)>> {
        self.store.key_range().await
    }

    pub async fn day_keys(&self) -> AppResult<Vec<i64>> {
        self.store.keys().await
    }

    /// 强制落盘
    pub async fn save(&self) -> AppResult<()> {
        self.store.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Volatility;
    use crate::infrastructure::repositories::InMemoryShardStore;

    fn sample_day() -> Vec<EconomicEvent> {
        vec![
            EconomicEvent::new("CPI m/m", "USD", "United States", Volatility::High, 1574083800)
                .with_values(Some(0.4), Some(0.0), None),
            EconomicEvent::new("Bank Holiday", "JPY", "Japan", Volatility::Low, 1574035200)
                .with_values(None, None, Some(-1.5)),
        ]
    }

    #[tokio::test]
    async fn test_write_read_round_trip() {
        let repo = NewsRepository::new(Arc::new(InMemoryShardStore::new()));
        let events = sample_day();
        // 同一天任意时刻都映射到同一个分片
        repo.write_news(&events, 1574083800).await.unwrap();

        let loaded = repo.read_news(1574035200 + 10).await.unwrap().unwrap();
        assert_eq!(loaded, events);
        assert_eq!(loaded[0].forecast, None);
        assert_eq!(loaded[0].actual, Some(0.0));
        assert!(repo.contains_day(1574035200).await.unwrap());
        assert_eq!(
            repo.min_max_timestamp().await.unwrap(),
            Some((1574035200, 1574035200))
        );
    }

    #[tokio::test]
    async fn test_serialized_batch_format() {
        let store = Arc::new(InMemoryShardStore::new());
        let repo = NewsRepository::new(store.clone());
        repo.write_news(&sample_day(), 1574035200).await.unwrap();

        let raw = store.get(1574035200).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        let first = &value[0];
        assert_eq!(first["volatility"], 2);
        assert_eq!(first["timestamp"], 1574083800);
        assert!(first.get("forecast").is_none());
        assert_eq!(value[1]["volatility"], 0);
        assert!(value[1].get("previous").is_none());
    }

    #[tokio::test]
    async fn test_read_missing_and_corrupt() {
        let store = Arc::new(InMemoryShardStore::new());
        let repo = NewsRepository::new(store.clone());
        assert!(repo.read_news(0).await.unwrap().is_none());

        store.put(86400, b"{oops".to_vec()).await.unwrap();
        assert!(matches!(repo.read_news(86400).await, Err(AppError::Parse(_))));
    }

    #[tokio::test]
    async fn test_read_external_batch() {
        let store = Arc::new(InMemoryShardStore::new());
        let repo = NewsRepository::new(store.clone());
        let raw = br#"[{"name":"GDP","currency":"EUR","country":"Euro Zone","volatility":-1,"timestamp":86500,"actual":1.1}]"#;
        store.put(86400, raw.to_vec()).await.unwrap();

        let events = repo.read_news(86400).await.unwrap().unwrap();
        assert_eq!(events[0].volatility, Volatility::Unset);
        assert_eq!(events[0].actual, Some(1.1));
        assert_eq!(events[0].previous, None);
    }
}
