//! 存储统计

use std::collections::HashMap;

use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::NewsRepository;

pub struct NewsStats;

impl NewsStats {
    /// 统计全部新闻名称的出现次数，按次数升序（次数相同按名称）
    pub async fn unique_names(repo: &NewsRepository) -> AppResult<Vec<(String, u64)>> {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for day in repo.day_keys().await? {
            let events = match repo.read_news(day).await {
                Ok(Some(events)) => events,
                Ok(None) => continue,
                Err(AppError::Parse(msg)) => {
                    warn!("跳过无法解析的分片: {}", msg);
                    continue;
                }
                Err(e) => return Err(e),
            };
            for event in events {
                *counts.entry(event.name).or_insert(0) += 1;
            }
        }

        let mut names: Vec<(String, u64)> = counts.into_iter().collect();
        names.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        info!("统计完成，共 {} 个不同的新闻名称", names.len());
        Ok(names)
    }

    /// 文本报告：每行 `名称 次数`，末行 `total news: N`
    pub fn render(names: &[(String, u64)]) -> String {
        let mut text = String::new();
        for (name, count) in names {
            text.push_str(&format!("{} {}\n", name, count));
        }
        text.push_str(&format!("total news: {}\n", names.len()));
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EconomicEvent, Volatility};
    use crate::infrastructure::repositories::InMemoryShardStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_unique_names_sorted_by_count() {
        let repo = NewsRepository::new(Arc::new(InMemoryShardStore::new()));
        let make = |name: &str, ts: i64| EconomicEvent::new(name, "USD", "", Volatility::Low, ts);
        repo.write_news(&[make("CPI", 100), make("GDP", 200)], 0)
            .await
            .unwrap();
        repo.write_news(&[make("CPI", 86500), make("PMI", 86600)], 86400)
            .await
            .unwrap();

        let names = NewsStats::unique_names(&repo).await.unwrap();
        assert_eq!(
            names,
            vec![
                ("GDP".to_string(), 1),
                ("PMI".to_string(), 1),
                ("CPI".to_string(), 2)
            ]
        );
        assert_eq!(NewsStats::render(&names), "GDP 1\nPMI 1\nCPI 2\ntotal news: 3\n");
    }
}
