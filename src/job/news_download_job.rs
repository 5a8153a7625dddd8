//! 新闻下载任务
//!
//! 只做编排：确定下载范围，调用回填服务。
//! 已有数据时从最后一天往前 `refresh_days` 天开始重新下载，
//! 因为最后几天可能在上次运行时还不完整。

use std::sync::Arc;

use tracing::{error, info};

use crate::app_config::NewsSettings;
use crate::domain::NewsFetcher;
use crate::error::AppResult;
use crate::infrastructure::repositories::{NewsRepository, SqliteShardStore};
use crate::infrastructure::sources::ForexprostoolsClient;
use crate::services::{BackfillConfig, BackfillReport, BackfillService};
use crate::time_util::{self, SECONDS_IN_DAY};

pub struct NewsDownloadJob {
    fetcher: Arc<dyn NewsFetcher>,
    repo: NewsRepository,
    settings: NewsSettings,
}

impl NewsDownloadJob {
    pub fn new(fetcher: Arc<dyn NewsFetcher>, repo: NewsRepository, settings: NewsSettings) -> Self {
        Self {
            fetcher,
            repo,
            settings,
        }
    }

    /// 按设置打开 SQLite 存储并创建 HTTP 客户端
    pub fn from_settings(settings: NewsSettings) -> AppResult<Self> {
        let db_path = settings.database_path()?;
        let store = SqliteShardStore::open(&db_path)?;
        let client = ForexprostoolsClient::new(settings.fetcher_config())?;
        Ok(Self::new(
            Arc::new(client),
            NewsRepository::new(Arc::new(store)),
            settings,
        ))
    }

    pub fn repository(&self) -> &NewsRepository {
        &self.repo
    }

    /// 本次下载的起点
    ///
    /// 空库从 `history_start` 开始；否则为最后一天往前 `refresh_days` 天，且不早于 `history_start`
    pub fn refresh_from(max_day: Option<i64>, refresh_days: i64, history_start: i64) -> i64 {
        match max_day {
            Some(max_day) => (max_day - refresh_days * SECONDS_IN_DAY).max(history_start),
            None => history_start,
        }
    }

    pub async fn run(&self) -> AppResult<BackfillReport> {
        self.run_until(time_util::now_timestamp()).await
    }

    /// 下载到 `now` 所在日为止
    pub async fn run_until(&self, now: i64) -> AppResult<BackfillReport> {
        let history_start = self.settings.history_start_timestamp()?;
        let range = self.repo.min_max_timestamp().await?;
        if let Some((min_day, max_day)) = range {
            info!(
                "已下载数据: {} - {}",
                time_util::format_date(min_day),
                time_util::format_date(max_day)
            );
        }

        let start = Self::refresh_from(
            range.map(|(_, max_day)| max_day),
            self.settings.refresh_days,
            history_start,
        );
        let config = BackfillConfig {
            skip_existing_before: Some(start),
            ..self.settings.backfill_config()
        };
        info!(
            "📅 开始下载新闻: {} - {}, 跳过休息日: {}",
            time_util::format_date(start),
            time_util::format_date(now),
            config.skip_day_off
        );

        let service = BackfillService::new(self.fetcher.clone(), self.repo.clone(), config);
        let result = service
            .run(start, now, |events, day| {
                info!(
                    "下载完成 {}: {} 条新闻",
                    time_util::format_date(day),
                    events.len()
                );
            })
            .await;

        match &result {
            Ok(report) => info!(
                "✅ 新闻下载完成: 新写入 {} 天, {} 条新闻",
                report.days_written, report.events_written
            ),
            Err(e) => error!("❌ 新闻下载失败: {}", e),
        }
        result
    }
}
