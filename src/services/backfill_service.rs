//! 按天回填服务
//!
//! 逐日请求数据源，解析后写入分片存储。
//! 单个状态机驱动：Fetching → (RecordingFailure) → Advancing → ... → Terminated。
//! 连续失败次数超过阈值时提前终止，已写入的分片保持不变。

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::domain::{EconomicEvent, NewsFetcher};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::NewsRepository;
use crate::parser;
use crate::time_util::{self, SECONDS_IN_DAY};

/// 连续失败阈值
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 30;

/// 遍历方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalkDirection {
    /// 从 range_start 所在日走到 range_end 所在日
    #[default]
    Forward,
    /// 从 range_end 所在日走回 range_start 所在日
    Backward,
}

#[derive(Debug, Clone)]
pub struct BackfillConfig {
    pub failure_threshold: u32,
    /// 跳过休息日，不发请求
    pub skip_day_off: bool,
    pub direction: WalkDirection,
    /// 单日请求超时，超时计一次失败
    pub fetch_timeout: Duration,
    /// 早于该时间所在日的日期如果已有分片则不再请求；
    /// 该日及之后总是重新下载。None 表示所有已有分片都跳过
    pub skip_existing_before: Option<i64>,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            skip_day_off: false,
            direction: WalkDirection::Forward,
            fetch_timeout: Duration::from_secs(75),
            skip_existing_before: None,
        }
    }
}

/// 状态机状态
#[derive(Debug)]
pub enum BackfillState {
    Fetching { day: i64 },
    /// error 为 None 表示请求成功但当天没有新闻
    RecordingFailure { day: i64, error: Option<AppError> },
    Advancing { day: i64 },
    Terminated(BackfillStop),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackfillStop {
    /// 走完整个范围
    Exhausted,
    /// 连续失败超过阈值
    FailureThreshold,
}

/// 连续失败计数
#[derive(Debug)]
pub struct FailureTracker {
    threshold: u32,
    consecutive: u32,
    last_error: Option<AppError>,
}

impl FailureTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            consecutive: 0,
            last_error: None,
        }
    }

    /// 记录一次失败，返回是否已超过阈值
    pub fn record_failure(&mut self, error: Option<AppError>) -> bool {
        self.consecutive += 1;
        if error.is_some() {
            self.last_error = error;
        }
        self.consecutive > self.threshold
    }

    pub fn record_success(&mut self) {
        self.consecutive = 0;
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    pub fn last_error(&self) -> Option<&AppError> {
        self.last_error.as_ref()
    }

    fn take_last_error(&mut self) -> Option<AppError> {
        self.last_error.take()
    }
}

/// 回填统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillReport {
    /// 本次下载并写入的天数
    pub days_written: usize,
    /// 已有分片而跳过的天数
    pub days_existing: usize,
    /// 跳过的休息日
    pub days_off_skipped: usize,
    /// 休息日请求成功但没有新闻
    pub days_empty: usize,
    /// 计入失败的天数
    pub days_failed: usize,
    pub events_written: usize,
}

impl BackfillReport {
    /// 有数据的天数（新写入 + 已存在）
    pub fn days_with_data(&self) -> usize {
        self.days_written + self.days_existing
    }
}

/// 按方向逐日移动的游标
#[derive(Debug, Clone, Copy)]
struct DayCursor {
    first_day: i64,
    last_day: i64,
    direction: WalkDirection,
}

impl DayCursor {
    fn new(range_start: i64, range_end: i64, direction: WalkDirection) -> Self {
        Self {
            first_day: time_util::start_of_day(range_start),
            last_day: time_util::start_of_day(range_end),
            direction,
        }
    }

    fn initial(&self) -> i64 {
        match self.direction {
            WalkDirection::Forward => self.first_day,
            WalkDirection::Backward => self.last_day,
        }
    }

    fn next(&self, day: i64) -> Option<i64> {
        match self.direction {
            WalkDirection::Forward => {
                let next = day + SECONDS_IN_DAY;
                (next <= self.last_day).then_some(next)
            }
            WalkDirection::Backward => {
                let next = day - SECONDS_IN_DAY;
                (next >= self.first_day).then_some(next)
            }
        }
    }
}

pub struct BackfillService {
    fetcher: Arc<dyn NewsFetcher>,
    repo: NewsRepository,
    config: BackfillConfig,
}

impl BackfillService {
    pub fn new(fetcher: Arc<dyn NewsFetcher>, repo: NewsRepository, config: BackfillConfig) -> Self {
        Self {
            fetcher,
            repo,
            config,
        }
    }

    pub fn config(&self) -> &BackfillConfig {
        &self.config
    }

    /// 回填 [range_start, range_end] 覆盖的所有日期
    ///
    /// 每写入一天调用一次 `on_day(events, day_start)`。
    /// 结果：有数据的天数 > 0 且正常走完返回统计；连续失败超过阈值返回
    /// `NotAllDataDownloaded`；没有任何数据时返回最后一次请求错误，没有错误则返回 `NoData`。
    /// 存储错误直接返回。
    pub async fn run<F>(&self, range_start: i64, range_end: i64, mut on_day: F) -> AppResult<BackfillReport>
    where
        F: FnMut(&[EconomicEvent], i64) + Send,
    {
        if range_start > range_end {
            return Err(AppError::InvalidParameter(format!(
                "range start {} is after range end {}",
                range_start, range_end
            )));
        }

        let cursor = DayCursor::new(range_start, range_end, self.config.direction);
        let mut tracker = FailureTracker::new(self.config.failure_threshold);
        let mut report = BackfillReport::default();

        info!(
            "📥 开始回填: {} - {}, direction={:?}, skip_day_off={}",
            time_util::format_date(cursor.first_day),
            time_util::format_date(cursor.last_day),
            self.config.direction,
            self.config.skip_day_off
        );

        let mut state = BackfillState::Fetching {
            day: cursor.initial(),
        };
        loop {
            state = match state {
                BackfillState::Fetching { day } => {
                    self.visit_day(day, &mut tracker, &mut report, &mut on_day)
                        .await?
                }
                BackfillState::RecordingFailure { day, error } => {
                    report.days_failed += 1;
                    if tracker.record_failure(error) {
                        error!(
                            "❌ 连续 {} 天下载失败，停止回填: {}",
                            tracker.consecutive(),
                            time_util::format_date(day)
                        );
                        BackfillState::Terminated(BackfillStop::FailureThreshold)
                    } else {
                        BackfillState::Advancing { day }
                    }
                }
                BackfillState::Advancing { day } => match cursor.next(day) {
                    Some(next) => BackfillState::Fetching { day: next },
                    None => BackfillState::Terminated(BackfillStop::Exhausted),
                },
                BackfillState::Terminated(stop) => return Self::finish(stop, tracker, report),
            };
        }
    }

    async fn visit_day<F>(
        &self,
        day: i64,
        tracker: &mut FailureTracker,
        report: &mut BackfillReport,
        on_day: &mut F,
    ) -> AppResult<BackfillState>
    where
        F: FnMut(&[EconomicEvent], i64) + Send,
    {
        if self.config.skip_day_off && time_util::is_day_off(day) {
            report.days_off_skipped += 1;
            return Ok(BackfillState::Advancing { day });
        }

        if self.should_skip_existing(day) && self.repo.contains_day(day).await? {
            debug!("已有数据，跳过: {}", time_util::format_date(day));
            report.days_existing += 1;
            return Ok(BackfillState::Advancing { day });
        }

        let events = match self.fetch_day(day).await {
            Ok(events) => events,
            Err(e) if e.is_recoverable() => {
                warn!("⚠️ 下载失败 {}: {}", time_util::format_date(day), e);
                return Ok(BackfillState::RecordingFailure {
                    day,
                    error: Some(e),
                });
            }
            Err(e) => return Err(e),
        };

        if events.is_empty() {
            if time_util::is_day_off(day) {
                debug!("休息日无新闻: {}", time_util::format_date(day));
                report.days_empty += 1;
                return Ok(BackfillState::Advancing { day });
            }
            warn!("⚠️ 没有新闻: {}", time_util::format_date(day));
            return Ok(BackfillState::RecordingFailure { day, error: None });
        }

        self.repo.write_news(&events, day).await?;
        self.repo.save().await?;
        on_day(&events, day);
        tracker.record_success();

        report.days_written += 1;
        report.events_written += events.len();
        info!(
            "已下载 {}: {} 条新闻",
            time_util::format_date(day),
            events.len()
        );
        Ok(BackfillState::Advancing { day })
    }

    fn should_skip_existing(&self, day: i64) -> bool {
        match self.config.skip_existing_before {
            Some(boundary) => day < time_util::start_of_day(boundary),
            None => true,
        }
    }

    /// 请求并解析一整天 [day, day + 86399]
    async fn fetch_day(&self, day: i64) -> AppResult<Vec<EconomicEvent>> {
        let day_end = day + SECONDS_IN_DAY - 1;
        let raw = tokio::time::timeout(self.config.fetch_timeout, self.fetcher.fetch(day, day_end))
            .await
            .map_err(|_| AppError::Timeout(self.config.fetch_timeout.as_secs()))??;
        parser::parse_response(&raw)
    }

    fn finish(
        stop: BackfillStop,
        mut tracker: FailureTracker,
        report: BackfillReport,
    ) -> AppResult<BackfillReport> {
        info!(
            "回填结束: {:?}, written={}, existing={}, failed={}, events={}",
            stop,
            report.days_written,
            report.days_existing,
            report.days_failed,
            report.events_written
        );

        match stop {
            BackfillStop::FailureThreshold => Err(AppError::NotAllDataDownloaded {
                days_with_data: report.days_with_data(),
                last_error: tracker
                    .take_last_error()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "empty responses".to_string()),
            }),
            BackfillStop::Exhausted if report.days_with_data() > 0 => Ok(report),
            BackfillStop::Exhausted => Err(tracker.take_last_error().unwrap_or(AppError::NoData)),
        }
    }
}
