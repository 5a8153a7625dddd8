//! 滑动窗口新闻缓存
//!
//! 内存中保留一段连续日期的新闻（按时间升序），查询落在窗口外时整体重载。

use tracing::{debug, warn};

use crate::domain::EconomicEvent;
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::NewsRepository;
use crate::time_util::{self, SECONDS_IN_DAY};

pub struct NewsCache {
    repo: NewsRepository,
    events: Vec<EconomicEvent>,
    /// 已加载的日期范围 [首日 0 点, 末日 0 点]
    window: Option<(i64, i64)>,
    indent_past_days: u32,
    indent_future_days: u32,
    reload_count: usize,
}

impl NewsCache {
    pub fn new(repo: NewsRepository) -> Self {
        Self {
            repo,
            events: Vec::new(),
            window: None,
            indent_past_days: 0,
            indent_future_days: 0,
            reload_count: 0,
        }
    }

    /// 重载时在查询范围两侧额外加载的天数
    ///
    /// 附近的后续查询可以直接命中缓存
    pub fn set_indent(&mut self, past_days: u32, future_days: u32) {
        self.indent_past_days = past_days;
        self.indent_future_days = future_days;
    }

    pub fn window(&self) -> Option<(i64, i64)> {
        self.window
    }

    pub fn reload_count(&self) -> usize {
        self.reload_count
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.window = None;
    }

    /// 查询 [timestamp - past, timestamp + future] 内的新闻，按时间升序
    ///
    /// 缓存为空，或者范围整体落在全部新闻之前/之后时返回 `NoData`；
    /// 范围落在两条新闻之间的空隙时返回空列表
    pub async fn query(&mut self, timestamp: i64, past: i64, future: i64) -> AppResult<Vec<EconomicEvent>> {
        if past < 0 || future < 0 {
            return Err(AppError::InvalidParameter(format!(
                "negative tolerance: past={}, future={}",
                past, future
            )));
        }
        // 超大容差视为不限，边界截断到日历范围
        let lo = time_util::clamp_timestamp(timestamp.saturating_sub(past));
        let hi = time_util::clamp_timestamp(timestamp.saturating_add(future));
        self.ensure_loaded(lo, hi).await?;

        if self.events.is_empty() {
            return Err(AppError::NoData);
        }
        let lower = self.events.partition_point(|e| e.timestamp < lo);
        let upper = self.events.partition_point(|e| e.timestamp <= hi);
        let len = self.events.len();
        if (lower == len && upper == len) || (lower == 0 && upper == 0) {
            return Err(AppError::NoData);
        }
        Ok(self.events[lower..upper].to_vec())
    }

    /// 同 `query`，附带每条新闻相对查询时间的偏移（秒）
    pub async fn query_with_offsets(
        &mut self,
        timestamp: i64,
        past: i64,
        future: i64,
    ) -> AppResult<Vec<(EconomicEvent, i64)>> {
        let events = self.query(timestamp, past, future).await?;
        Ok(events
            .into_iter()
            .map(|e| {
                let offset = e.timestamp - timestamp;
                (e, offset)
            })
            .collect())
    }

    async fn ensure_loaded(&mut self, lo: i64, hi: i64) -> AppResult<()> {
        let first_day = time_util::start_of_day(lo);
        let last_day = time_util::start_of_day(hi);
        if let Some((begin, end)) = self.window {
            if begin <= first_day && last_day <= end {
                return Ok(());
            }
        }

        let load_begin = first_day - self.indent_past_days as i64 * SECONDS_IN_DAY;
        let load_end = last_day + self.indent_future_days as i64 * SECONDS_IN_DAY;

        self.events.clear();
        // 只读取存储中实际存在的日期范围
        let stored = match self.repo.min_max_timestamp().await {
            Ok(range) => range,
            Err(e) => {
                self.window = None;
                return Err(e);
            }
        };
        let (mut day, read_end) = match stored {
            Some((min_day, max_day)) => (load_begin.max(min_day), load_end.min(max_day)),
            None => (load_begin, load_begin - SECONDS_IN_DAY),
        };
        while day <= read_end {
            match self.repo.read_news(day).await {
                Ok(Some(mut events)) => self.events.append(&mut events),
                Ok(None) => {}
                // 损坏的分片按缺失处理
                Err(AppError::Parse(msg)) => warn!("跳过无法解析的分片: {}", msg),
                Err(e) => {
                    self.window = None;
                    return Err(e);
                }
            }
            day += SECONDS_IN_DAY;
        }
        self.events.sort_by_key(|e| e.timestamp);
        self.window = Some((load_begin, load_end));
        self.reload_count += 1;

        debug!(
            "新闻缓存重载: {} - {}, {} 条",
            time_util::format_date(load_begin),
            time_util::format_date(load_end),
            self.events.len()
        );
        Ok(())
    }
}
