//! 新闻过滤
//!
//! 判断某个货币对在时间点附近是否有相关新闻

use tokio::sync::Mutex;

use crate::domain::{EconomicEvent, Volatility};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::NewsRepository;
use crate::services::news_cache::NewsCache;

/// 货币对名称中需要去掉的经纪商前缀
pub const BROKER_PREFIXES: [&str; 1] = ["frx"];

const PAIR_NAME_LEN: usize = 6;

/// 过滤结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    NewsFound,
    NoNews,
}

/// 拆分货币对，如 `frxEURUSD` -> (EUR, USD)
///
/// 去掉非字母字符和经纪商前缀后转大写，结果必须正好 6 个字母
pub fn split_pair(pair_name: &str) -> AppResult<(String, String)> {
    let mut name: String = pair_name.chars().filter(|c| c.is_ascii_alphabetic()).collect();
    for prefix in BROKER_PREFIXES {
        name = name.replace(prefix, "");
    }
    let name = name.to_ascii_uppercase();
    if name.len() != PAIR_NAME_LEN {
        return Err(AppError::InvalidParameter(format!(
            "cannot split pair name '{}'",
            pair_name
        )));
    }
    Ok((name[..3].to_string(), name[3..].to_string()))
}

/// 关注的波动性等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VolatilitySelection {
    pub low: bool,
    pub moderate: bool,
    pub high: bool,
    /// 出现未选中等级的新闻时直接判定为没有新闻
    pub only_selected: bool,
}

impl VolatilitySelection {
    pub fn new(low: bool, moderate: bool, high: bool) -> Self {
        Self {
            low,
            moderate,
            high,
            only_selected: false,
        }
    }

    pub fn only_selected(mut self, only_selected: bool) -> Self {
        self.only_selected = only_selected;
        self
    }

    pub fn contains(&self, volatility: Volatility) -> bool {
        match volatility {
            Volatility::Low => self.low,
            Volatility::Moderate => self.moderate,
            Volatility::High => self.high,
            Volatility::Unset => false,
        }
    }
}

/// 阈值模式：任意匹配货币的新闻波动性不低于阈值即为有新闻
pub fn match_threshold(events: &[EconomicEvent], currencies: &(String, String), min: Volatility) -> FilterState {
    let found = events
        .iter()
        .any(|e| is_pair_currency(e, currencies) && e.volatility >= min);
    if found {
        FilterState::NewsFound
    } else {
        FilterState::NoNews
    }
}

/// 选择模式：未识别等级的新闻忽略
pub fn match_selection(
    events: &[EconomicEvent],
    currencies: &(String, String),
    selection: VolatilitySelection,
) -> FilterState {
    let mut state = FilterState::NoNews;
    for event in events.iter().filter(|e| is_pair_currency(e, currencies)) {
        if !event.volatility.is_set() {
            continue;
        }
        if selection.contains(event.volatility) {
            state = FilterState::NewsFound;
        } else if selection.only_selected {
            return FilterState::NoNews;
        }
    }
    state
}

fn is_pair_currency(event: &EconomicEvent, currencies: &(String, String)) -> bool {
    event.matches_currency(&currencies.0) || event.matches_currency(&currencies.1)
}

/// 查询 + 过滤，内部持有滑动窗口缓存
pub struct NewsFilter {
    cache: Mutex<NewsCache>,
}

impl NewsFilter {
    pub fn new(repo: NewsRepository) -> Self {
        Self::with_cache(NewsCache::new(repo))
    }

    pub fn with_cache(cache: NewsCache) -> Self {
        Self {
            cache: Mutex::new(cache),
        }
    }

    pub async fn set_indent(&self, past_days: u32, future_days: u32) {
        self.cache.lock().await.set_indent(past_days, future_days);
    }

    pub async fn reload_count(&self) -> usize {
        self.cache.lock().await.reload_count()
    }

    /// 窗口内的新闻，没有数据时返回空列表
    async fn events_near(&self, timestamp: i64, past: i64, future: i64) -> AppResult<Vec<EconomicEvent>> {
        let mut cache = self.cache.lock().await;
        match cache.query(timestamp, past, future).await {
            Ok(events) => Ok(events),
            Err(AppError::NoData) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// 阈值模式
    pub async fn filter_threshold(
        &self,
        pair_name: &str,
        timestamp: i64,
        past: i64,
        future: i64,
        min_volatility: Volatility,
    ) -> AppResult<FilterState> {
        let currencies = split_pair(pair_name)?;
        let events = self.events_near(timestamp, past, future).await?;
        Ok(match_threshold(&events, &currencies, min_volatility))
    }

    /// 选择模式
    pub async fn filter(
        &self,
        pair_name: &str,
        timestamp: i64,
        past: i64,
        future: i64,
        selection: VolatilitySelection,
    ) -> AppResult<FilterState> {
        let currencies = split_pair(pair_name)?;
        let events = self.events_near(timestamp, past, future).await?;
        Ok(match_selection(&events, &currencies, selection))
    }

    /// 在 [range.0, range.1] 内按 `step` 秒扫描，返回第一个有新闻的时间点
    ///
    /// 参数或存储错误直接返回，不当作没有新闻
    pub async fn scan_first(
        &self,
        pair_name: &str,
        range: (i64, i64),
        step: i64,
        past: i64,
        future: i64,
        selection: VolatilitySelection,
    ) -> AppResult<Option<i64>> {
        if step <= 0 {
            return Err(AppError::InvalidParameter(format!(
                "scan step must be positive, got {}",
                step
            )));
        }
        let (from, to) = range;
        let mut t = from;
        while t <= to {
            if self.filter(pair_name, t, past, future, selection).await? == FilterState::NewsFound {
                return Ok(Some(t));
            }
            t = match t.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(None)
    }

    /// 选择模式下是否有新闻，任何错误都视为没有
    pub async fn is_news(
        &self,
        pair_name: &str,
        timestamp: i64,
        past: i64,
        future: i64,
        selection: VolatilitySelection,
    ) -> bool {
        matches!(
            self.filter(pair_name, timestamp, past, future, selection).await,
            Ok(FilterState::NewsFound)
        )
    }
}
