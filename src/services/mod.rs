//! 服务层
//!
//! - `backfill_service`: 逐日下载并写入分片
//! - `news_cache`: 查询用滑动窗口缓存
//! - `news_filter`: 货币对 + 波动性过滤
//! - `news_stats`: 存储统计

pub mod backfill_service;
pub mod news_cache;
pub mod news_filter;
pub mod news_stats;

pub use backfill_service::{
    BackfillConfig, BackfillReport, BackfillService, BackfillState, BackfillStop, FailureTracker,
    WalkDirection,
};
pub use news_cache::NewsCache;
pub use news_filter::{split_pair, FilterState, NewsFilter, VolatilitySelection};
pub use news_stats::NewsStats;
