//! 领域接口模块
//!
//! 定义核心依赖的外部协作者，由基础设施层实现

pub mod day_shard_store;
pub mod news_fetcher;

pub use day_shard_store::DayShardStore;
pub use news_fetcher::NewsFetcher;
