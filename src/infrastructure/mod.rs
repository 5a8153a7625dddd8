//! 基础设施层
//!
//! - `sources`: 远程日历数据源（reqwest）
//! - `repositories`: 分片存储实现（SQLite / 内存）与存储门面

pub mod repositories;
pub mod sources;

pub use repositories::{InMemoryShardStore, NewsRepository, SqliteShardStore};
pub use sources::{FetcherConfig, ForexprostoolsClient};
