//! 领域模型层
//!
//! - `entities`: 经济日历事件
//! - `traits`: 外部协作者接口（数据源、分片存储），由基础设施层实现

pub mod entities;
pub mod traits;

pub use entities::{EconomicEvent, Volatility};
pub use traits::{DayShardStore, NewsFetcher};
