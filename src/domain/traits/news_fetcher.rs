//! 新闻数据源接口

use async_trait::async_trait;

use crate::error::AppResult;

/// 远程日历数据源
///
/// 返回原始响应体（已解压），解析由 `parser` 负责
#[async_trait]
pub trait NewsFetcher: Send + Sync {
    /// 获取 [day_start, day_end] 内的日历数据
    ///
    /// # Arguments
    /// * `day_start` - 开始时间戳 (秒)
    /// * `day_end` - 结束时间戳 (秒)
    async fn fetch(&self, day_start: i64, day_end: i64) -> AppResult<Vec<u8>>;
}
