//! 按天分片的键值存储接口

use async_trait::async_trait;

use crate::error::AppResult;

/// 按天分片的持久化存储
///
/// key 为当日 0 点时间戳，value 为序列化后的整天新闻批次。
/// 写入整体替换，不做局部更新。
#[async_trait]
pub trait DayShardStore: Send + Sync {
    /// 读取分片，不存在返回 None
    async fn get(&self, day_key: i64) -> AppResult<Option<Vec<u8>>>;

    /// 写入（替换）分片
    async fn put(&self, day_key: i64, payload: Vec<u8>) -> AppResult<()>;

    /// 将缓冲数据落盘
    async fn flush(&self) -> AppResult<()>;

    /// 分片是否存在
    async fn contains(&self, day_key: i64) -> AppResult<bool>;

    /// 最早和最晚的分片 key
    async fn key_range(&self) -> AppResult<Option<(i64, i64)>>;

    /// 全部分片 key，升序
    async fn keys(&self) -> AppResult<Vec<i64>>;
}
