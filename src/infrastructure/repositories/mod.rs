pub mod memory_shard_store;
pub mod news_repository;
pub mod sqlite_shard_store;

pub use memory_shard_store::InMemoryShardStore;
pub use news_repository::NewsRepository;
pub use sqlite_shard_store::SqliteShardStore;
