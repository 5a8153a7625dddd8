//! 经济日历新闻下载与查询
//!
//! - 下载：`job` → `services::backfill_service` → `parser` → `infrastructure::repositories`
//! - 查询：`services::news_filter` → `services::news_cache` → `infrastructure::repositories`

pub mod app;
pub mod app_config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod job;
pub mod parser;
pub mod services;
pub mod time_util;

pub use domain::{EconomicEvent, Volatility};
pub use error::{AppError, AppResult};
