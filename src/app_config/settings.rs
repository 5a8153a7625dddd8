//! 下载器设置
//!
//! 优先级：命令行 > 设置文件 > 环境变量 > 默认值

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::app_config::env::{env_i64, env_opt_bool, env_or_default};
use crate::error::{AppError, AppResult};
use crate::infrastructure::sources::FetcherConfig;
use crate::services::{BackfillConfig, WalkDirection};
use crate::time_util;

/// 数据库为目录时使用的文件名
pub const DEFAULT_DB_FILE: &str = "forexprostools-news.db";

/// 源站日历数据的最早日期
pub const DEFAULT_HISTORY_START: &str = "2007-01-01";

#[derive(Debug, Clone, PartialEq)]
pub struct NewsSettings {
    /// 数据库文件或目录，空则使用当前目录下的默认文件
    pub path_database: String,
    /// 是否下载休息日的数据
    pub use_day_off: bool,
    pub failure_threshold: u32,
    /// 每次运行重新下载的最近天数
    pub refresh_days: i64,
    pub fetch_timeout_secs: u64,
    pub fetch_attempts: usize,
    pub direction: WalkDirection,
    /// 为空时使用默认国家列表
    pub countries: Vec<u32>,
    /// 空库时的起始日期 YYYY-MM-DD
    pub history_start: String,
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            path_database: String::new(),
            use_day_off: true,
            failure_threshold: 30,
            refresh_days: 7,
            fetch_timeout_secs: 60,
            fetch_attempts: 1,
            direction: WalkDirection::Forward,
            countries: Vec::new(),
            history_start: DEFAULT_HISTORY_START.to_string(),
        }
    }
}

/// 设置文件内容，所有键可选
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    path_database: Option<String>,
    is_use_day_off: Option<bool>,
    is_skip_day_off: Option<bool>,
    failure_threshold: Option<u32>,
    refresh_days: Option<i64>,
    fetch_timeout_secs: Option<u64>,
    fetch_attempts: Option<usize>,
    direction: Option<WalkDirection>,
    countries: Option<Vec<u32>>,
    history_start: Option<String>,
}

impl NewsSettings {
    /// 默认值叠加环境变量
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            path_database: env_or_default("NEWS_DB_PATH", &default.path_database),
            use_day_off: env_opt_bool("NEWS_SKIP_DAY_OFF")
                .map(|skip| !skip)
                .unwrap_or(default.use_day_off),
            failure_threshold: clamp_u32(env_i64(
                "NEWS_FAILURE_THRESHOLD",
                default.failure_threshold as i64,
            )),
            refresh_days: env_i64("NEWS_REFRESH_DAYS", default.refresh_days).max(0),
            fetch_timeout_secs: env_i64("NEWS_FETCH_TIMEOUT_SECS", default.fetch_timeout_secs as i64)
                .max(1) as u64,
            history_start: env_or_default("NEWS_HISTORY_START", &default.history_start),
            ..default
        }
    }

    /// 环境变量之上叠加设置文件（如果给出）
    pub fn load(path_json: Option<&Path>) -> AppResult<Self> {
        let mut settings = Self::from_env();
        if let Some(path) = path_json {
            let text = std::fs::read_to_string(path).map_err(|e| {
                AppError::Config(format!("cannot read settings {}: {}", path.display(), e))
            })?;
            settings.merge_json(&text)?;
            debug!("已加载设置文件: {}", path.display());
        }
        Ok(settings)
    }

    /// 叠加 JSON 设置；`is_skip_day_off` 优先于 `is_use_day_off`
    pub fn merge_json(&mut self, text: &str) -> AppResult<()> {
        let file: SettingsFile = serde_json::from_str(text)
            .map_err(|e| AppError::Config(format!("invalid settings json: {}", e)))?;

        if let Some(path) = file.path_database {
            self.path_database = path;
        }
        if let Some(use_day_off) = file.is_use_day_off {
            self.use_day_off = use_day_off;
        }
        if let Some(skip) = file.is_skip_day_off {
            self.use_day_off = !skip;
        }
        if let Some(v) = file.failure_threshold {
            self.failure_threshold = v;
        }
        if let Some(v) = file.refresh_days {
            self.refresh_days = v.max(0);
        }
        if let Some(v) = file.fetch_timeout_secs {
            self.fetch_timeout_secs = v.max(1);
        }
        if let Some(v) = file.fetch_attempts {
            self.fetch_attempts = v.max(1);
        }
        if let Some(v) = file.direction {
            self.direction = v;
        }
        if let Some(v) = file.countries {
            self.countries = v;
        }
        if let Some(v) = file.history_start {
            self.history_start = v;
        }
        Ok(())
    }

    /// 命令行参数覆盖
    pub fn apply_cli(&mut self, path_database: Option<String>, no_day_off: bool) {
        if let Some(path) = path_database {
            self.path_database = path;
        }
        if no_day_off {
            self.use_day_off = false;
        }
    }

    pub fn skip_day_off(&self) -> bool {
        !self.use_day_off
    }

    pub fn history_start_timestamp(&self) -> AppResult<i64> {
        time_util::parse_date(&self.history_start).ok_or_else(|| {
            AppError::Config(format!("invalid history_start '{}'", self.history_start))
        })
    }

    /// 数据库文件路径，必要时创建所在目录
    ///
    /// 没有扩展名的路径视为目录，数据库文件放在目录内
    pub fn database_path(&self) -> AppResult<PathBuf> {
        if self.path_database.trim().is_empty() {
            return Ok(PathBuf::from(DEFAULT_DB_FILE));
        }

        let path = PathBuf::from(self.path_database.trim());
        let (dir, file) = if path.extension().is_none() {
            (Some(path.clone()), path.join(DEFAULT_DB_FILE))
        } else {
            (path.parent().map(Path::to_path_buf), path)
        };

        if let Some(dir) = dir.filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(file)
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            timeout_secs: self.fetch_timeout_secs,
            attempts: self.fetch_attempts.max(1),
            countries: self.countries.clone(),
            ..FetcherConfig::from_env()
        }
    }

    pub fn backfill_config(&self) -> BackfillConfig {
        BackfillConfig {
            failure_threshold: self.failure_threshold,
            skip_day_off: self.skip_day_off(),
            direction: self.direction,
            // 超时后还要留出重试时间
            fetch_timeout: Duration::from_secs(
                self.fetch_timeout_secs
                    .saturating_mul(u64::try_from(self.fetch_attempts.max(1)).unwrap_or(u64::MAX))
                    .saturating_add(15),
            ),
            skip_existing_before: None,
        }
    }
}

/// 负数取 0，超出 u32 取上限
fn clamp_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
