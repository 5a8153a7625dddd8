use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;
use tracing::{debug, warn};

use crate::app_config::env::{env_i64, env_or_default};
use crate::domain::NewsFetcher;
use crate::error::{AppError, AppResult};
use crate::time_util;

pub const DEFAULT_URL: &str = "https://sslecal2.forexprostools.com/ajax.php";
const HOST: &str = "sslecal2.forexprostools.com";

/// 源站默认请求的国家编号
pub const DEFAULT_COUNTRIES: [u32; 96] = [
    4, 5, 6, 7, 9, 10, 11, 12, 14, 15, 17, 20, 21, 22, 23, 24, 25, 26, 27, 29, 32, 33, 34, 35, 36,
    37, 38, 39, 41, 42, 43, 44, 45, 46, 47, 48, 51, 52, 53, 54, 55, 56, 57, 59, 60, 61, 63, 66, 68,
    70, 71, 72, 75, 78, 80, 84, 85, 87, 89, 90, 92, 93, 94, 96, 97, 100, 102, 103, 105, 106, 107,
    109, 110, 111, 112, 113, 119, 121, 122, 123, 125, 138, 139, 143, 145, 162, 163, 170, 172, 174,
    178, 188, 193, 202, 238, 247,
];

/// 常用国家编号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountryCode {
    UnitedKingdom = 4,
    UnitedStates = 5,
    Canada = 6,
    Italy = 10,
    SouthKorea = 11,
    Switzerland = 12,
    India = 14,
    Germany = 17,
    France = 22,
    Australia = 25,
    Spain = 26,
    Brazil = 32,
    Japan = 35,
    Singapore = 36,
    China = 37,
    HongKong = 39,
    NewZealand = 43,
    Austria = 54,
    Russia = 56,
    EuroZone = 72,
    SouthAfrica = 110,
}

/// 数据源客户端配置
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub url: String,
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
    /// 单次请求的尝试次数，至少 1
    pub attempts: usize,
    /// 为空时使用默认国家列表
    pub countries: Vec<u32>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            timeout_secs: 60,
            attempts: 1,
            countries: Vec::new(),
        }
    }
}

impl FetcherConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            url: env_or_default("NEWS_SOURCE_URL", DEFAULT_URL),
            timeout_secs: env_i64("NEWS_FETCH_TIMEOUT_SECS", default.timeout_secs as i64).max(1) as u64,
            attempts: env_i64("NEWS_FETCH_ATTEMPTS", default.attempts as i64).max(1) as usize,
            countries: default.countries,
        }
    }
}

/// 拼接表单请求体
///
/// timeZone=55 为 GMT，lang=1 为英文
pub fn build_request_body(day_start: i64, day_end: i64, countries: &[u32]) -> String {
    let (y1, m1, d1) = time_util::date_parts(day_start);
    let (y2, m2, d2) = time_util::date_parts(day_end);

    let mut body = format!(
        "dateFrom={}-{}-{}&dateTo={}-{}-{}&timeframe=&",
        y1, m1, d1, y2, m2, d2
    );
    for column in [
        "exc_flags",
        "exc_currency",
        "exc_importance",
        "exc_actual",
        "exc_forecast",
        "exc_previous",
    ] {
        body.push_str(&format!("columns[]={}&", column));
    }
    body.push_str("timeZone=55&quotes_search_text=&");

    let countries = if countries.is_empty() {
        &DEFAULT_COUNTRIES[..]
    } else {
        countries
    };
    for country in countries {
        body.push_str(&format!("country[]={}&", country));
    }
    body.push_str("timeFilter=timeOnly&action=filter&lang=1");
    body
}

/// forexprostools 日历客户端
///
/// 由调用方在启动时创建一次，内部持有连接池
pub struct ForexprostoolsClient {
    client: Client,
    config: FetcherConfig,
}

impl ForexprostoolsClient {
    pub fn new(config: FetcherConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .build()
            .map_err(|e| AppError::Config(format!("http client init failed: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> AppResult<Self> {
        Self::new(FetcherConfig::from_env())
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    async fn post_once(&self, body: &str) -> AppResult<Vec<u8>> {
        let response = self
            .client
            .post(&self.config.url)
            .header("Host", HOST)
            .header("Accept", "application/json, text/javascript, */*; q=0.01")
            .header("Accept-Language", "en-US,en;q=0.5")
            .header(
                "Content-Type",
                "application/x-www-form-urlencoded; charset=UTF-8",
            )
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status_code = response.status();
        if status_code != StatusCode::OK {
            return Err(AppError::Transport(format!("unexpected status {}", status_code)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        Ok(bytes.to_vec())
    }

    fn map_transport_error(&self, err: reqwest::Error) -> AppError {
        if err.is_timeout() {
            AppError::Timeout(self.config.timeout_secs)
        } else {
            AppError::from(err)
        }
    }
}

#[async_trait]
impl NewsFetcher for ForexprostoolsClient {
    async fn fetch(&self, day_start: i64, day_end: i64) -> AppResult<Vec<u8>> {
        let body = build_request_body(day_start, day_end, &self.config.countries);
        debug!(
            "请求日历数据: {} - {}",
            time_util::format_date(day_start),
            time_util::format_date(day_end)
        );

        let strategy = ExponentialBackoff::from_millis(500)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.config.attempts.saturating_sub(1));

        let body = body.as_str();
        Retry::spawn(strategy, move || async move {
            let result = self.post_once(body).await;
            if let Err(e) = &result {
                warn!("日历请求失败: {}", e);
            }
            result
        })
        .await
    }
}
