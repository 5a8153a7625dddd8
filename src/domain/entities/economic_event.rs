//! 经济日历事件实体
//!
//! 一条日历新闻：时间、分类、国家/货币以及可选的数值

use serde::{Deserialize, Serialize};

/// 新闻波动性等级
///
/// 序列化为整数：-1 未识别, 0 低, 1 中, 2 高
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum Volatility {
    /// 源数据中没有或无法识别
    Unset = -1,
    Low = 0,
    Moderate = 1,
    High = 2,
}

impl From<i32> for Volatility {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::Low,
            1 => Self::Moderate,
            2 => Self::High,
            _ => Self::Unset,
        }
    }
}

impl From<Volatility> for i32 {
    fn from(value: Volatility) -> Self {
        value as i32
    }
}

impl Volatility {
    /// 从 sentiment 文本中识别等级，区分大小写，先匹配先得
    pub fn from_sentiment(text: &str) -> Self {
        if text.contains("Low") {
            Self::Low
        } else if text.contains("Moderate") {
            Self::Moderate
        } else if text.contains("High") {
            Self::High
        } else {
            Self::Unset
        }
    }

    pub fn is_set(&self) -> bool {
        *self != Self::Unset
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

/// 经济日历事件实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicEvent {
    /// 事件名称（已规整空白）
    pub name: String,
    /// 货币代码，可能为空
    pub currency: String,
    /// 国家名称，可能为空
    pub country: String,
    pub volatility: Volatility,
    /// 计划发布时间 (Unix 秒, UTC)
    pub timestamp: i64,
    /// 前值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<f64>,
    /// 实际值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<f64>,
    /// 预期值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<f64>,
}

impl EconomicEvent {
    pub fn new(
        name: impl Into<String>,
        currency: impl Into<String>,
        country: impl Into<String>,
        volatility: Volatility,
        timestamp: i64,
    ) -> Self {
        Self {
            name: name.into(),
            currency: currency.into(),
            country: country.into(),
            volatility,
            timestamp,
            previous: None,
            actual: None,
            forecast: None,
        }
    }

    pub fn with_values(
        mut self,
        previous: Option<f64>,
        actual: Option<f64>,
        forecast: Option<f64>,
    ) -> Self {
        self.previous = previous;
        self.actual = actual;
        self.forecast = forecast;
        self
    }

    /// 至少有一个数值
    pub fn has_data(&self) -> bool {
        self.previous.is_some() || self.actual.is_some() || self.forecast.is_some()
    }

    /// 事件是否与货币匹配
    pub fn matches_currency(&self, currency: &str) -> bool {
        !self.currency.is_empty() && self.currency == currency
    }
}
