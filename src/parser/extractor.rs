//! 单行新闻提取
//!
//! 输入一个 `<tr ...>` 行片段，独立查找各字段，缺失字段不报错。
//! 没有时间戳标记的行不是事件行，直接跳过。

use crate::domain::{EconomicEvent, Volatility};
use crate::parser::markup::{self, NBSP};
use crate::time_util;

/// 已找到的结构字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FoundFields(u8);

impl FoundFields {
    pub const TIME: u8 = 0x01;
    pub const NAME: u8 = 0x02;
    pub const VOLATILITY: u8 = 0x04;
    pub const DATA: u8 = 0x08;
    pub const ALL: u8 = 0x0F;

    pub fn insert(&mut self, flag: u8) {
        self.0 |= flag;
    }

    pub fn contains(&self, flag: u8) -> bool {
        self.0 & flag == flag
    }

    pub fn is_complete(&self) -> bool {
        self.contains(Self::ALL)
    }
}

/// 提取结果
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// 没有时间戳标记，不是事件行
    Skipped,
    /// 缺少必需字段，丢弃
    Incomplete(FoundFields),
    Complete(EconomicEvent),
}

impl Extraction {
    pub fn into_event(self) -> Option<EconomicEvent> {
        match self {
            Extraction::Complete(event) => Some(event),
            _ => None,
        }
    }
}

/// 从一行片段提取新闻
pub fn extract(fragment: &str) -> Extraction {
    if !fragment.contains(markup::EVENT_TIMESTAMP) {
        return Extraction::Skipped;
    }

    let mut found = FoundFields::default();
    let mut event = EconomicEvent::new("", "", "", Volatility::Unset, 0);

    // 时间戳值缺失或无法解析都视为没有时间
    if let Some(ts) = markup::quoted_after(fragment, markup::EVENT_TIMESTAMP)
        .and_then(time_util::parse_timestamp)
    {
        event.timestamp = ts;
        found.insert(FoundFields::TIME);
    }

    event.previous = extract_value(fragment, markup::EVENT_PREVIOUS);
    event.actual = extract_value(fragment, markup::EVENT_ACTUAL);
    event.forecast = extract_value(fragment, markup::EVENT_FORECAST);
    if event.has_data() {
        found.insert(FoundFields::DATA);
    }

    if let Some(sentiment) = markup::content_after(fragment, markup::SENTIMENT_CELL, "\"") {
        event.volatility = Volatility::from_sentiment(sentiment);
        if event.volatility.is_set() {
            found.insert(FoundFields::VOLATILITY);
        }
    }

    if let Some(raw_name) = markup::content_after(fragment, markup::EVENT_NAME_CELL, "<") {
        event.name = normalize_name(raw_name);
        found.insert(FoundFields::NAME);
    }

    if let Some(cell) = markup::flag_cell(fragment) {
        let (country, currency) = extract_country_currency(cell);
        event.country = country;
        event.currency = currency;
    }

    if found.is_complete() {
        Extraction::Complete(event)
    } else {
        Extraction::Incomplete(found)
    }
}

fn extract_value(fragment: &str, marker: &str) -> Option<f64> {
    markup::cell_text_after(fragment, marker).and_then(parse_value)
}

/// 解析数值单元格，占位符、空单元格或无数字前缀返回 None
///
/// 取数字前缀，单位后缀（%、K、M、B）忽略，千位分隔符去掉
pub fn parse_value(cell: &str) -> Option<f64> {
    if cell.contains(NBSP) {
        return None;
    }
    let cleaned: String = cell.trim().chars().filter(|c| *c != ',').collect();

    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in cleaned.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    cleaned[..end].parse::<f64>().ok()
}

/// 名称规整：去掉 &nbsp;、去掉 \t \v \n \r、首尾去空白、内部连续空白合并为一个空格
pub fn normalize_name(raw: &str) -> String {
    let stripped: String = raw
        .replace(NBSP, "")
        .chars()
        .filter(|c| !matches!(c, '\t' | '\u{0B}' | '\n' | '\r'))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// (国家, 货币)：国家取 title 属性，货币取 `</span>` 后的可见文本并去掉所有空白
fn extract_country_currency(cell: &str) -> (String, String) {
    let country = cell
        .find(markup::TITLE_ATTR)
        .and_then(|pos| markup::delimited(cell, pos + markup::TITLE_ATTR.len(), "\"", "\""))
        .unwrap_or_default()
        .to_string();

    let currency: String = cell
        .find(markup::CURRENCY_AFTER)
        .map(|pos| &cell[pos + markup::CURRENCY_AFTER.len()..])
        .map(|text| text.chars().filter(|c| !c.is_whitespace()).collect())
        .unwrap_or_default();

    (country, currency)
}
