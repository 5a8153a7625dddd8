//! 响应解析
//!
//! 外层是 JSON，`renderedFilteredEvents` 字段内嵌表格标记

use serde::Deserialize;
use tracing::debug;

use crate::domain::EconomicEvent;
use crate::error::{AppError, AppResult};
use crate::parser::extractor::{extract, Extraction};
use crate::parser::markup::RowFragments;

#[derive(Debug, Deserialize)]
struct CalendarEnvelope {
    #[serde(rename = "renderedFilteredEvents")]
    rendered_filtered_events: String,
}

/// 单次解析统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    pub rows: usize,
    pub skipped: usize,
    pub incomplete: usize,
    pub complete: usize,
}

/// 解析一次请求的原始响应，返回完整新闻，保持源顺序
///
/// 外层无法解析（非 JSON 或缺少字段）整体失败，不返回部分结果
pub fn parse_response(raw: &[u8]) -> AppResult<Vec<EconomicEvent>> {
    let envelope: CalendarEnvelope = serde_json::from_slice(raw)
        .map_err(|e| AppError::Parse(format!("invalid calendar envelope: {}", e)))?;

    let (events, summary) = parse_rows(&envelope.rendered_filtered_events);
    debug!(
        "解析日历响应: rows={}, skipped={}, incomplete={}, complete={}",
        summary.rows, summary.skipped, summary.incomplete, summary.complete
    );
    Ok(events)
}

/// 扫描表格标记中的所有行
pub fn parse_rows(text: &str) -> (Vec<EconomicEvent>, ParseSummary) {
    let mut summary = ParseSummary::default();
    let mut events = Vec::new();

    for fragment in RowFragments::new(text) {
        summary.rows += 1;
        match extract(fragment) {
            Extraction::Skipped => summary.skipped += 1,
            Extraction::Incomplete(_) => summary.incomplete += 1,
            Extraction::Complete(event) => {
                summary.complete += 1;
                events.push(event);
            }
        }
    }
    (events, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Volatility;

    const TABLE: &str = concat!(
        r#"<tr id="theDay1573948800"><td class="theDay" colspan="8">Monday, November 18, 2019</td></tr>"#,
        r#"<tr id="eventRowId_1" event_timestamp="2019-11-18 00:30:00">"#,
        r#"<td class="left flagCur noWrap"><span title="Australia" class="ceFlags Australia">&nbsp;</span> AUD</td>"#,
        r#"<td class="left textNum sentiment noWrap" title="Moderate Volatility Expected"></td>"#,
        r#"<td class="left event">House Price Index q/q</td>"#,
        r#"<td id="eventActual_1">2.4%</td><td id="eventForecast_1">1.0%</td><td id="eventPrevious_1">-0.7%</td></tr>"#,
        r#"<tr id="eventRowId_2" event_timestamp="2019-11-18 10:00:00">"#,
        r#"<td class="left textNum sentiment noWrap" title="High Volatility Expected"></td>"#,
        r#"<td class="left event">ECB President Lagarde Speaks</td></tr>"#,
        r#"<tr id="eventRowId_3" event_timestamp="2019-11-18 15:00:00">"#,
        r#"<td class="left flagCur noWrap"><span title="United States" class="ceFlags United_States">&nbsp;</span> USD</td>"#,
        r#"<td class="left textNum sentiment noWrap" title="High Volatility Expected"></td>"#,
        r#"<td class="left event">NAHB Housing Market Index</td>"#,
        r#"<td id="eventActual_3">70</td><td id="eventForecast_3">71</td><td id="eventPrevious_3">71</td></tr>"#,
    );

    #[test]
    fn test_parse_rows_keeps_complete_in_order() {
        let (events, summary) = parse_rows(TABLE);
        assert_eq!(
            summary,
            ParseSummary {
                rows: 4,
                skipped: 1,
                incomplete: 1,
                complete: 2
            }
        );
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].currency, "AUD");
        assert_eq!(events[0].volatility, Volatility::Moderate);
        assert_eq!(events[1].name, "NAHB Housing Market Index");
        assert_eq!(events[1].country, "United States");
        assert_eq!(events[1].actual, Some(70.0));
    }

    #[test]
    fn test_parse_response_envelope() {
        let raw = serde_json::json!({ "renderedFilteredEvents": TABLE, "bind_scroll_handler": true });
        let events = parse_response(raw.to_string().as_bytes()).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_parse_response_empty_table() {
        let raw = br#"{"renderedFilteredEvents":""}"#;
        assert!(parse_response(raw).unwrap().is_empty());
    }

    #[test]
    fn test_parse_response_rejects_bad_envelope() {
        assert!(matches!(parse_response(b"<html>502</html>"), Err(AppError::Parse(_))));
        assert!(matches!(parse_response(br#"{"rows":[]}"#), Err(AppError::Parse(_))));
        assert!(matches!(
            parse_response(br#"{"renderedFilteredEvents":42}"#),
            Err(AppError::Parse(_))
        ));
    }
}
