//! 源站表格标记扫描
//!
//! 只识别固定的一组标签和属性，不是通用 HTML 解析器。
//! 页面结构变化时只需要调整这里的标记。

/// 行边界
pub const ROW_BEGIN: &str = "<tr";
pub const ROW_END: &str = "</tr>";

/// 事件时间属性，值用双引号包裹
pub const EVENT_TIMESTAMP: &str = "event_timestamp=";

/// 数值单元格 id 前缀，值位于 `>` 与 `<` 之间
pub const EVENT_ACTUAL: &str = "eventActual_";
pub const EVENT_FORECAST: &str = "eventForecast_";
pub const EVENT_PREVIOUS: &str = "eventPrevious_";

/// 波动性单元格，title 属性的值以 `"` 结束
pub const SENTIMENT_CELL: &str = "<td class=\"left textNum sentiment noWrap\" title=\"";

/// 事件名称单元格，名称到下一个 `<` 为止
pub const EVENT_NAME_CELL: &str = "<td class=\"left event\">";

/// 国家/货币单元格
pub const FLAG_CELL: &str = "<td class=\"left flagCur noWrap\">";
pub const CELL_END: &str = "</td>";
pub const TITLE_ATTR: &str = "title=";
pub const CURRENCY_AFTER: &str = "</span>";

/// 无数据占位符
pub const NBSP: &str = "&nbsp;";

const QUOTE: &str = "\"";

/// 从 `from` 开始查找 `pat`，返回绝对位置
pub fn find_from(text: &str, pat: &str, from: usize) -> Option<usize> {
    text.get(from..)?.find(pat).map(|pos| pos + from)
}

/// 取 `from` 之后第一个 `open` 与其后第一个 `close` 之间的内容
///
/// 任一分隔符缺失（未闭合）返回 None
pub fn delimited<'a>(text: &'a str, from: usize, open: &str, close: &str) -> Option<&'a str> {
    let begin = find_from(text, open, from)? + open.len();
    let end = find_from(text, close, begin)?;
    text.get(begin..end)
}

/// 取 `from` 到下一个 `close` 之间的内容
pub fn take_until<'a>(text: &'a str, from: usize, close: &str) -> Option<&'a str> {
    let end = find_from(text, close, from)?;
    text.get(from..end)
}

/// 标记之后的双引号值，如 `event_timestamp="2019-11-18 00:30:00"`
pub fn quoted_after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let pos = text.find(marker)?;
    delimited(text, pos + marker.len(), QUOTE, QUOTE)
}

/// 标记之后第一个 `>` 与 `<` 之间的文本，用于数值单元格
pub fn cell_text_after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let pos = text.find(marker)?;
    delimited(text, pos + marker.len(), ">", "<")
}

/// 以完整开始标记定位后，到 `close` 为止的内容
pub fn content_after<'a>(text: &'a str, marker: &str, close: &str) -> Option<&'a str> {
    let pos = text.find(marker)?;
    take_until(text, pos + marker.len(), close)
}

/// 国家/货币单元格内部内容（开始标记之后到 `</td>`）
pub fn flag_cell(text: &str) -> Option<&str> {
    content_after(text, FLAG_CELL, CELL_END)
}

/// 按行边界切分，产出每一行片段（含 `<tr`，不含 `</tr>`）
pub struct RowFragments<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> RowFragments<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for RowFragments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        // 找不到下一对行边界即表格结束
        let begin = find_from(self.text, ROW_BEGIN, self.pos)?;
        let end = find_from(self.text, ROW_END, begin)?;
        self.pos = end + ROW_END.len();
        self.text.get(begin..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_from() {
        assert_eq!(find_from("abcabc", "abc", 0), Some(0));
        assert_eq!(find_from("abcabc", "abc", 1), Some(3));
        assert_eq!(find_from("abcabc", "abc", 4), None);
        assert_eq!(find_from("abc", "a", 10), None);
    }

    #[test]
    fn test_quoted_after() {
        let row = r#"<tr id="e1" event_timestamp="2019-11-18 00:30:00" onclick="x">"#;
        assert_eq!(quoted_after(row, EVENT_TIMESTAMP), Some("2019-11-18 00:30:00"));
        assert_eq!(quoted_after(r#"<tr event_timestamp="2019-11-18"#, EVENT_TIMESTAMP), None);
        assert_eq!(quoted_after("<tr>", EVENT_TIMESTAMP), None);
    }

    #[test]
    fn test_cell_text_after() {
        let row = r#"<td class="act" id="eventActual_401">1.5%</td><td id="eventForecast_401">&nbsp;</td>"#;
        assert_eq!(cell_text_after(row, EVENT_ACTUAL), Some("1.5%"));
        assert_eq!(cell_text_after(row, EVENT_FORECAST), Some("&nbsp;"));
        assert_eq!(cell_text_after(row, EVENT_PREVIOUS), None);
        // 未闭合
        assert_eq!(cell_text_after(r#"<td id="eventActual_1">1.5"#, EVENT_ACTUAL), None);
    }

    #[test]
    fn test_content_after() {
        let row = r#"<td class="left textNum sentiment noWrap" title="High Volatility Expected" data-img_key="bull3">"#;
        assert_eq!(
            content_after(row, SENTIMENT_CELL, QUOTE),
            Some("High Volatility Expected")
        );
        let row = r#"<td class="left event">  GDP q/q </td>"#;
        assert_eq!(content_after(row, EVENT_NAME_CELL, "<"), Some("  GDP q/q "));
    }

    #[test]
    fn test_flag_cell() {
        let row = r#"<td class="left flagCur noWrap"><span title="Japan" class="ceFlags Japan">&nbsp;</span> JPY</td><td>x</td>"#;
        assert_eq!(
            flag_cell(row),
            Some(r#"<span title="Japan" class="ceFlags Japan">&nbsp;</span> JPY"#)
        );
        assert_eq!(flag_cell(r#"<td class="left flagCur noWrap"><span"#), None);
    }

    #[test]
    fn test_row_fragments() {
        let text = "<table><tr a>one</tr>\n<tr b>two</tr><tr c>unterminated";
        let rows: Vec<&str> = RowFragments::new(text).collect();
        assert_eq!(rows, vec!["<tr a>one", "<tr b>two"]);
        assert_eq!(RowFragments::new("no rows here").count(), 0);
    }
}
