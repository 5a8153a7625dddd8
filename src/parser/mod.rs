//! 日历响应解析
//!
//! `markup` 负责标记定位，`extractor` 处理单行，`response` 处理整次响应

pub mod extractor;
pub mod markup;
pub mod response;

pub use extractor::{extract, Extraction, FoundFields};
pub use response::{parse_response, parse_rows, ParseSummary};
