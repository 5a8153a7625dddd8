use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc, Weekday};

pub const SECONDS_IN_MINUTE: i64 = 60;
pub const SECONDS_IN_HOUR: i64 = 60 * SECONDS_IN_MINUTE;
pub const SECONDS_IN_DAY: i64 = 24 * SECONDS_IN_HOUR;

/// 0001-01-01 00:00:00 UTC
pub const MIN_TIMESTAMP: i64 = -62135596800;
/// 9999-12-31 23:59:59 UTC
pub const MAX_TIMESTAMP: i64 = 253402300799;

/// 源站 event_timestamp 可能出现的格式
const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];

/// 当日 0 点（UTC）的秒级时间戳
pub fn start_of_day(ts: i64) -> i64 {
    ts.div_euclid(SECONDS_IN_DAY) * SECONDS_IN_DAY
}

/// 当日最后一秒
pub fn end_of_day(ts: i64) -> i64 {
    start_of_day(ts) + SECONDS_IN_DAY - 1
}

/// 周六、周日视为非交易日
pub fn is_day_off(ts: i64) -> bool {
    match DateTime::<Utc>::from_timestamp(ts, 0) {
        Some(dt) => matches!(dt.weekday(), Weekday::Sat | Weekday::Sun),
        None => false,
    }
}

/// 字符串转秒级时间戳（按 UTC 解释），无法解析返回 None
pub fn parse_timestamp(s: &str) -> Option<i64> {
    let s = s.trim();
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp());
        }
    }
    parse_date(s)
}

/// 解析 YYYY-MM-DD，返回当日 0 点
pub fn parse_date(s: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

/// (年, 月, 日)
pub fn date_parts(ts: i64) -> (i32, u32, u32) {
    match DateTime::<Utc>::from_timestamp(ts, 0) {
        Some(dt) => (dt.year(), dt.month(), dt.day()),
        None => (1970, 1, 1),
    }
}

pub fn format_date(ts: i64) -> String {
    match DateTime::<Utc>::from_timestamp(ts, 0) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => format!("invalid({})", ts),
    }
}

pub fn format_date_time(ts: i64) -> String {
    match DateTime::<Utc>::from_timestamp(ts, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format!("invalid({})", ts),
    }
}

pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// 限制在可表示的日历范围内
pub fn clamp_timestamp(ts: i64) -> i64 {
    ts.clamp(MIN_TIMESTAMP, MAX_TIMESTAMP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_of_day() {
        // 2019-11-18 00:30:00
        assert_eq!(start_of_day(1574037000), 1574035200);
        assert_eq!(start_of_day(1574035200), 1574035200);
        assert_eq!(end_of_day(1574035200), 1574035200 + SECONDS_IN_DAY - 1);
    }

    #[test]
    fn test_clamp_timestamp() {
        assert_eq!(clamp_timestamp(i64::MAX), MAX_TIMESTAMP);
        assert_eq!(clamp_timestamp(i64::MIN), MIN_TIMESTAMP);
        assert_eq!(clamp_timestamp(1574035200), 1574035200);
        assert_eq!(format_date_time(MAX_TIMESTAMP), "9999-12-31 23:59:59");
        assert_eq!(format_date(MIN_TIMESTAMP), "0001-01-01");
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("2019-11-18 00:30:00"), Some(1574037000));
        assert_eq!(parse_timestamp(" 2019/11/18 00:30:00 "), Some(1574037000));
        assert_eq!(parse_timestamp("2019-11-18"), Some(1574035200));
        assert_eq!(parse_timestamp("tomorrow"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_is_day_off() {
        // 2019-11-16 周六, 2019-11-17 周日, 2019-11-18 周一
        assert!(is_day_off(parse_date("2019-11-16").unwrap()));
        assert!(is_day_off(parse_date("2019-11-17").unwrap() + 3600));
        assert!(!is_day_off(parse_date("2019-11-18").unwrap()));
    }

    #[test]
    fn test_date_parts_and_format() {
        let ts = parse_timestamp("2020-02-10 13:45:00").unwrap();
        assert_eq!(date_parts(ts), (2020, 2, 10));
        assert_eq!(format_date(ts), "2020-02-10");
        assert_eq!(format_date_time(ts), "2020-02-10 13:45:00");
    }
}
