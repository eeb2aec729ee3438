use chrono::{DateTime, FixedOffset, Locale};

/// 列表和文章页展示的日期格式，如 `15 mar 2021`
const DISPLAY_FORMAT: &str = "%d %b %Y";

/// 解析 CMS 返回的时间
///
/// 兼容 RFC 3339（`2021-03-15T00:00:00Z`）和不带冒号的时区偏移（`2021-03-15T19:25:28+0000`）。
pub fn parse_cms_datetime(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
}

/// 将发布时间格式化为巴西葡萄牙语的展示字符串
///
/// 使用 CMS 给出的时区偏移，不转换为本地时间。
/// 缺失或无法解析时返回 `None`。
pub fn format_publication_date(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    match parse_cms_datetime(raw) {
        Some(date) => Some(date.format_localized(DISPLAY_FORMAT, Locale::pt_BR).to_string()),
        None => {
            tracing::warn!(raw, "unparsable publication date");
            None
        }
    }
}
