//! 时间类型模块
//!
//! `Timestamp`: 可序列化的毫秒时间戳，用于活动记录 ID 和存储；
//! 通过 chrono 转换为可读的展示格式。

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// 活动记录等场景使用的展示格式，例如 `Oct 19, 2026 14:05`
pub const DISPLAY_FORMAT: &str = "%b %d, %Y %H:%M";

/// 毫秒时间戳
///
/// 内部存储为 `i64`，表示自 Unix 纪元以来的毫秒数
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    #[inline]
    pub const fn new(ms: i64) -> Self {
        Self(ms)
    }

    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn as_secs(&self) -> i64 {
        self.0 / 1000
    }

    /// 下一个毫秒，用于在同一毫秒内生成多个递增 ID
    #[inline]
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.0).single()
    }

    /// 格式化为可读时间 (本地时区)
    pub fn display(&self) -> String {
        self.display_in(&Local)
    }

    /// 按指定时区格式化
    pub fn display_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        self.to_datetime()
            .map(|dt| dt.with_timezone(tz).format(DISPLAY_FORMAT).to_string())
            .unwrap_or_default()
    }
}

impl From<i64> for Timestamp {
    fn from(ms: i64) -> Self {
        Self(ms)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn display_uses_readable_format() {
        let dt = Utc.with_ymd_and_hms(2026, 10, 19, 14, 5, 0).unwrap();
        let ts = Timestamp::from(dt);
        assert_eq!(ts.display_in(&Utc), "Oct 19, 2026 14:05");
        assert_eq!(ts.to_datetime(), Some(dt));
    }

    #[test]
    fn display_follows_the_target_time_zone() {
        let dt = Utc.with_ymd_and_hms(2026, 10, 19, 23, 30, 0).unwrap();
        let ts = Timestamp::from(dt);

        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(ts.display_in(&tokyo), "Oct 20, 2026 08:30");

        let local = dt.with_timezone(&Local).format(DISPLAY_FORMAT).to_string();
        assert_eq!(ts.display(), local);
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&Timestamp::new(1_700_000_000_123)).unwrap();
        assert_eq!(json, "1700000000123");
    }
}
