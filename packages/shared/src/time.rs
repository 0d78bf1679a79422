//! Time-related utilities with clock abstraction for testability.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get the current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock from a Unix timestamp in milliseconds.
    ///
    /// Out-of-range values fall back to the Unix epoch.
    pub fn new(fixed_time_millis: i64) -> Self {
        let fixed_time = Utc
            .timestamp_millis_opt(fixed_time_millis)
            .single()
            .unwrap_or_default();
        Self { fixed_time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.fixed_time
    }
}

/// Format a UTC instant as ISO-8601 with millisecond precision and a `Z` suffix.
///
/// The output matches JavaScript's `Date.prototype.toISOString`, e.g.
/// `2023-01-01T00:00:00.000Z`.
pub fn to_iso8601(datetime: &DateTime<Utc>) -> String {
    datetime.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_returns_increasing_timestamps() {
        // テスト項目: SystemClock が呼び出すたびに増加する時刻を返す
        // given (前提条件):
        let clock = SystemClock;

        // when (操作):
        let first = clock.now();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let second = clock.now();

        // then (期待する結果):
        assert!(second >= first);
    }

    #[test]
    fn test_fixed_clock_returns_fixed_timestamp() {
        // テスト項目: FixedClock が固定された時刻を返す
        // given (前提条件):
        let clock = FixedClock::new(1_672_531_200_123);

        // when (操作):
        let first = clock.now();
        let second = clock.now();

        // then (期待する結果):
        assert_eq!(first.timestamp_millis(), 1_672_531_200_123);
        assert_eq!(first, second);
    }

    #[test]
    fn test_to_iso8601_format() {
        // テスト項目: UTC のミリ秒精度 ISO-8601 形式に変換される
        // given (前提条件):
        // 2023-01-01 00:00:00.123 UTC
        let clock = FixedClock::new(1_672_531_200_123);

        // when (操作):
        let result = to_iso8601(&clock.now());

        // then (期待する結果):
        assert_eq!(result, "2023-01-01T00:00:00.123Z");
    }

    #[test]
    fn test_to_iso8601_pads_milliseconds() {
        // テスト項目: ミリ秒が 0 でも 3 桁で出力される
        // given (前提条件):
        let clock = FixedClock::new(1_672_531_200_000);

        // when (操作):
        let result = to_iso8601(&clock.now());

        // then (期待する結果):
        assert_eq!(result, "2023-01-01T00:00:00.000Z");
    }
}
