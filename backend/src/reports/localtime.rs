//! KSA local time. The region has no daylight saving, so a fixed UTC+3
//! offset is exact.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDateTime, NaiveTime, Utc};

pub const KSA_OFFSET_SECS: i32 = 3 * 3600;

pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn ksa() -> FixedOffset {
    FixedOffset::east_opt(KSA_OFFSET_SECS).expect("UTC+3 is a valid offset")
}

pub fn to_local(utc: Option<DateTime<Utc>>) -> Option<DateTime<FixedOffset>> {
    utc.map(|t| t.with_timezone(&ksa()))
}

/// `yyyy-MM-dd HH:mm:ss` in local time.
pub fn format_local(utc: Option<DateTime<Utc>>) -> Option<String> {
    to_local(utc).map(|t| t.format(DISPLAY_FORMAT).to_string())
}

/// Local midnight `days_back` days before the local date of `now`, as UTC.
pub fn local_midnight(now: DateTime<Utc>, days_back: i64) -> DateTime<Utc> {
    let date = now.with_timezone(&ksa()).date_naive() - Duration::days(days_back);
    local_to_utc(date.and_time(NaiveTime::MIN))
}

/// Local midnight on the 1st of the current local month, as UTC.
pub fn local_month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let local = now.with_timezone(&ksa()).date_naive();
    let first = local.with_day(1).unwrap_or(local);
    local_to_utc(first.and_time(NaiveTime::MIN))
}

fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    (naive - Duration::seconds(i64::from(KSA_OFFSET_SECS))).and_utc()
}
