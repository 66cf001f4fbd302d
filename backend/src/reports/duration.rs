use chrono::{DateTime, Utc};

/// Status codes treated as resolved when no explicit resolve-by time exists.
pub const RESOLVED_STATUS_CODES: [i32; 5] = [5, 6, 2000, 100000003, 100000007];

/// Explicit resolve-by time, else the last modification of a resolved case.
pub fn resolution_time(
    resolve_by: Option<DateTime<Utc>>,
    status_code: Option<i32>,
    modified_on: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    if resolve_by.is_some() {
        return resolve_by;
    }
    match status_code {
        Some(code) if RESOLVED_STATUS_CODES.contains(&code) => modified_on,
        _ => None,
    }
}

/// `HH:MM:SS` between the two instants. Hours accumulate past 24; a
/// resolution before creation is rendered with a leading `-`.
pub fn ticket_duration(
    created_on: Option<DateTime<Utc>>,
    resolved_on: Option<DateTime<Utc>>,
) -> Option<String> {
    let elapsed = resolved_on? - created_on?;
    let total = elapsed.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    Some(format!(
        "{}{:02}:{:02}:{:02}",
        sign,
        total / 3600,
        (total % 3600) / 60,
        total % 60
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_resolve_by_wins() {
        let resolve_by = Some(at(10, 0, 0));
        assert_eq!(resolution_time(resolve_by, Some(1), Some(at(12, 0, 0))), resolve_by);
    }

    #[test]
    fn test_resolved_status_falls_back_to_modified() {
        for code in RESOLVED_STATUS_CODES {
            assert_eq!(resolution_time(None, Some(code), Some(at(12, 0, 0))), Some(at(12, 0, 0)));
        }
        assert_eq!(resolution_time(None, Some(100000008), Some(at(12, 0, 0))), None);
        assert_eq!(resolution_time(None, Some(5), None), None);
        assert_eq!(resolution_time(None, None, Some(at(12, 0, 0))), None);
    }

    #[test]
    fn test_duration_format() {
        assert_eq!(
            ticket_duration(Some(at(0, 0, 0)), Some(at(5, 30, 15))).as_deref(),
            Some("05:30:15")
        );
        let three_days = Utc.with_ymd_and_hms(2024, 1, 4, 1, 2, 3).unwrap();
        assert_eq!(
            ticket_duration(Some(at(0, 0, 0)), Some(three_days)).as_deref(),
            Some("73:02:03")
        );
    }

    #[test]
    fn test_duration_missing_endpoint() {
        assert_eq!(ticket_duration(None, Some(at(1, 0, 0))), None);
        assert_eq!(ticket_duration(Some(at(1, 0, 0)), None), None);
    }

    #[test]
    fn test_negative_duration() {
        assert_eq!(
            ticket_duration(Some(at(2, 0, 0)), Some(at(1, 30, 0))).as_deref(),
            Some("-00:30:00")
        );
    }
}
