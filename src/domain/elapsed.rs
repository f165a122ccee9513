use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

pub const MINUTE: i64 = 60;
pub const HOUR: i64 = 60 * MINUTE;
pub const DAY: i64 = 24 * HOUR;

/// Default display format for entry boundaries, e.g. "03/01 02:05PM"
pub const DEFAULT_TIME_FORMAT: &str = "%m/%d %I:%M%p";

fn minutes(seconds: i64) -> i64 {
    seconds / MINUTE
}

fn hours(seconds: i64) -> i64 {
    seconds / HOUR
}

fn days(seconds: i64) -> i64 {
    seconds / DAY
}

/// Returns true when a task with `a` elapsed seconds should rank above one with `b`.
///
/// Crossing into a larger unit always wins. Inside a unit the comparison only looks at
/// the precision shown on screen (seconds and minutes below an hour, minutes below a
/// day, hours beyond), so two tasks that display the same value never swap places.
pub fn compare_elapsed(a: i64, b: i64) -> bool {
    for threshold in [MINUTE, HOUR, DAY] {
        if b < threshold && a >= threshold {
            return true;
        }
    }

    if a < HOUR {
        return a > b;
    }

    if a < DAY {
        let x = hours(a) * HOUR + minutes(a - hours(a) * HOUR);
        let y = hours(b) * HOUR + minutes(b - hours(b) * HOUR);
        return x > y;
    }

    let x = days(a) * DAY + hours(a - days(a) * DAY);
    let y = days(b) * DAY + hours(b - days(b) * DAY);
    x > y
}

/// Format elapsed seconds with the two most significant units ("45s", "3m7s", "2h5m", "1d3h")
pub fn format_elapsed(seconds: i64) -> String {
    let seconds = seconds.max(0);

    if seconds < MINUTE {
        return format!("{}s", seconds);
    }

    if seconds < HOUR {
        return format!("{}m{}s", minutes(seconds), seconds - minutes(seconds) * MINUTE);
    }

    if seconds < DAY {
        return format!("{}h{}m", hours(seconds), minutes(seconds - hours(seconds) * HOUR));
    }

    format!("{}d{}h", days(seconds), hours(seconds - days(seconds) * DAY))
}

/// Format an entry boundary, "-" while the entry is still running
pub fn format_time(time: Option<DateTime<Local>>, format: &str) -> String {
    match time {
        Some(time) => time.format(format).to_string(),
        None => "-".to_string(),
    }
}

/// Parse a duration typed by the user: any sequence of `<n>d`, `<n>h`, `<n>m`, `<n>s`.
/// A bare number is read as minutes.
pub fn parse_duration_input(input: &str) -> Option<Duration> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    if let Ok(minutes) = input.parse::<i64>() {
        return if minutes > 0 { Duration::try_minutes(minutes) } else { None };
    }

    let mut total = 0i64;
    let mut digits = String::new();
    for c in input.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' => continue,
            'd' | 'h' | 'm' | 's' => {
                let value: i64 = digits.parse().ok()?;
                digits.clear();
                let unit = match c {
                    'd' => DAY,
                    'h' => HOUR,
                    'm' => MINUTE,
                    _ => 1,
                };
                total = total.checked_add(value.checked_mul(unit)?)?;
            }
            _ => return None,
        }
    }

    if !digits.is_empty() || total <= 0 {
        return None;
    }
    Duration::try_seconds(total)
}

/// Parse a start time typed by the user: "HH:MM" (today) or "YYYY-MM-DD HH:MM"
pub fn parse_start_input(input: &str, today: NaiveDate) -> Option<DateTime<Local>> {
    let input = input.trim();

    let naive = if let Ok(time) = NaiveTime::parse_from_str(input, "%H:%M") {
        today.and_time(time)
    } else {
        NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M").ok()?
    };

    Local.from_local_datetime(&naive).earliest()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_elapsed_seconds() {
        assert!(compare_elapsed(59, 58));
        assert!(!compare_elapsed(58, 59));
        assert!(!compare_elapsed(30, 30));
    }

    #[test]
    fn test_compare_elapsed_crossing_units() {
        assert!(compare_elapsed(60, 59));
        assert!(compare_elapsed(HOUR, HOUR - 1));
        assert!(compare_elapsed(DAY, DAY - 1));
        assert!(!compare_elapsed(HOUR - 1, HOUR));
    }

    #[test]
    fn test_compare_elapsed_minutes_use_raw_seconds() {
        assert!(compare_elapsed(75, 70));
        assert!(!compare_elapsed(70, 75));
    }

    #[test]
    fn test_compare_elapsed_hours_ignore_seconds() {
        // 1h1m0s and 1h1m30s display the same, so neither outranks the other
        assert!(!compare_elapsed(HOUR + 90, HOUR + 60));
        assert!(!compare_elapsed(HOUR + 60, HOUR + 90));
        assert!(compare_elapsed(HOUR + 2 * MINUTE, HOUR + 90));
    }

    #[test]
    fn test_compare_elapsed_days_ignore_minutes() {
        assert!(!compare_elapsed(DAY + 30 * MINUTE, DAY + 10 * MINUTE));
        assert!(compare_elapsed(DAY + 2 * HOUR, DAY + HOUR + 59 * MINUTE));
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "0s");
        assert_eq!(format_elapsed(45), "45s");
        assert_eq!(format_elapsed(187), "3m7s");
        assert_eq!(format_elapsed(2 * HOUR + 5 * MINUTE + 12), "2h5m");
        assert_eq!(format_elapsed(DAY + 3 * HOUR + 59 * MINUTE), "1d3h");
        assert_eq!(format_elapsed(-5), "0s");
    }

    #[test]
    fn test_format_time_open_end() {
        assert_eq!(format_time(None, DEFAULT_TIME_FORMAT), "-");
    }

    #[test]
    fn test_parse_duration_input() {
        assert_eq!(parse_duration_input("45m"), Some(Duration::minutes(45)));
        assert_eq!(parse_duration_input("1h30m"), Some(Duration::minutes(90)));
        assert_eq!(parse_duration_input("1h 30m"), Some(Duration::minutes(90)));
        assert_eq!(parse_duration_input("90s"), Some(Duration::seconds(90)));
        assert_eq!(parse_duration_input("2d"), Some(Duration::days(2)));
        assert_eq!(parse_duration_input("25"), Some(Duration::minutes(25)));
    }

    #[test]
    fn test_parse_duration_input_rejects_garbage() {
        assert_eq!(parse_duration_input(""), None);
        assert_eq!(parse_duration_input("0m"), None);
        assert_eq!(parse_duration_input("1h30"), None);
        assert_eq!(parse_duration_input("soon"), None);
        assert_eq!(parse_duration_input("-5"), None);
    }

    #[test]
    fn test_parse_duration_input_rejects_overflow() {
        assert_eq!(parse_duration_input("99999999999999999d"), None);
        assert_eq!(parse_duration_input("9223372036854775807s 1s"), None);
        assert_eq!(parse_duration_input("999999999999999"), None);
        assert_eq!(parse_duration_input("9999999999999999999"), None);
    }

    #[test]
    fn test_parse_start_input() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let start = parse_start_input("14:05", today).unwrap();
        assert_eq!(start.naive_local(), today.and_hms_opt(14, 5, 0).unwrap());

        let start = parse_start_input("2024-02-28 09:30", today).unwrap();
        assert_eq!(
            start.naive_local(),
            NaiveDate::from_ymd_opt(2024, 2, 28).unwrap().and_hms_opt(9, 30, 0).unwrap()
        );

        assert!(parse_start_input("yesterday", today).is_none());
    }
}
