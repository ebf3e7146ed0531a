//! Timestamped progress lines on stdout.

use chrono::{DateTime, Local};

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

pub fn format_line(at: DateTime<Local>, message: &str) -> String {
    format!("{} - {}", at.format(TIMESTAMP_FORMAT), message)
}

/// Print `message` prefixed with the current local time.
pub fn announce(message: &str) {
    println!("{}", format_line(Local::now(), message));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_line() {
        let at = Local.with_ymd_and_hms(2023, 7, 9, 14, 5, 0).unwrap();
        assert_eq!(
            format_line(at, "Generating Report"),
            "2023/07/09 14:05:00 - Generating Report"
        );
    }
}
