use chrono::{DateTime, Local, Utc};

/// Render a service timestamp in the viewer's local time.
pub fn format_local_timestamp(time: &DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

pub fn current_human_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn local_timestamp_matches_local_conversion() {
        let time = Utc.with_ymd_and_hms(2025, 5, 8, 4, 15, 30).unwrap();
        let expected = time.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string();
        assert_eq!(format_local_timestamp(&time), expected);
        assert_eq!(format_local_timestamp(&time).len(), 19);
    }
}
