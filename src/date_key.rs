use chrono::{DateTime, NaiveDate, TimeZone};

pub const NOTES_KEY_PREFIX: &str = "notes-";

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn date_key_for<Tz: TimeZone>(moment: &DateTime<Tz>) -> String {
    date_key(moment.date_naive())
}

pub fn storage_key(date: NaiveDate) -> String {
    format!("{}{}", NOTES_KEY_PREFIX, date_key(date))
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("{}.json", storage_key(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn pads_month_and_day() {
        assert_eq!(date_key(day(2024, 3, 5)), "2024-03-05");
        assert_eq!(storage_key(day(2024, 3, 5)), "notes-2024-03-05");
        assert_eq!(export_file_name(day(2024, 3, 5)), "notes-2024-03-05.json");
    }

    #[test]
    fn distinct_days_never_collide() {
        let start = day(2023, 12, 1);
        let mut seen = std::collections::HashSet::new();
        for offset in 0..800 {
            let key = storage_key(start + Duration::days(offset));
            assert!(seen.insert(key), "collision at offset {}", offset);
        }
    }

    #[test]
    fn time_of_day_is_ignored() {
        let tz = FixedOffset::east_opt(9 * 3600).expect("offset");
        let morning = tz.with_ymd_and_hms(2024, 1, 31, 0, 5, 0).single().expect("time");
        let night = tz.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).single().expect("time");
        assert_eq!(date_key_for(&morning), "2024-01-31");
        assert_eq!(date_key_for(&morning), date_key_for(&night));
    }
}
