use crate::constants::dates::{FORMAT, LAST_MONTH_DAYS, LAST_WEEK_DAYS};
use chrono::{Duration, Local, NaiveDate};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(FORMAT).to_string()
}

pub fn days_ago(today: NaiveDate, days: i64) -> String {
    format_date(today - Duration::days(days))
}

/// Resolves the small relative vocabulary (`today`, `yesterday`,
/// `last week...`, `last month...`) against `today`. Anything else is
/// returned exactly as given; the upstream validates absolute dates.
pub fn normalize_date(raw: Option<&str>, today: NaiveDate) -> String {
    let Some(raw) = raw else {
        return format_date(today);
    };
    let lowered = raw.trim().to_lowercase();
    if lowered.is_empty() || lowered == "today" {
        return format_date(today);
    }
    if lowered == "yesterday" {
        return days_ago(today, 1);
    }
    if lowered.starts_with("last week") {
        return days_ago(today, LAST_WEEK_DAYS);
    }
    if lowered.starts_with("last month") {
        return days_ago(today, LAST_MONTH_DAYS);
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).expect("valid date")
    }

    #[test]
    fn relative_vocabulary_resolves_against_today() {
        let day = fixed_day();
        assert_eq!(normalize_date(Some("today"), day), "2024-03-10");
        assert_eq!(normalize_date(Some("yesterday"), day), "2024-03-09");
        assert_eq!(normalize_date(Some("last week"), day), "2024-03-03");
        assert_eq!(normalize_date(Some("last month"), day), "2024-02-09");
    }

    #[test]
    fn matching_ignores_case_and_padding() {
        let day = fixed_day();
        assert_eq!(normalize_date(Some("  Yesterday "), day), "2024-03-09");
        assert_eq!(normalize_date(Some("LAST WEEK please"), day), "2024-03-03");
    }

    #[test]
    fn missing_or_blank_means_today() {
        let day = fixed_day();
        assert_eq!(normalize_date(None, day), "2024-03-10");
        assert_eq!(normalize_date(Some("   "), day), "2024-03-10");
    }

    #[test]
    fn other_strings_pass_through_unchanged() {
        let day = fixed_day();
        assert_eq!(normalize_date(Some("2023-12-01"), day), "2023-12-01");
        assert_eq!(normalize_date(Some("next tuesday"), day), "next tuesday");
        assert_eq!(
            normalize_date(Some("2024-01-01T00:00:00Z"), day),
            "2024-01-01T00:00:00Z"
        );
    }

    #[test]
    fn real_clock_matches_helpers() {
        let now = today();
        assert_eq!(normalize_date(Some("today"), now), format_date(now));
        assert_eq!(normalize_date(Some("last month"), now), days_ago(now, 30));
    }
}
