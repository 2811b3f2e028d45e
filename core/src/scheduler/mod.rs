//! Daily auto check-in scheduling

pub mod daemon;

pub use daemon::SchedulerDaemon;

use crate::error::{PunchError, Result};
use chrono::{DateTime, Days, Local, NaiveTime, TimeZone};

/// Parse a daily schedule time in HH:MM form.
pub fn parse_auto_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| PunchError::InvalidAutoTime {
        value: value.to_string(),
    })
}

/// Next local firing of a daily HH:MM schedule strictly after `now`.
///
/// The candidate on `now`'s own date is used when it is still ahead;
/// otherwise the schedule rolls to the following day. A DST gap that
/// swallows the wall-clock time skips to the next representable day.
pub fn next_run_after(now: DateTime<Local>, auto_time: &str) -> Result<DateTime<Local>> {
    let time = parse_auto_time(auto_time)?;
    let date = now.date_naive();
    for day in 0..=2u64 {
        let Some(candidate_date) = date.checked_add_days(Days::new(day)) else {
            continue;
        };
        let naive = candidate_date.and_time(time);
        if let Some(candidate) = Local.from_local_datetime(&naive).earliest() {
            if candidate > now {
                return Ok(candidate);
            }
        }
    }
    Err(PunchError::InvalidAutoTime {
        value: auto_time.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_well_formed_times() {
        assert_eq!(parse_auto_time("08:00").unwrap().hour(), 8);
        assert_eq!(parse_auto_time("23:59").unwrap().minute(), 59);
        assert_eq!(parse_auto_time(" 7:30 ").unwrap().hour(), 7);
    }

    #[test]
    fn rejects_malformed_times() {
        assert!(parse_auto_time("25:99").is_err());
        assert!(parse_auto_time("8am").is_err());
        assert!(parse_auto_time("").is_err());
        assert!(parse_auto_time("08:00:00").is_err());
    }

    #[test]
    fn before_the_scheduled_time_fires_same_day() {
        let now = Local.with_ymd_and_hms(2024, 5, 10, 7, 0, 0).unwrap();
        let next = next_run_after(now, "08:00").unwrap();
        assert_eq!(next, Local.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap());
    }

    #[test]
    fn after_the_scheduled_time_fires_next_day() {
        let now = Local.with_ymd_and_hms(2024, 5, 10, 9, 30, 0).unwrap();
        let next = next_run_after(now, "08:00").unwrap();
        assert_eq!(next, Local.with_ymd_and_hms(2024, 5, 11, 8, 0, 0).unwrap());
    }

    #[test]
    fn exactly_at_the_scheduled_time_fires_next_day() {
        let now = Local.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap();
        let next = next_run_after(now, "08:00").unwrap();
        assert_eq!(next, Local.with_ymd_and_hms(2024, 5, 11, 8, 0, 0).unwrap());
    }

    #[test]
    fn malformed_time_propagates() {
        let now = Local::now();
        assert!(matches!(
            next_run_after(now, "not-a-time"),
            Err(PunchError::InvalidAutoTime { .. })
        ));
    }
}
