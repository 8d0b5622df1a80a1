//! Clock port
//!
//! "Today" depends on the deployment time zone, so services ask a `Clock`
//! instead of reading the system time directly.

use std::sync::Mutex;

use calnotify_domain::{CalNotifyError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Source of the current instant and calendar day
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar day in the deployment time zone
    fn today(&self) -> NaiveDate;
}

/// System clock projected into an IANA time zone.
#[derive(Debug, Clone, Copy)]
pub struct ZonedClock {
    tz: Tz,
}

impl ZonedClock {
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// # Errors
    /// Returns `CalNotifyError::Config` for an unknown zone name.
    pub fn from_name(name: &str) -> Result<Self> {
        let tz: Tz = name
            .trim()
            .parse()
            .map_err(|_| CalNotifyError::Config(format!("unknown time zone '{name}'")))?;
        Ok(Self::new(tz))
    }

    pub const fn timezone(&self) -> Tz {
        self.tz
    }
}

impl Clock for ZonedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }
}

/// Clock pinned to a settable day. Used by tests and the synthetic test
/// notification path.
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    pub const fn new(today: NaiveDate) -> Self {
        Self { today: Mutex::new(today) }
    }

    pub fn set_today(&self, today: NaiveDate) {
        if let Ok(mut guard) = self.today.lock() {
            *guard = today;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        self.today.lock().map(|guard| *guard).unwrap_or_else(|poisoned| *poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_zoned_clock_parses_iana_names() {
        let clock = ZonedClock::from_name("America/Argentina/Buenos_Aires").unwrap();
        assert_eq!(clock.timezone(), chrono_tz::America::Argentina::Buenos_Aires);
        assert!(ZonedClock::from_name("Mars/Olympus").is_err());
    }

    #[test]
    fn test_zone_decides_calendar_day() {
        // 02:00 UTC is still the previous day in Buenos Aires (UTC-3).
        let instant = Utc.with_ymd_and_hms(2024, 3, 15, 2, 0, 0).unwrap();
        let local = instant.with_timezone(&chrono_tz::America::Argentina::Buenos_Aires);
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
    }

    #[test]
    fn test_fixed_clock_can_advance() {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        clock.set_today(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }
}
