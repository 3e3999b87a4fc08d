use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterState {
    until: DateTime<Utc>,
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState {
            until: default_until(),
        }
    }
}

impl FilterState {
    pub fn new(until: Option<NaiveDate>) -> Self {
        let mut state = FilterState::default();
        state.set_until(until);
        state
    }

    pub fn until(&self) -> DateTime<Utc> {
        self.until
    }

    pub fn until_date(&self) -> NaiveDate {
        self.until.date_naive()
    }

    /// Moves the filter to the end of `date`, or back to the end of today.
    /// Returns whether the value changed.
    pub fn set_until(&mut self, date: Option<NaiveDate>) -> bool {
        let next = match date {
            Some(date) => end_of_day(date),
            None => default_until(),
        };
        let changed = next != self.until;
        self.until = next;
        changed
    }

    pub fn reset(&mut self) -> bool {
        self.set_until(None)
    }
}

/// Last millisecond of `date` in UTC. Never steps into the next day, so it
/// holds for `NaiveDate::MAX` too.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
        .and_utc()
}

pub fn default_until() -> DateTime<Utc> {
    end_of_day(Utc::now().date_naive())
}

pub fn max_selectable() -> DateTime<Utc> {
    default_until()
}

/// Accepts a bare `YYYY-MM-DD` date or an RFC 3339 instant; instants are
/// truncated to their own calendar date.
pub fn parse_until(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Ok(date),
        Err(_) => DateTime::parse_from_rfc3339(value).map(|instant| instant.date_naive()),
    }
}

pub fn format_wire_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn default_is_end_of_today() {
        let state = FilterState::default();
        assert_eq!(state.until_date(), Utc::now().date_naive());
        assert_eq!(state.until().hour(), 23);
        assert_eq!(state.until().minute(), 59);
        assert_eq!(state.until().second(), 59);
    }

    #[test]
    fn explicit_date_is_normalized_to_end_of_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut state = FilterState::default();

        assert!(state.set_until(Some(date)));
        assert_eq!(state.until_date(), date);
        assert_eq!(state.until(), end_of_day(date));
        assert!(!state.set_until(Some(date)));
    }

    #[test]
    fn reset_returns_to_today() {
        let mut state = FilterState::new(NaiveDate::from_ymd_opt(2023, 1, 1));
        assert!(state.reset());
        assert_eq!(state.until_date(), Utc::now().date_naive());
    }

    #[test]
    fn end_of_day_holds_at_the_calendar_bounds() {
        let last = end_of_day(NaiveDate::MAX);
        assert_eq!(last.date_naive(), NaiveDate::MAX);
        assert_eq!(last.timestamp_subsec_millis(), 999);

        let state = FilterState::new(Some(NaiveDate::MAX));
        assert_eq!(state.until_date(), NaiveDate::MAX);
        assert_eq!(FilterState::new(Some(NaiveDate::MIN)).until_date(), NaiveDate::MIN);
    }

    #[test]
    fn parses_dates_and_instants() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        assert_eq!(parse_until("2024-05-02").unwrap(), expected);
        assert_eq!(parse_until("2024-05-02T23:59:59+02:00").unwrap(), expected);
        assert!(parse_until("02/05/2024").is_err());
    }

    #[test]
    fn wire_date_is_truncated() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        assert_eq!(format_wire_date(end_of_day(date).date_naive()), "2024-05-02");
    }
}
