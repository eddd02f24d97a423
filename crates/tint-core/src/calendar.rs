//! Local-calendar arithmetic shared by the read views, the retention policy
//! and the date sorter.
//!
//! Day boundaries are local midnights, not 24-hour offsets, so a "day" across
//! a DST change is 23 or 25 hours long.

use chrono::{DateTime, Days, Local, Months, NaiveDate, NaiveTime, TimeZone};

/// Local midnight at the start of `date`.
///
/// Where midnight does not exist (a DST gap at 00:00) the same wall-clock
/// instant interpreted as UTC is used instead.
pub fn midnight(date: NaiveDate) -> DateTime<Local> {
  let naive = date.and_time(NaiveTime::MIN);
  Local
    .from_local_datetime(&naive)
    .earliest()
    .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}

/// Local midnight at the start of the day containing `now`.
pub fn start_of_day(now: DateTime<Local>) -> DateTime<Local> {
  midnight(now.date_naive())
}

/// Local midnight `days` calendar days before the day containing `now`.
pub fn days_before(now: DateTime<Local>, days: u32) -> DateTime<Local> {
  let date = now
    .date_naive()
    .checked_sub_days(Days::new(u64::from(days)))
    .unwrap_or(NaiveDate::MIN);
  midnight(date)
}

/// Local midnight `months` calendar months before the day containing `now`.
/// The day of month is clamped (March 31st minus one month is February 28th
/// or 29th).
pub fn months_before(now: DateTime<Local>, months: u32) -> DateTime<Local> {
  let date = now
    .date_naive()
    .checked_sub_months(Months::new(months))
    .unwrap_or(NaiveDate::MIN);
  midnight(date)
}
