//! Streak calculation: consecutive gamble-free days ending at or near today.
//!
//! Days are compared by calendar date in the user's local time zone, never by
//! elapsed time, so a check-in at 23:30 and one at 00:15 the next morning are
//! one day apart regardless of daylight-saving shifts.

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::check_in::CheckIn;

/// Count consecutive gamble-free days counting back from `now`.
///
/// The most recent check-in may be from today or yesterday; anything older
/// means the streak has lapsed. After that anchor every counted day must be
/// exactly one calendar day before the previous one. A gap or a slip ends the
/// walk. When a day has several check-ins only the latest one is considered.
///
/// Check-ins dated after today (in `now`'s time zone) are ignored.
pub fn current_streak<Tz: TimeZone>(
  check_ins: &[CheckIn],
  now: &DateTime<Tz>,
) -> u32 {
  let tz = now.timezone();
  let today = now.date_naive();
  let Some(yesterday) = today.pred_opt() else {
    return 0;
  };

  let mut days: Vec<(NaiveDate, &CheckIn)> = check_ins
    .iter()
    .map(|c| (c.date.with_timezone(&tz).date_naive(), c))
    .collect();
  // Newest first. Stable on equal timestamps so input order breaks ties.
  days.sort_by(|a, b| b.1.date.cmp(&a.1.date));

  let Some(anchor) = days
    .iter()
    .position(|(day, _)| *day == today || *day == yesterday)
  else {
    return 0;
  };

  let (anchor_day, anchor_check_in) = days[anchor];
  if anchor_check_in.gambled {
    return 0;
  }

  let mut streak = 1;
  let mut last_counted = anchor_day;

  for (day, check_in) in &days[anchor + 1..] {
    match (last_counted - *day).num_days() {
      0 => continue,
      1 if !check_in.gambled => {
        streak += 1;
        last_counted = *day;
      }
      _ => break,
    }
  }

  streak
}
