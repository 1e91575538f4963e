// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::stats::DayRecord;
use crate::types::date::Date;

/// Consecutive days on which a deck's quota was met.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub current_streak: u32,
    /// The last date folded into the streak.
    pub last_date: Option<Date>,
}

impl StreakState {
    /// Fold one day's result into the streak. Days must arrive in strictly
    /// increasing order; a date at or before the last one is rejected.
    ///
    /// A day with a zero quota (a rest day, or a plan not yet started)
    /// leaves the count alone.
    pub fn update(self, date: Date, quota: u32, done: u32) -> Fallible<Self> {
        if let Some(last) = self.last_date {
            if date <= last {
                return fail(format!(
                    "streak already includes {last}, cannot add {date}"
                ));
            }
        }
        let current_streak = if quota == 0 {
            self.current_streak
        } else if done >= quota {
            self.current_streak + 1
        } else {
            0
        };
        Ok(Self {
            current_streak,
            last_date: Some(date),
        })
    }
}

/// The streak as of `today`, replayed from the daily log.
///
/// Days before today count in full. A date missing from the log breaks the
/// streak, since nothing says whether it was a rest day. Today only adds to
/// the streak once its quota is met; an unfinished today does not break it.
pub fn current_streak(entries: &[DayRecord], today: Date) -> u32 {
    let mut sorted: Vec<&DayRecord> = entries.iter().filter(|e| e.date <= today).collect();
    sorted.sort_by_key(|e| e.date);
    sorted.dedup_by_key(|e| e.date);

    let mut state = StreakState::default();
    for entry in sorted {
        if let Some(last) = state.last_date {
            if last.succ() != entry.date {
                state.current_streak = 0;
            }
        }
        if entry.date == today {
            if entry.quota > 0 && entry.done >= entry.quota {
                state.current_streak += 1;
            }
            state.last_date = Some(today);
            break;
        }
        // Dates are sorted and deduplicated, so this cannot fail.
        state = state
            .update(entry.date, entry.quota, entry.done)
            .unwrap_or(state);
    }
    // The log stopped before yesterday.
    match state.last_date {
        Some(last) if last < today.pred() => 0,
        _ => state.current_streak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::phase::Phase;

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn day(d: &str, quota: u32, done: u32) -> DayRecord {
        DayRecord {
            date: date(d),
            quota,
            done,
            phase: Some(Phase::New),
        }
    }

    #[test]
    fn test_rest_day_does_not_break() -> Fallible<()> {
        let s = StreakState::default();
        let s = s.update(date("2026-01-01"), 5, 5)?;
        assert_eq!(s.current_streak, 1);
        let s = s.update(date("2026-01-02"), 0, 0)?;
        assert_eq!(s.current_streak, 1);
        let s = s.update(date("2026-01-03"), 5, 5)?;
        assert_eq!(s.current_streak, 2);
        Ok(())
    }

    #[test]
    fn test_miss_resets() -> Fallible<()> {
        let s = StreakState::default()
            .update(date("2026-01-01"), 5, 7)?
            .update(date("2026-01-02"), 5, 4)?;
        assert_eq!(s.current_streak, 0);
        let s = s.update(date("2026-01-03"), 5, 5)?;
        assert_eq!(s.current_streak, 1);
        Ok(())
    }

    #[test]
    fn test_out_of_order_rejected() -> Fallible<()> {
        let s = StreakState::default().update(date("2026-01-05"), 5, 5)?;
        assert!(s.update(date("2026-01-05"), 5, 5).is_err());
        assert!(s.update(date("2026-01-04"), 5, 5).is_err());
        assert_eq!(s.current_streak, 1);
        Ok(())
    }

    #[test]
    fn test_replay_from_log() {
        let entries = vec![
            day("2026-01-03", 5, 5),
            day("2026-01-01", 5, 5),
            day("2026-01-02", 0, 0),
            day("2026-01-04", 5, 6),
        ];
        assert_eq!(current_streak(&entries, date("2026-01-05")), 3);
    }

    #[test]
    fn test_today_counts_once_met() {
        let mut entries = vec![day("2026-01-01", 5, 5), day("2026-01-02", 5, 2)];
        assert_eq!(current_streak(&entries, date("2026-01-02")), 1);
        entries[1].done = 5;
        assert_eq!(current_streak(&entries, date("2026-01-02")), 2);
    }

    #[test]
    fn test_missing_day_breaks() {
        let entries = vec![
            day("2026-01-01", 5, 5),
            day("2026-01-03", 5, 5),
            day("2026-01-04", 5, 5),
        ];
        assert_eq!(current_streak(&entries, date("2026-01-05")), 2);
    }

    #[test]
    fn test_stale_log_is_zero() {
        let entries = vec![day("2026-01-01", 5, 5), day("2026-01-02", 5, 5)];
        assert_eq!(current_streak(&entries, date("2026-01-10")), 0);
    }

    #[test]
    fn test_empty_log() {
        assert_eq!(current_streak(&[], date("2026-01-10")), 0);
    }
}
