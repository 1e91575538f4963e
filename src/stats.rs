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

use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::Serialize;

use crate::plan::phase::Phase;
use crate::types::date::Date;

/// Default length of the trailing window, in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// One day's target and result for a deck, as kept in the daily log.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    pub date: Date,
    pub quota: u32,
    pub done: u32,
    /// Absent for days with no log entry, and for sums across decks.
    pub phase: Option<Phase>,
}

/// A trailing run of days, oldest first, with totals.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    pub days: Vec<DayRecord>,
    pub total_quota: u32,
    pub total_done: u32,
}

impl Window {
    fn from_days(days: Vec<DayRecord>) -> Self {
        let total_quota = days.iter().map(|d| d.quota).sum();
        let total_done = days.iter().map(|d| d.done).sum();
        Self {
            days,
            total_quota,
            total_done,
        }
    }

    /// Days on which a positive quota was met.
    pub fn days_met(&self) -> usize {
        self.days
            .iter()
            .filter(|d| d.quota > 0 && d.done >= d.quota)
            .count()
    }

    /// Work done as a share of the quota over the window, capped at 100.
    pub fn completion_percent(&self) -> u32 {
        if self.total_quota == 0 {
            return 0;
        }
        let percent = u64::from(self.total_done) * 100 / u64::from(self.total_quota);
        percent.min(100) as u32
    }
}

/// The last `n` dates ending at `today`, with gaps filled by zero days.
pub fn window(entries: &[DayRecord], today: Date, n: u32) -> Window {
    let lookup: HashMap<Date, &DayRecord> = entries.iter().map(|e| (e.date, e)).collect();
    let days = (0..i64::from(n))
        .rev()
        .map(|back| {
            let date = today.add_days(-back);
            match lookup.get(&date) {
                Some(entry) => **entry,
                None => DayRecord {
                    date,
                    quota: 0,
                    done: 0,
                    phase: None,
                },
            }
        })
        .collect();
    Window::from_days(days)
}

/// Sum several decks' windows date by date.
pub fn combine(windows: &[Window]) -> Window {
    let mut by_date: BTreeMap<Date, (u32, u32)> = BTreeMap::new();
    for w in windows {
        for day in &w.days {
            let slot = by_date.entry(day.date).or_insert((0, 0));
            slot.0 += day.quota;
            slot.1 += day.done;
        }
    }
    let days = by_date
        .into_iter()
        .map(|(date, (quota, done))| DayRecord {
            date,
            quota,
            done,
            phase: None,
        })
        .collect();
    Window::from_days(days)
}
