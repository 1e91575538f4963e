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

use std::collections::BTreeSet;

use crate::types::date::Date;

/// The set of dates on which no work is planned: weekends (optionally) plus
/// explicit vacation days.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RestDays {
    skip_weekends: bool,
    dates: BTreeSet<Date>,
}

impl RestDays {
    pub fn new(skip_weekends: bool, dates: BTreeSet<Date>) -> Self {
        Self {
            skip_weekends,
            dates,
        }
    }

    pub fn skip_weekends(&self) -> bool {
        self.skip_weekends
    }

    pub fn dates(&self) -> &BTreeSet<Date> {
        &self.dates
    }

    pub fn is_excluded(&self, date: Date) -> bool {
        (self.skip_weekends && date.is_weekend()) || self.dates.contains(&date)
    }

    /// The study dates in `[from, to]`, in order. Empty when `from > to`.
    pub fn study_days(&self, from: Date, to: Date) -> Vec<Date> {
        let mut days = Vec::new();
        let mut date = from;
        while date <= to {
            if !self.is_excluded(date) {
                days.push(date);
            }
            if date == to {
                break;
            }
            date = date.succ();
        }
        days
    }

    /// The number of study dates in `[from, to]`. Zero when `from > to`.
    pub fn count_study_days(&self, from: Date, to: Date) -> u32 {
        self.study_days(from, to).len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    #[test]
    fn test_no_exclusions() {
        let rest = RestDays::default();
        let days = rest.study_days(date("2026-01-01"), date("2026-01-05"));
        assert_eq!(days.len(), 5);
        assert_eq!(days[0], date("2026-01-01"));
        assert_eq!(days[4], date("2026-01-05"));
        assert_eq!(
            rest.count_study_days(date("2026-01-01"), date("2026-01-05")),
            5
        );
    }

    #[test]
    fn test_single_day_range() {
        let rest = RestDays::default();
        let d = date("2026-01-14");
        assert_eq!(rest.study_days(d, d), vec![d]);
        assert_eq!(rest.count_study_days(d, d), 1);
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let rest = RestDays::new(true, BTreeSet::new());
        assert!(
            rest.study_days(date("2026-01-10"), date("2026-01-01"))
                .is_empty()
        );
        assert_eq!(
            rest.count_study_days(date("2026-01-10"), date("2026-01-01")),
            0
        );
    }

    #[test]
    fn test_skip_weekends() {
        let rest = RestDays::new(true, BTreeSet::new());
        // Thursday 2026-01-15 through Tuesday 2026-01-20.
        let days = rest.study_days(date("2026-01-15"), date("2026-01-20"));
        assert_eq!(
            days,
            vec![
                date("2026-01-15"),
                date("2026-01-16"),
                date("2026-01-19"),
                date("2026-01-20"),
            ]
        );
        assert!(rest.is_excluded(date("2026-01-17")));
        assert!(rest.is_excluded(date("2026-01-18")));
        assert!(!rest.is_excluded(date("2026-01-19")));
    }

    #[test]
    fn test_vacation_and_weekends_merge() {
        let mut dates = BTreeSet::new();
        dates.insert(date("2026-01-16"));
        // Already a weekend; must not be counted twice.
        dates.insert(date("2026-01-17"));
        let rest = RestDays::new(true, dates);
        assert_eq!(
            rest.count_study_days(date("2026-01-15"), date("2026-01-20")),
            3
        );
    }

    #[test]
    fn test_count_matches_sequence() {
        let mut dates = BTreeSet::new();
        dates.insert(date("2026-02-03"));
        dates.insert(date("2026-02-10"));
        let rest = RestDays::new(true, dates);
        let from = date("2026-02-01");
        let to = date("2026-03-01");
        assert_eq!(
            rest.count_study_days(from, to) as usize,
            rest.study_days(from, to).len()
        );
    }

    #[test]
    fn test_pure() {
        let rest = RestDays::new(true, BTreeSet::new());
        let a = rest.study_days(date("2026-01-01"), date("2026-02-01"));
        let b = rest.study_days(date("2026-01-01"), date("2026-02-01"));
        assert_eq!(a, b);
    }
}
