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

use serde::Deserialize;
use serde::Serialize;

use crate::calendar::RestDays;
use crate::config::vacation::Vacation;
use crate::config::vacation::expand;
use crate::error::Fallible;
use crate::error::fail;
use crate::plan::remaining_new;
use crate::types::census::CardCensus;
use crate::types::date::Date;

/// A plan as it is written in the configuration file. Nothing here is
/// trusted until it has been turned into a [`PlanConfig`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub deck: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub start_date: Date,
    pub deadline: Date,
    /// Overrides the collection-wide cutoff offset for this plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff_offset_days: Option<i64>,
    /// An explicit cutoff. When set, moving the deadline leaves it alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<Date>,
    #[serde(default)]
    pub skip_weekends: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vacation: Vec<Vacation>,
    #[serde(default)]
    pub expected_total_cards: u32,
    #[serde(default)]
    pub daily_target_override: u32,
    #[serde(default)]
    pub initial_new_total: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_young_total: Option<u32>,
}

fn default_enabled() -> bool {
    true
}

/// Workload snapshots used as the denominators of the progress bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Baseline {
    /// New cards to introduce, as of plan creation (or the last change to
    /// the expected total).
    pub initial_new_total: u32,
    /// Young cards to mature, as of the first day of the review phase.
    pub initial_young_total: Option<u32>,
}

/// A validated plan: `start_date <= cutoff_date <= deadline_date` holds.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanConfig {
    pub deck: String,
    pub display_name: String,
    pub enabled: bool,
    pub start_date: Date,
    pub cutoff_date: Date,
    pub deadline_date: Date,
    pub rest_days: RestDays,
    pub expected_total_cards: u32,
    pub daily_target_override: u32,
    pub baseline: Baseline,
}

impl PlanRecord {
    pub fn new(deck: impl Into<String>, start_date: Date, deadline: Date) -> Self {
        Self {
            deck: deck.into(),
            enabled: true,
            display_name: None,
            start_date,
            deadline,
            cutoff_offset_days: None,
            cutoff: None,
            skip_weekends: false,
            vacation: Vec::new(),
            expected_total_cards: 0,
            daily_target_override: 0,
            initial_new_total: 0,
            initial_young_total: None,
        }
    }

    /// The cutoff in effect: the explicit one if present, otherwise the
    /// deadline shifted by the offset, but never before the start date.
    pub fn cutoff_date(&self, default_offset_days: i64) -> Date {
        match self.cutoff {
            Some(cutoff) => cutoff,
            None => {
                let offset = self.cutoff_offset_days.unwrap_or(default_offset_days);
                self.deadline.add_days(offset).max(self.start_date)
            }
        }
    }

    pub fn has_vacation_range(&self) -> bool {
        self.vacation.iter().any(Vacation::is_range)
    }

    /// Snapshot the new-card workload so that progress is measured against
    /// it. Called on creation and whenever the expected total changes.
    pub fn capture_new_baseline(&mut self, census: &CardCensus) {
        self.initial_new_total = remaining_new(census, self.expected_total_cards);
        log::debug!(
            "Captured new-card baseline for '{}': {}",
            self.deck,
            self.initial_new_total
        );
    }

    pub fn capture_young_baseline(&mut self, census: &CardCensus) {
        self.initial_young_total = Some(census.young_count);
        log::debug!(
            "Captured young-card baseline for '{}': {}",
            self.deck,
            census.young_count
        );
    }

    pub fn validate(&self, default_offset_days: i64) -> Fallible<PlanConfig> {
        if self.deck.trim().is_empty() {
            return fail("plan has an empty deck name");
        }
        if let Some(offset) = self.cutoff_offset_days {
            if offset > 0 {
                return fail(format!(
                    "plan '{}': cutoff_offset_days must not be positive",
                    self.deck
                ));
            }
        }
        if self.start_date > self.deadline {
            return fail(format!(
                "plan '{}': start date {} is after the deadline {}",
                self.deck, self.start_date, self.deadline
            ));
        }
        let cutoff_date = self.cutoff_date(default_offset_days);
        if cutoff_date < self.start_date || cutoff_date > self.deadline {
            return fail(format!(
                "plan '{}': cutoff {} must fall between {} and {}",
                self.deck, cutoff_date, self.start_date, self.deadline
            ));
        }
        let display_name = match &self.display_name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => self.deck.clone(),
        };
        Ok(PlanConfig {
            deck: self.deck.clone(),
            display_name,
            enabled: self.enabled,
            start_date: self.start_date,
            cutoff_date,
            deadline_date: self.deadline,
            rest_days: RestDays::new(self.skip_weekends, expand(&self.vacation)),
            expected_total_cards: self.expected_total_cards,
            daily_target_override: self.daily_target_override,
            baseline: Baseline {
                initial_new_total: self.initial_new_total,
                initial_young_total: self.initial_young_total,
            },
        })
    }
}
