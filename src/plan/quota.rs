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

use crate::config::plan::PlanConfig;
use crate::plan::phase::Phase;
use crate::plan::remaining_new;
use crate::types::census::CardCensus;
use crate::types::date::Date;

/// Cards still to be processed in the current phase. Suspended cards never
/// count.
pub fn remaining_work(phase: Phase, census: &CardCensus, expected_total: u32) -> u32 {
    match phase {
        Phase::NotStarted => 0,
        Phase::New => remaining_new(census, expected_total),
        Phase::Review => census.young_count,
    }
}

/// Cards that exist right now and belong to the phase's workload. Unlike
/// [`remaining_work`], this ignores cards that are expected but not yet
/// imported.
pub fn remaining_existing(phase: Phase, census: &CardCensus) -> u32 {
    match phase {
        Phase::NotStarted => 0,
        Phase::New => census.new_count,
        Phase::Review => census.young_count,
    }
}

/// Study days left in the current phase, today included. Zero means the
/// phase's end date has passed (or only rest days remain).
pub fn remaining_study_days(phase: Phase, today: Date, plan: &PlanConfig) -> u32 {
    match phase {
        Phase::NotStarted => 0,
        Phase::New => plan.rest_days.count_study_days(today, plan.cutoff_date),
        Phase::Review => plan.rest_days.count_study_days(today, plan.deadline_date),
    }
}

/// Spread the work evenly over the remaining days, rounding up so the deck
/// is never under-paced. With no days left, everything is due now.
pub fn spread(remaining_work: u32, remaining_study_days: u32) -> u32 {
    if remaining_study_days == 0 {
        remaining_work
    } else {
        remaining_work.div_ceil(remaining_study_days)
    }
}

/// The inputs that fix one day's quota.
#[derive(Clone, Copy, Debug)]
pub struct QuotaInputs {
    pub phase: Phase,
    pub is_rest_day: bool,
    pub remaining_work: u32,
    pub remaining_existing: u32,
    pub remaining_study_days: u32,
    pub done_today: u32,
    pub expected_total: u32,
    pub daily_target_override: u32,
}

/// Today's quota, and whether the manual override produced it.
///
/// In the new-card phase every card started today has left the new pool, so
/// adding the day's work back recovers the workload as it stood at the start
/// of the day, and a live census taken later gives the same quota. Reviews
/// do not shrink the young pool one for one, so the review phase spreads the
/// young cards as they are now and relies on the daily log to keep the
/// first quota of the day.
pub fn daily_quota(inputs: QuotaInputs) -> (u32, bool) {
    if inputs.phase == Phase::NotStarted || inputs.is_rest_day {
        return (0, false);
    }
    let done_back = match inputs.phase {
        Phase::New => inputs.done_today,
        Phase::NotStarted | Phase::Review => 0,
    };
    let start_of_day = inputs.remaining_work.saturating_add(done_back);
    if start_of_day == 0 {
        return (0, false);
    }
    if inputs.daily_target_override > 0 {
        return (inputs.daily_target_override, true);
    }
    let quota = spread(start_of_day, inputs.remaining_study_days);
    // Cards that are planned but not imported cannot be studied today.
    let available = inputs.remaining_existing.saturating_add(done_back);
    (quota.min(available), false)
}
