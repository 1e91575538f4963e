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

//! The plan engine: turns a deck's plan, a census of its cards, and a date
//! into today's quota, phase, status, and overall progress.
//!
//! Everything here is a pure function of its arguments. The engine has no
//! clock and no cache. Keeping the quota fixed for the whole day is the
//! caller's job (see [`crate::db::Database::record_day`]); the engine only
//! promises that equal inputs give equal outputs, and that starting new
//! cards or reviewing cards does not by itself move the day's quota.

pub mod phase;
pub mod progress;
pub mod quota;

use serde::Serialize;

use crate::config::plan::PlanConfig;
use crate::plan::phase::Phase;
use crate::plan::phase::select_phase;
use crate::plan::progress::overall_progress;
use crate::plan::quota::QuotaInputs;
use crate::plan::quota::daily_quota;
use crate::plan::quota::remaining_existing;
use crate::plan::quota::remaining_study_days;
use crate::plan::quota::remaining_work;
use crate::types::census::CardCensus;
use crate::types::census::FALLBACK_SECONDS_PER_ITEM;
use crate::types::date::Date;

/// Presentation knobs that affect the numbers the engine reports.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tuning {
    pub progress_boundary: u8,
    pub time_multiplier: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            progress_boundary: 67,
            time_multiplier: 1.0,
        }
    }
}

/// New cards that are expected but not yet in the deck.
pub fn planned_new_remaining(census: &CardCensus, expected_total: u32) -> u32 {
    if expected_total == 0 {
        return 0;
    }
    expected_total.saturating_sub(census.active_total())
}

/// New cards left to introduce. With an expected total, that total is a
/// floor on the size of the deck, so cards not yet imported count too.
pub fn remaining_new(census: &CardCensus, expected_total: u32) -> u32 {
    if expected_total == 0 {
        return census.new_count;
    }
    expected_total
        .max(census.active_total())
        .saturating_sub(census.started())
}

/// Work counted against the quota: cards started in the new-card phase,
/// distinct cards reviewed otherwise.
pub fn done_today(phase: Phase, census: &CardCensus) -> u32 {
    match phase {
        Phase::New => census.new_started_today,
        Phase::NotStarted | Phase::Review => census.reviewed_today,
    }
}

/// The quota for one deck on one day.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTarget {
    pub phase: Phase,
    pub quota: u32,
    pub done: u32,
    pub left: u32,
    pub is_rest_day: bool,
    pub overdue_new_warning: bool,
}

impl DailyTarget {
    /// The same target with a different count of work done.
    pub fn with_done(self, done: u32) -> Self {
        Self {
            done,
            left: self.quota.saturating_sub(done),
            ..self
        }
    }

    pub fn with_quota(self, quota: u32) -> Self {
        Self {
            quota,
            left: quota.saturating_sub(self.done),
            ..self
        }
    }

    pub fn status(&self) -> Status {
        if self.phase == Phase::NotStarted {
            Status::Pending
        } else if self.is_rest_day {
            Status::Rest
        } else if self.quota == 0 {
            Status::Complete
        } else if self.done < self.quota {
            Status::Behind
        } else {
            Status::OnTrack
        }
    }

    /// Share of today's quota done, in `[0, 100]`.
    pub fn percent_done(&self) -> u32 {
        if self.quota == 0 {
            return if self.is_rest_day || self.done == 0 {
                0
            } else {
                100
            };
        }
        (self.done.min(self.quota) * 100) / self.quota
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Rest,
    Complete,
    Behind,
    OnTrack,
}

impl Status {
    pub fn label(&self) -> &str {
        match self {
            Status::Pending => "PENDING",
            Status::Rest => "REST",
            Status::Complete => "DONE",
            Status::Behind => "BEHIND",
            Status::OnTrack => "ON TRACK",
        }
    }
}

/// Everything the engine knows about one deck on one day.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    pub deck: String,
    pub display_name: String,
    pub date: Date,
    pub target: DailyTarget,
    pub status: Status,
    pub progress: f64,
    pub remaining_work: u32,
    pub remaining_study_days: u32,
    pub days_to_deadline: i64,
    pub study_days_to_cutoff: u32,
    pub study_days_to_deadline: u32,
    pub estimated_minutes: u32,
    pub override_active: bool,
}

impl PlanReport {
    /// Replace the phase and quota with the ones pinned earlier in the day,
    /// and the done count with the latest one, measured in that phase.
    pub fn pin(mut self, phase: Phase, quota: u32, done: u32) -> Self {
        self.target.phase = phase;
        self.target = self.target.with_quota(quota).with_done(done);
        self.status = self.target.status();
        self
    }
}

/// The result of evaluating a plan.
#[derive(Clone, Debug, PartialEq)]
pub enum PlanOutcome {
    /// The host could not supply a census. Nothing is guessed.
    NoData { deck: String },
    Report(PlanReport),
}

impl PlanOutcome {
    pub fn report(&self) -> Option<&PlanReport> {
        match self {
            PlanOutcome::NoData { .. } => None,
            PlanOutcome::Report(report) => Some(report),
        }
    }
}

fn estimated_minutes(quota: u32, avg_seconds_per_item: f64, multiplier: f64) -> u32 {
    let seconds = if avg_seconds_per_item.is_finite() && avg_seconds_per_item >= 1.0 {
        avg_seconds_per_item
    } else {
        FALLBACK_SECONDS_PER_ITEM
    };
    let minutes = f64::from(quota) * seconds * multiplier / 60.0;
    if minutes.is_finite() && minutes > 0.0 {
        minutes.round() as u32
    } else {
        0
    }
}

/// Evaluate a plan for a given day.
pub fn evaluate(
    today: Date,
    plan: &PlanConfig,
    census: Option<&CardCensus>,
    tuning: &Tuning,
) -> PlanOutcome {
    let Some(census) = census else {
        return PlanOutcome::NoData {
            deck: plan.deck.clone(),
        };
    };
    let expected_total = plan.expected_total_cards;
    let phase = select_phase(today, plan, census);
    let is_rest_day = plan.rest_days.is_excluded(today);
    let done = done_today(phase, census);
    let work = remaining_work(phase, census, expected_total);
    let days = remaining_study_days(phase, today, plan);
    let (quota, override_active) = daily_quota(QuotaInputs {
        phase,
        is_rest_day,
        remaining_work: work,
        remaining_existing: remaining_existing(phase, census),
        remaining_study_days: days,
        done_today: done,
        expected_total,
        daily_target_override: plan.daily_target_override,
    });
    let new_work_left =
        census.new_count > 0 || planned_new_remaining(census, expected_total) > 0;
    let target = DailyTarget {
        phase,
        quota,
        done,
        left: quota.saturating_sub(done),
        is_rest_day,
        overdue_new_warning: today > plan.cutoff_date && new_work_left,
    };
    let progress = overall_progress(
        phase,
        &plan.baseline,
        census,
        remaining_new(census, expected_total),
        tuning.progress_boundary,
    );
    PlanOutcome::Report(PlanReport {
        deck: plan.deck.clone(),
        display_name: plan.display_name.clone(),
        date: today,
        status: target.status(),
        target,
        progress,
        remaining_work: work,
        remaining_study_days: days,
        days_to_deadline: today.days_until(plan.deadline_date),
        study_days_to_cutoff: plan.rest_days.count_study_days(today, plan.cutoff_date),
        study_days_to_deadline: plan.rest_days.count_study_days(today, plan.deadline_date),
        estimated_minutes: estimated_minutes(
            quota,
            census.avg_seconds_per_item,
            tuning.time_multiplier,
        ),
        override_active,
    })
}
