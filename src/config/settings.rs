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

use crate::error::Fallible;
use crate::error::fail;
use crate::plan::Tuning;

/// Plans allowed in a collection without the premium entitlement.
pub const FREE_PLAN_LIMIT: usize = 2;

const MIN_TIME_MULTIPLIER: f64 = 0.1;
const MAX_TIME_MULTIPLIER: f64 = 10.0;

/// Collection-wide settings, stored in the `[settings]` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub premium: bool,
    /// Share of the progress bar given to introducing new cards.
    pub progress_boundary: u8,
    /// Default distance from the deadline to the cutoff, usually negative.
    pub cutoff_offset_days: i64,
    /// Interval, in days, at which a card counts as mature.
    pub maturity_threshold_days: u32,
    pub time_multiplier: f64,
    pub enable_streaks: bool,
    pub log_retention_days: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            premium: false,
            progress_boundary: 67,
            cutoff_offset_days: -5,
            maturity_threshold_days: 21,
            time_multiplier: 1.0,
            enable_streaks: true,
            log_retention_days: 30,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Fallible<()> {
        if self.progress_boundary > 100 {
            return fail(format!(
                "progress_boundary must be between 0 and 100, got {}",
                self.progress_boundary
            ));
        }
        if self.maturity_threshold_days == 0 {
            return fail("maturity_threshold_days must be positive");
        }
        if self.cutoff_offset_days > 0 {
            return fail("cutoff_offset_days must not place the cutoff after the deadline");
        }
        if !self.time_multiplier.is_finite() {
            return fail("time_multiplier must be a number");
        }
        Ok(())
    }

    pub fn tuning(&self) -> Tuning {
        Tuning {
            progress_boundary: self.progress_boundary,
            time_multiplier: self
                .time_multiplier
                .clamp(MIN_TIME_MULTIPLIER, MAX_TIME_MULTIPLIER),
        }
    }

    pub fn entitlement(&self) -> Entitlement {
        if self.premium {
            Entitlement::Premium
        } else {
            Entitlement::Free
        }
    }
}

/// Which optional features a collection may use. Checked only when plans
/// are created or edited.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Entitlement {
    Free,
    Premium,
}

impl Entitlement {
    pub fn check_plan_count(self, existing: usize) -> Fallible<()> {
        if self == Entitlement::Free && existing >= FREE_PLAN_LIMIT {
            log::warn!("Refusing to create plan: free limit of {FREE_PLAN_LIMIT} reached.");
            return fail(format!(
                "the free version is limited to {FREE_PLAN_LIMIT} plans"
            ));
        }
        Ok(())
    }

    pub fn check_vacation_ranges(self, has_range: bool) -> Fallible<()> {
        if self == Entitlement::Free && has_range {
            log::warn!("Refusing vacation range on the free version.");
            return fail("vacation ranges require the premium version; list the days individually");
        }
        Ok(())
    }
}
