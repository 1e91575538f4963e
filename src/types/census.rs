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

/// Seconds per item assumed when the review log has no usable durations.
pub const FALLBACK_SECONDS_PER_ITEM: f64 = 12.0;

/// A read-only snapshot of a deck's card counts (subdecks included), taken
/// by the host. The planner never writes any of this back.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardCensus {
    pub new_count: u32,
    pub young_count: u32,
    pub mature_count: u32,
    pub suspended_count: u32,
    /// Cards whose first-ever review happened today.
    pub new_started_today: u32,
    /// Distinct cards reviewed today, not raw log rows.
    pub reviewed_today: u32,
    /// Mean time spent per review. Display only.
    pub avg_seconds_per_item: f64,
}

impl CardCensus {
    /// Cards that are not suspended.
    pub fn active_total(&self) -> u32 {
        self.new_count + self.young_count + self.mature_count
    }

    /// Cards that have been introduced at least once.
    pub fn started(&self) -> u32 {
        self.young_count + self.mature_count
    }
}

impl Default for CardCensus {
    fn default() -> Self {
        Self {
            new_count: 0,
            young_count: 0,
            mature_count: 0,
            suspended_count: 0,
            new_started_today: 0,
            reviewed_today: 0,
            avg_seconds_per_item: FALLBACK_SECONDS_PER_ITEM,
        }
    }
}
