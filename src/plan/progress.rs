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

use crate::config::plan::Baseline;
use crate::plan::phase::Phase;
use crate::types::census::CardCensus;

/// Fraction of a baseline that has been consumed, in `[0, 1]`. An empty
/// workload counts as finished. If the remaining work has outgrown the
/// baseline (cards were added), progress restarts from zero.
pub fn consumed_fraction(initial: u32, remaining: u32) -> f64 {
    let denominator = initial.max(remaining);
    if denominator == 0 {
        return 1.0;
    }
    f64::from(denominator - remaining) / f64::from(denominator)
}

/// Fraction of the review phase completed. Without a young baseline, the
/// share of introduced cards that are already mature stands in for it.
fn review_fraction(baseline: &Baseline, census: &CardCensus) -> f64 {
    match baseline.initial_young_total {
        Some(initial) => consumed_fraction(initial, census.young_count),
        None => {
            let started = census.started();
            if started == 0 {
                1.0
            } else {
                f64::from(census.mature_count) / f64::from(started)
            }
        }
    }
}

/// Overall progress in `[0, 100]`, as a two-stage bar: the first
/// `boundary` percent fills while new cards are introduced, the rest only
/// once that is complete.
pub fn overall_progress(
    phase: Phase,
    baseline: &Baseline,
    census: &CardCensus,
    remaining_new: u32,
    boundary: u8,
) -> f64 {
    if phase == Phase::NotStarted {
        return 0.0;
    }
    let boundary = f64::from(boundary.min(100));
    let new_fraction = consumed_fraction(baseline.initial_new_total, remaining_new);
    let mut progress = new_fraction.min(1.0) * boundary;
    if new_fraction >= 1.0 {
        progress += review_fraction(baseline, census) * (100.0 - boundary);
    }
    progress.clamp(0.0, 100.0)
}
