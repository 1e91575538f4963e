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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Serialize;

use crate::config::plan::PlanConfig;
use crate::error::ErrorReport;
use crate::error::fail;
use crate::plan::planned_new_remaining;
use crate::types::census::CardCensus;
use crate::types::date::Date;

/// Where a deck stands in its plan. Not stored anywhere: it is recomputed
/// from the date and the counts every time, so a deck that gains new cards
/// after finishing them simply goes back to `New`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Before the start date.
    NotStarted,
    /// Introducing new cards, until the cutoff.
    New,
    /// Bringing young cards to maturity, until the deadline.
    Review,
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::NotStarted => "not_started",
            Phase::New => "new",
            Phase::Review => "review",
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for Phase {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "not_started" => Ok(Phase::NotStarted),
            "new" => Ok(Phase::New),
            "review" => Ok(Phase::Review),
            _ => fail(format!("Invalid phase: {}", value)),
        }
    }
}

pub fn select_phase(today: Date, plan: &PlanConfig, census: &CardCensus) -> Phase {
    if today < plan.start_date {
        return Phase::NotStarted;
    }
    let new_work_left =
        census.new_count > 0 || planned_new_remaining(census, plan.expected_total_cards) > 0;
    if today <= plan.cutoff_date && new_work_left {
        Phase::New
    } else {
        Phase::Review
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::plan::PlanRecord;

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn plan() -> PlanConfig {
        let mut rec = PlanRecord::new("Deck", date("2026-01-01"), date("2026-01-20"));
        rec.cutoff = Some(date("2026-01-10"));
        rec.validate(-5).unwrap()
    }

    fn census(new_count: u32, young_count: u32) -> CardCensus {
        CardCensus {
            new_count,
            young_count,
            ..CardCensus::default()
        }
    }

    #[test]
    fn test_not_started() {
        assert_eq!(
            select_phase(date("2025-12-31"), &plan(), &census(10, 0)),
            Phase::NotStarted
        );
    }

    #[test]
    fn test_new_phase_bounds_inclusive() {
        let plan = plan();
        assert_eq!(
            select_phase(date("2026-01-01"), &plan, &census(10, 0)),
            Phase::New
        );
        assert_eq!(
            select_phase(date("2026-01-10"), &plan, &census(10, 0)),
            Phase::New
        );
        assert_eq!(
            select_phase(date("2026-01-11"), &plan, &census(10, 0)),
            Phase::Review
        );
    }

    #[test]
    fn test_review_once_new_exhausted() {
        assert_eq!(
            select_phase(date("2026-01-05"), &plan(), &census(0, 10)),
            Phase::Review
        );
    }

    #[test]
    fn test_reentry_when_new_cards_return() {
        let plan = plan();
        assert_eq!(
            select_phase(date("2026-01-05"), &plan, &census(0, 10)),
            Phase::Review
        );
        assert_eq!(
            select_phase(date("2026-01-05"), &plan, &census(3, 10)),
            Phase::New
        );
    }

    #[test]
    fn test_planned_cards_keep_new_phase() {
        let mut plan = plan();
        plan.expected_total_cards = 50;
        assert_eq!(
            select_phase(date("2026-01-05"), &plan, &census(0, 10)),
            Phase::New
        );
    }

    #[test]
    fn test_phase_names() -> Result<(), ErrorReport> {
        for phase in [Phase::NotStarted, Phase::New, Phase::Review] {
            assert_eq!(Phase::try_from(phase.to_string())?, phase);
        }
        assert!(Phase::try_from("rest".to_string()).is_err());
        Ok(())
    }
}
