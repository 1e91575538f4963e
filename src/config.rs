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

pub mod plan;
pub mod settings;
pub mod vacation;

use std::collections::HashSet;
use std::fs::read_to_string;
use std::fs::write;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::config::plan::PlanConfig;
use crate::config::plan::PlanRecord;
use crate::config::settings::Settings;
use crate::error::Fallible;
use crate::error::fail;

/// The contents of `deckplan.toml`: collection settings and one record per
/// planned deck.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanBook {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default, rename = "plan")]
    pub plans: Vec<PlanRecord>,
}

impl PlanBook {
    /// Load the book from disk. A missing file is an empty book.
    pub fn load(path: &Path) -> Fallible<Self> {
        if !path.exists() {
            log::debug!("No configuration at {}, starting empty.", path.display());
            return Ok(Self::default());
        }
        let text = read_to_string(path)?;
        let book = Self::parse(&text)?;
        log::debug!("Loaded {} plans from {}.", book.plans.len(), path.display());
        Ok(book)
    }

    pub fn parse(text: &str) -> Fallible<Self> {
        let book: PlanBook = toml::from_str(text)?;
        book.settings.validate()?;
        let mut seen = HashSet::new();
        for plan in &book.plans {
            if !seen.insert(plan.deck.as_str()) {
                return fail(format!("deck '{}' has more than one plan", plan.deck));
            }
        }
        Ok(book)
    }

    pub fn save(&self, path: &Path) -> Fallible<()> {
        let text = toml::to_string_pretty(self)?;
        write(path, text)?;
        log::debug!("Saved {} plans to {}.", self.plans.len(), path.display());
        Ok(())
    }

    pub fn get(&self, deck: &str) -> Option<&PlanRecord> {
        self.plans.iter().find(|plan| plan.deck == deck)
    }

    pub fn get_mut(&mut self, deck: &str) -> Option<&mut PlanRecord> {
        self.plans.iter_mut().find(|plan| plan.deck == deck)
    }

    /// Add a new plan, subject to the collection's entitlement.
    pub fn insert(&mut self, record: PlanRecord) -> Fallible<()> {
        if self.get(&record.deck).is_some() {
            return fail(format!("deck '{}' already has a plan", record.deck));
        }
        let entitlement = self.settings.entitlement();
        entitlement.check_plan_count(self.plans.len())?;
        entitlement.check_vacation_ranges(record.has_vacation_range())?;
        record.validate(self.settings.cutoff_offset_days)?;
        self.plans.push(record);
        Ok(())
    }

    /// Replace an existing plan, subject to the collection's entitlement.
    pub fn replace(&mut self, record: PlanRecord) -> Fallible<()> {
        self.settings
            .entitlement()
            .check_vacation_ranges(record.has_vacation_range())?;
        record.validate(self.settings.cutoff_offset_days)?;
        match self.get_mut(&record.deck) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => fail(format!("deck '{}' has no plan", record.deck)),
        }
    }

    /// Delete the plan for a deck. Returns whether one existed.
    pub fn remove(&mut self, deck: &str) -> bool {
        let before = self.plans.len();
        self.plans.retain(|plan| plan.deck != deck);
        self.plans.len() != before
    }

    /// Validate every plan, failing on the first invalid one.
    pub fn validated(&self) -> Fallible<Vec<PlanConfig>> {
        self.plans
            .iter()
            .map(|plan| plan.validate(self.settings.cutoff_offset_days))
            .collect()
    }

    /// The validated plans that are switched on.
    pub fn enabled(&self) -> Fallible<Vec<PlanConfig>> {
        Ok(self
            .validated()?
            .into_iter()
            .filter(|plan| plan.enabled)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::types::date::Date;

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    const SAMPLE: &str = r#"
[settings]
premium = false
progress_boundary = 60

[[plan]]
deck = "Biology"
start_date = "2026-01-01"
deadline = "2026-03-01"
skip_weekends = true
vacation = ["2026-02-14"]

[[plan]]
deck = "Chemistry"
enabled = false
start_date = "2026-01-10"
deadline = "2026-04-01"
cutoff = "2026-03-01"
"#;

    #[test]
    fn test_parse_sample() -> Fallible<()> {
        let book = PlanBook::parse(SAMPLE)?;
        assert_eq!(book.settings.progress_boundary, 60);
        assert_eq!(book.plans.len(), 2);
        assert_eq!(book.validated()?.len(), 2);
        let enabled = book.enabled()?;
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].deck, "Biology");
        assert_eq!(enabled[0].cutoff_date, date("2026-02-24"));
        Ok(())
    }

    #[test]
    fn test_duplicate_deck_rejected() {
        let text = r#"
[[plan]]
deck = "Biology"
start_date = "2026-01-01"
deadline = "2026-03-01"

[[plan]]
deck = "Biology"
start_date = "2026-01-01"
deadline = "2026-03-01"
"#;
        assert!(PlanBook::parse(text).is_err());
    }

    #[test]
    fn test_save_and_load() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("deckplan.toml");
        let book = PlanBook::parse(SAMPLE)?;
        book.save(&path)?;
        let loaded = PlanBook::load(&path)?;
        assert_eq!(book, loaded);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_empty() -> Fallible<()> {
        let dir = tempdir()?;
        let book = PlanBook::load(&dir.path().join("nope.toml"))?;
        assert!(book.plans.is_empty());
        assert_eq!(book.settings, Settings::default());
        Ok(())
    }

    #[test]
    fn test_free_plan_limit() -> Fallible<()> {
        let mut book = PlanBook::default();
        book.insert(PlanRecord::new("A", date("2026-01-01"), date("2026-02-01")))?;
        book.insert(PlanRecord::new("B", date("2026-01-01"), date("2026-02-01")))?;
        let third = PlanRecord::new("C", date("2026-01-01"), date("2026-02-01"));
        assert!(book.insert(third.clone()).is_err());
        book.settings.premium = true;
        book.insert(third)?;
        assert_eq!(book.plans.len(), 3);
        Ok(())
    }

    #[test]
    fn test_insert_duplicate_and_invalid() -> Fallible<()> {
        let mut book = PlanBook::default();
        book.insert(PlanRecord::new("A", date("2026-01-01"), date("2026-02-01")))?;
        assert!(
            book.insert(PlanRecord::new("A", date("2026-01-01"), date("2026-02-01")))
                .is_err()
        );
        book.settings.premium = true;
        assert!(
            book.insert(PlanRecord::new("B", date("2026-03-01"), date("2026-02-01")))
                .is_err()
        );
        assert_eq!(book.plans.len(), 1);
        Ok(())
    }

    #[test]
    fn test_free_vacation_range_refused() -> Fallible<()> {
        let mut book = PlanBook::default();
        let mut rec = PlanRecord::new("A", date("2026-01-01"), date("2026-02-01"));
        rec.vacation = vec!["2026-01-10/2026-01-12".parse()?];
        assert!(book.insert(rec.clone()).is_err());
        rec.vacation = vec!["2026-01-10".parse()?, "2026-01-11".parse()?];
        book.insert(rec)?;
        Ok(())
    }

    #[test]
    fn test_replace_and_remove() -> Fallible<()> {
        let mut book = PlanBook::default();
        book.insert(PlanRecord::new("A", date("2026-01-01"), date("2026-02-01")))?;
        let mut rec = book.get("A").cloned().unwrap();
        rec.deadline = date("2026-03-01");
        book.replace(rec)?;
        assert_eq!(book.get("A").unwrap().deadline, date("2026-03-01"));
        assert!(
            book.replace(PlanRecord::new("Z", date("2026-01-01"), date("2026-02-01")))
                .is_err()
        );
        assert!(book.remove("A"));
        assert!(!book.remove("A"));
        Ok(())
    }
}
