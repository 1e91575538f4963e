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

use clap::Args;

use crate::collection::Collection;
use crate::config::plan::PlanRecord;
use crate::config::vacation::Vacation;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::census::CardCensus;
use crate::types::date::Date;

/// Plan fields shared by `plan add` and `plan edit`.
#[derive(Args, Clone, Debug, Default)]
pub struct PlanFields {
    /// First day of the plan (defaults to today for new plans).
    #[arg(long)]
    pub start: Option<Date>,
    /// Last day for introducing new cards.
    #[arg(long)]
    pub cutoff: Option<Date>,
    /// Treat Saturdays and Sundays as rest days.
    #[arg(long)]
    pub skip_weekends: bool,
    /// A rest date (YYYY-MM-DD) or range (START/END). Repeatable.
    #[arg(long = "vacation")]
    pub vacation: Vec<Vacation>,
    /// Expected final size of the deck, including cards not yet added.
    #[arg(long)]
    pub expected_total: Option<u32>,
    /// A fixed daily target that replaces the computed quota.
    #[arg(long)]
    pub daily_target: Option<u32>,
    /// Name to show instead of the deck name.
    #[arg(long)]
    pub name: Option<String>,
}

pub fn add_plan(
    directory: Option<String>,
    deck: String,
    deadline: Date,
    fields: PlanFields,
    today: Date,
) -> Fallible<()> {
    let mut coll = Collection::new(directory)?;
    let record = build_plan(&coll, deck, deadline, fields, today)?;
    let deck = record.deck.clone();
    coll.book.insert(record)?;
    coll.save_book()?;
    log::info!("Created plan for '{deck}'.");
    println!("Created plan for {deck}.");
    Ok(())
}

/// A new plan record, with its new-card baseline taken from the deck as it
/// stands today.
pub fn build_plan(
    coll: &Collection,
    deck: String,
    deadline: Date,
    fields: PlanFields,
    today: Date,
) -> Fallible<PlanRecord> {
    let mut record = PlanRecord::new(deck, fields.start.unwrap_or(today), deadline);
    record.cutoff = fields.cutoff;
    record.skip_weekends = fields.skip_weekends;
    record.vacation = fields.vacation;
    record.expected_total_cards = fields.expected_total.unwrap_or(0);
    record.daily_target_override = fields.daily_target.unwrap_or(0);
    record.display_name = fields.name;
    let census = current_census(coll, &record.deck, today)?;
    record.capture_new_baseline(&census);
    Ok(record)
}

#[derive(Args, Clone, Debug, Default)]
pub struct EditFields {
    /// Move the deadline. A derived cutoff moves with it.
    #[arg(long)]
    pub deadline: Option<Date>,
    #[command(flatten)]
    pub fields: PlanFields,
    /// Count Saturdays and Sundays as study days again.
    #[arg(long, conflicts_with = "skip_weekends")]
    pub no_skip_weekends: bool,
    /// Remove every vacation entry before adding the given ones.
    #[arg(long)]
    pub clear_vacation: bool,
    /// Switch the plan on.
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,
    /// Switch the plan off without deleting it.
    #[arg(long)]
    pub disable: bool,
}

pub fn edit_plan(
    directory: Option<String>,
    deck: String,
    edit: EditFields,
    today: Date,
) -> Fallible<()> {
    let mut coll = Collection::new(directory)?;
    let record = apply_edit(&coll, &deck, edit, today)?;
    coll.book.replace(record)?;
    coll.save_book()?;
    log::info!("Updated plan for '{deck}'.");
    println!("Updated plan for {deck}.");
    Ok(())
}

/// The deck's plan with the edits applied. Fields that were not given are
/// left as they were.
pub fn apply_edit(
    coll: &Collection,
    deck: &str,
    edit: EditFields,
    today: Date,
) -> Fallible<PlanRecord> {
    let mut record = coll
        .book
        .get(deck)
        .cloned()
        .ok_or_else(|| ErrorReport::new(format!("deck '{deck}' has no plan")))?;
    let EditFields {
        deadline,
        fields,
        no_skip_weekends,
        clear_vacation,
        enable,
        disable,
    } = edit;
    if let Some(deadline) = deadline {
        record.deadline = deadline;
    }
    if let Some(start) = fields.start {
        record.start_date = start;
    }
    if fields.cutoff.is_some() {
        record.cutoff = fields.cutoff;
    }
    if fields.skip_weekends {
        record.skip_weekends = true;
    }
    if no_skip_weekends {
        record.skip_weekends = false;
    }
    if clear_vacation {
        record.vacation.clear();
    }
    if !fields.vacation.is_empty() {
        record.vacation = fields.vacation;
    }
    if let Some(target) = fields.daily_target {
        record.daily_target_override = target;
    }
    if let Some(name) = fields.name {
        record.display_name = Some(name);
    }
    if enable {
        record.enabled = true;
    }
    if disable {
        record.enabled = false;
    }
    if let Some(expected) = fields.expected_total {
        if expected != record.expected_total_cards {
            record.expected_total_cards = expected;
            let census = current_census(coll, deck, today)?;
            record.capture_new_baseline(&census);
        }
    }
    Ok(record)
}

pub fn clear_plans(directory: Option<String>, decks: Vec<String>) -> Fallible<()> {
    let mut coll = Collection::new(directory)?;
    let cleared = clear(&mut coll, &decks)?;
    coll.save_book()?;
    for deck in cleared {
        println!("Cleared plan for {deck}.");
    }
    Ok(())
}

/// Remove the plans and logged history of the given decks. Nothing is
/// removed unless every deck has a plan.
pub fn clear(coll: &mut Collection, decks: &[String]) -> Fallible<Vec<String>> {
    if decks.is_empty() {
        return fail("no decks given.");
    }
    for deck in decks {
        if coll.book.get(deck).is_none() {
            return fail(format!("deck '{deck}' has no plan"));
        }
    }
    let mut cleared = Vec::new();
    for deck in decks {
        if coll.book.remove(deck) {
            let rows = coll.db.clear_log(deck)?;
            log::info!("Cleared plan for '{deck}' and {rows} logged days.");
            cleared.push(deck.clone());
        }
    }
    Ok(cleared)
}

fn current_census(coll: &Collection, deck: &str, today: Date) -> Fallible<CardCensus> {
    let threshold = coll.book.settings.maturity_threshold_days;
    let census = coll.db.census(deck, today, threshold)?;
    if census.is_none() {
        log::warn!("Deck '{deck}' has no cards yet.");
    }
    Ok(census.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use tempfile::tempdir;

    use super::*;
    use crate::plan::phase::Phase;
    use crate::types::card_state::CardState;

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn collection() -> Fallible<(TempDir, Collection)> {
        let dir = tempdir()?;
        let coll = Collection::new(Some(dir.path().display().to_string()))?;
        for _ in 0..30 {
            coll.db.add_card("Biology", CardState::New, 0, false)?;
        }
        Ok((dir, coll))
    }

    #[test]
    fn test_build_plan_captures_baseline() -> Fallible<()> {
        let (_dir, coll) = collection()?;
        let fields = PlanFields {
            name: Some("Bio exam".to_string()),
            ..PlanFields::default()
        };
        let today = date("2026-01-05");
        let rec = build_plan(&coll, "Biology".to_string(), date("2026-02-01"), fields, today)?;
        assert_eq!(rec.start_date, today);
        assert_eq!(rec.initial_new_total, 30);
        assert_eq!(rec.display_name.as_deref(), Some("Bio exam"));
        Ok(())
    }

    #[test]
    fn test_build_plan_with_expected_total() -> Fallible<()> {
        let (_dir, coll) = collection()?;
        let fields = PlanFields {
            expected_total: Some(50),
            ..PlanFields::default()
        };
        let rec = build_plan(
            &coll,
            "Biology".to_string(),
            date("2026-02-01"),
            fields,
            date("2026-01-05"),
        )?;
        assert_eq!(rec.initial_new_total, 50);
        Ok(())
    }

    #[test]
    fn test_build_plan_for_empty_deck() -> Fallible<()> {
        let (_dir, coll) = collection()?;
        let rec = build_plan(
            &coll,
            "Chemistry".to_string(),
            date("2026-02-01"),
            PlanFields::default(),
            date("2026-01-05"),
        )?;
        assert_eq!(rec.initial_new_total, 0);
        Ok(())
    }

    #[test]
    fn test_edit_keeps_unchanged_fields() -> Fallible<()> {
        let (_dir, mut coll) = collection()?;
        let fields = PlanFields {
            daily_target: Some(15),
            skip_weekends: true,
            ..PlanFields::default()
        };
        let rec = build_plan(
            &coll,
            "Biology".to_string(),
            date("2026-02-01"),
            fields,
            date("2026-01-05"),
        )?;
        coll.book.insert(rec)?;
        let edit = EditFields {
            deadline: Some(date("2026-03-01")),
            disable: true,
            ..EditFields::default()
        };
        let rec = apply_edit(&coll, "Biology", edit, date("2026-01-06"))?;
        assert_eq!(rec.deadline, date("2026-03-01"));
        assert_eq!(rec.daily_target_override, 15);
        assert!(rec.skip_weekends);
        assert!(!rec.enabled);
        // Derived cutoff follows the deadline.
        assert_eq!(rec.cutoff_date(-5), date("2026-02-24"));
        Ok(())
    }

    #[test]
    fn test_edit_can_undo_rest_days() -> Fallible<()> {
        let (_dir, mut coll) = collection()?;
        let fields = PlanFields {
            skip_weekends: true,
            vacation: vec!["2026-01-20".parse()?],
            ..PlanFields::default()
        };
        let rec = build_plan(
            &coll,
            "Biology".to_string(),
            date("2026-02-01"),
            fields,
            date("2026-01-05"),
        )?;
        coll.book.insert(rec)?;
        let edit = EditFields {
            no_skip_weekends: true,
            clear_vacation: true,
            ..EditFields::default()
        };
        let rec = apply_edit(&coll, "Biology", edit, date("2026-01-06"))?;
        assert!(!rec.skip_weekends);
        assert!(rec.vacation.is_empty());

        let edit = EditFields {
            clear_vacation: true,
            fields: PlanFields {
                vacation: vec!["2026-01-22".parse()?],
                ..PlanFields::default()
            },
            ..EditFields::default()
        };
        let rec = apply_edit(&coll, "Biology", edit, date("2026-01-06"))?;
        assert_eq!(rec.vacation, vec!["2026-01-22".parse::<Vacation>()?]);
        Ok(())
    }

    #[test]
    fn test_edit_expected_total_recaptures_baseline() -> Fallible<()> {
        let (_dir, mut coll) = collection()?;
        let rec = build_plan(
            &coll,
            "Biology".to_string(),
            date("2026-02-01"),
            PlanFields::default(),
            date("2026-01-05"),
        )?;
        coll.book.insert(rec)?;
        let edit = EditFields {
            fields: PlanFields {
                expected_total: Some(80),
                ..PlanFields::default()
            },
            ..EditFields::default()
        };
        let rec = apply_edit(&coll, "Biology", edit, date("2026-01-06"))?;
        assert_eq!(rec.expected_total_cards, 80);
        assert_eq!(rec.initial_new_total, 80);
        Ok(())
    }

    #[test]
    fn test_edit_unknown_deck() -> Fallible<()> {
        let (_dir, coll) = collection()?;
        assert!(apply_edit(&coll, "Nope", EditFields::default(), date("2026-01-06")).is_err());
        Ok(())
    }

    #[test]
    fn test_clear() -> Fallible<()> {
        let (_dir, mut coll) = collection()?;
        let rec = PlanRecord::new("Biology", date("2026-01-01"), date("2026-02-01"));
        coll.book.insert(rec)?;
        coll.db
            .record_day("Biology", date("2026-01-05"), 3, 3, Phase::New)?;
        assert!(clear(&mut coll, &["Biology".to_string(), "Nope".to_string()]).is_err());
        assert_eq!(coll.book.plans.len(), 1);
        let cleared = clear(&mut coll, &["Biology".to_string()])?;
        assert_eq!(cleared, vec!["Biology".to_string()]);
        assert!(coll.book.plans.is_empty());
        assert!(coll.db.day_records("Biology")?.is_empty());
        Ok(())
    }
}
